#![cfg(target_os = "linux")]

use std::path::PathBuf;
use std::time::Duration;

use slogjournal_handler::{Attr, HandlerOptions, JournalHandler, Level, Record};
use slogjournal_transport::{Delivery, JournalConfig, JournalListener};
use slogjournal_wire::decode_entry;

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = PathBuf::from(format!(
        "/tmp/sjh-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn listener_and_config(tag: &str) -> (PathBuf, JournalListener, JournalConfig) {
    let dir = unique_temp_dir(tag);
    let path = dir.join("journal.sock");
    let listener = JournalListener::bind(&path).expect("listener should bind");
    listener
        .set_read_timeout(Some(Duration::from_secs(5)))
        .expect("timeout should apply");
    (dir, listener, JournalConfig::with_socket_path(&path))
}

#[test]
fn handler_entry_reaches_listener_inline() {
    let (dir, listener, config) = listener_and_config("inline");
    let handler = JournalHandler::with_config(HandlerOptions::new().level(Level::Debug), config)
        .expect("handler should open socket")
        .with_group("request")
        .with_attrs([Attr::string("id", "r-17")]);

    let record = Record::new(Level::Notice, "served")
        .with_source(slogjournal_handler::source_location!())
        .with_attr(Attr::int("status", 200));
    handler.handle(&record).expect("send should succeed");

    let received = listener.recv().expect("entry should arrive");
    assert_eq!(received.delivery, Delivery::Inline);
    assert_eq!(received.payload.as_ref(), handler.encode(&record).as_ref());

    let entry = decode_entry(&received.payload).expect("entry should decode");
    assert_eq!(entry.get_str("MESSAGE"), Some("served"));
    assert_eq!(entry.get_str("PRIORITY"), Some("5"));
    assert_eq!(entry.get_str("request_id"), Some("r-17"));
    assert_eq!(entry.get_str("request_status"), Some("200"));
    assert!(entry
        .get_str("CODE_FILE")
        .is_some_and(|file| file.ends_with("journal_roundtrip.rs")));

    drop(listener);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn oversized_record_arrives_intact_via_memfd() {
    let (dir, listener, config) = listener_and_config("oversize");
    let config = JournalConfig {
        send_buffer_size: Some(4096),
        ..config
    };
    let handler = JournalHandler::with_config(HandlerOptions::default(), config)
        .expect("handler should open socket");

    let big: String = "0123456789abcdef\n".repeat(40 * 1024);
    let record = Record::new(Level::Error, big.clone())
        .with_time(None)
        .with_attr(Attr::string("blob", big.clone()));
    handler.handle(&record).expect("oversize must fall back, not fail");

    let received = listener.recv().expect("sealed entry should arrive");
    assert_eq!(received.delivery, Delivery::Sealed);
    assert_eq!(received.payload.as_ref(), handler.encode(&record).as_ref());

    let entry = decode_entry(&received.payload).expect("entry should decode");
    assert_eq!(entry.get_str("MESSAGE"), Some(big.as_str()));
    assert_eq!(entry.get_str("blob"), Some(big.as_str()));
    assert_eq!(entry.get_str("PRIORITY"), Some("3"));

    drop(listener);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn missing_journal_socket_is_reported() {
    let dir = unique_temp_dir("absent");
    let config = JournalConfig::with_socket_path(dir.join("nobody-home.sock"));
    let handler =
        JournalHandler::with_config(HandlerOptions::default(), config).expect("socket should open");

    let err = handler
        .handle(&Record::new(Level::Info, "lost"))
        .expect_err("send without receiver should fail");
    let slogjournal_handler::HandlerError::Transport(err) = err;
    assert_eq!(
        err.io_error().map(|e| e.kind()),
        Some(std::io::ErrorKind::NotFound)
    );

    let _ = std::fs::remove_dir_all(&dir);
}
