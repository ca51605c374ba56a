//! Derive scoped handlers and log a few records.
//!
//! Run with:
//!   cargo run --example scoped-logging
//!
//! Entries go to the system journal when it is reachable (inspect them with
//! `journalctl -o verbose -n 3`). Otherwise they are captured in memory and
//! printed to stdout.

use std::sync::Arc;
use std::time::Duration;

use slogjournal::handler::{Attr, HandlerOptions, JournalHandler, Level, Record, Value};
use slogjournal::transport::{JournalSocket, MemoryTransport, Transport};
use slogjournal::wire::decode_entry;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let memory = Arc::new(MemoryTransport::new());
    let transport: Arc<dyn Transport> = match JournalSocket::open() {
        Ok(socket) if socket.path().exists() => Arc::new(socket),
        _ => {
            eprintln!("journal socket unavailable, capturing entries in memory");
            memory.clone()
        }
    };

    let options = HandlerOptions::new()
        .level(Level::Debug)
        .replace_attr(|_groups, attr| Attr::new(attr.key.to_uppercase(), attr.value));
    let root = JournalHandler::with_transport(options, transport)
        .with_attrs([Attr::string("service", "inventory")]);

    let request = root
        .with_group("req")
        .with_attrs([Attr::string("id", "r-1029"), Attr::string("method", "GET")]);

    request.handle(
        &Record::new(Level::Info, "request served")
            .with_source(slogjournal::source_location!())
            .with_attr(Attr::new("elapsed", Duration::from_millis(42)))
            .with_attr(Attr::group("resp", [Attr::int("status", 200)])),
    )?;

    request.log(
        Level::Debug,
        "cache lookup",
        [Attr::lazy("hit_ratio", || Value::from(0.93f64))],
    )?;

    root.log(Level::Warning, "stock low\nreorder soon", [Attr::int("sku", 7731)])?;

    for raw in memory.take() {
        let entry = decode_entry(&raw)?;
        for field in entry.fields() {
            println!("{}={}", field.key, field.value_str().unwrap_or("<binary>"));
        }
        println!();
    }

    Ok(())
}
