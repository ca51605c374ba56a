#![cfg(all(target_os = "linux", feature = "cli"))]

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = PathBuf::from(format!(
        "/tmp/sjcli-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn wait_for_socket(path: &Path, timeout: Duration) {
    let start = Instant::now();
    while !path.exists() {
        if start.elapsed() >= timeout {
            panic!("listener did not bind {}", path.display());
        }
        thread::sleep(Duration::from_millis(25));
    }
}

fn slogjournal() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_slogjournal"));
    cmd.env_remove("SLOGJOURNAL_SOCKET")
        .arg("--log-level")
        .arg("error");
    cmd
}

#[test]
fn send_is_received_by_listen() {
    let dir = unique_temp_dir("roundtrip");
    let sock_path = dir.join("journal.sock");

    let child = slogjournal()
        .arg("--format")
        .arg("json")
        .arg("listen")
        .arg(&sock_path)
        .arg("--count")
        .arg("1")
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("listen should start");

    wait_for_socket(&sock_path, Duration::from_secs(3));

    let status = slogjournal()
        .arg("send")
        .arg("Hello, World!")
        .arg("--socket")
        .arg(&sock_path)
        .arg("--level")
        .arg("notice")
        .arg("--group")
        .arg("app")
        .arg("--attr")
        .arg("http.status=200")
        .status()
        .expect("send should run");
    assert!(status.success());

    let output = child.wait_with_output().expect("listen should exit");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(r#"{"key":"MESSAGE","value":"Hello, World!"}"#));
    assert!(stdout.contains(r#"{"key":"PRIORITY","value":"5"}"#));
    assert!(stdout.contains(r#"{"key":"app_http_status","value":"200"}"#));
    assert!(stdout.contains(r#""delivery":"inline""#));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn dry_run_prints_encoded_entry() {
    let output = slogjournal()
        .arg("--format")
        .arg("pretty")
        .arg("send")
        .arg("two\nlines")
        .arg("--no-timestamp")
        .arg("--dry-run")
        .arg("-a")
        .arg("user=alice")
        .output()
        .expect("send should run");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout, "MESSAGE=two\nlines\nPRIORITY=6\nuser=alice\n\n");
}

#[test]
fn send_without_receiver_exits_1() {
    let dir = unique_temp_dir("absent");
    let output = slogjournal()
        .arg("send")
        .arg("nobody listening")
        .arg("--socket")
        .arg(dir.join("missing.sock"))
        .output()
        .expect("send should run");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("send failed"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn malformed_attr_is_usage_error() {
    let output = slogjournal()
        .arg("send")
        .arg("x")
        .arg("--dry-run")
        .arg("--attr")
        .arg("novalue")
        .output()
        .expect("send should run");

    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn doctor_reports_json() {
    let dir = unique_temp_dir("doctor");
    let output = slogjournal()
        .arg("--format")
        .arg("json")
        .arg("doctor")
        .arg("--socket")
        .arg(dir.join("missing.sock"))
        .output()
        .expect("doctor should run");

    assert_eq!(output.status.code(), Some(30));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(r#""name":"memfd_sealing","status":"pass""#));
    assert!(stdout.contains(r#""name":"journal_socket","status":"fail""#));
    assert!(stdout.contains(r#""overall":"fail""#));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn version_prints_package_version() {
    let output = slogjournal()
        .arg("version")
        .output()
        .expect("version should run");
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        format!("slogjournal {}", env!("CARGO_PKG_VERSION"))
    );
}
