use std::os::unix::fs::FileTypeExt;
use std::path::Path;

use serde::Serialize;
use slogjournal_handler::{Level, Leveler, LevelVar, DEBUG_INVOCATION};
use slogjournal_transport::{JournalConfig, JournalSocket};

use crate::cmd::DoctorArgs;
use crate::exit::{CliResult, HEALTH_CHECK_FAILED, SUCCESS};
use crate::output::OutputFormat;

#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
enum CheckStatus {
    Pass,
    Fail,
    Warn,
    Info,
    Skip,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    name: String,
    status: CheckStatus,
    detail: String,
}

impl CheckResult {
    fn new(name: &str, status: CheckStatus, detail: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct DoctorOutput {
    checks: Vec<CheckResult>,
    overall: &'static str,
}

pub fn run(args: DoctorArgs, format: OutputFormat) -> CliResult<i32> {
    let checks = vec![
        platform_transport_check(),
        journal_socket_check(&args.socket),
        memfd_sealing_check(),
        send_buffer_check(&args.socket),
        default_level_check(),
    ];

    let has_fail = checks.iter().any(|c| matches!(c.status, CheckStatus::Fail));
    let overall = if has_fail { "fail" } else { "pass" };

    let output = DoctorOutput { checks, overall };
    print_doctor(&output, format);

    if has_fail {
        Ok(HEALTH_CHECK_FAILED)
    } else {
        Ok(SUCCESS)
    }
}

fn print_doctor(output: &DoctorOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(output).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("slogjournal doctor\n");
            for c in &output.checks {
                println!(
                    "  [{:>4}] {:<18} {}",
                    status_text(c.status),
                    c.name,
                    c.detail
                );
            }
            if output.overall == "pass" {
                println!("\n  Result: all checks passed");
            } else {
                println!("\n  Result: one or more checks failed");
            }
        }
        OutputFormat::Raw => {
            println!("{}", output.overall);
        }
    }
}

fn status_text(status: CheckStatus) -> &'static str {
    match status {
        CheckStatus::Pass => "PASS",
        CheckStatus::Fail => "FAIL",
        CheckStatus::Warn => "WARN",
        CheckStatus::Info => "INFO",
        CheckStatus::Skip => "SKIP",
    }
}

fn platform_transport_check() -> CheckResult {
    if cfg!(target_os = "linux") {
        CheckResult::new(
            "platform_transport",
            CheckStatus::Pass,
            "Unix datagram sockets with memfd fallback",
        )
    } else {
        CheckResult::new(
            "platform_transport",
            CheckStatus::Fail,
            "the journal transport requires Linux",
        )
    }
}

fn journal_socket_check(path: &Path) -> CheckResult {
    match std::fs::metadata(path) {
        Ok(meta) if meta.file_type().is_socket() => CheckResult::new(
            "journal_socket",
            CheckStatus::Pass,
            format!("{} is a socket", path.display()),
        ),
        Ok(_) => CheckResult::new(
            "journal_socket",
            CheckStatus::Fail,
            format!("{} exists but is not a socket", path.display()),
        ),
        Err(err) => CheckResult::new(
            "journal_socket",
            CheckStatus::Fail,
            format!("{}: {err}", path.display()),
        ),
    }
}

fn memfd_sealing_check() -> CheckResult {
    #[cfg(target_os = "linux")]
    {
        use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};

        // SAFETY: the name is a valid C string; the returned descriptor is
        // owned below.
        let raw = unsafe {
            libc::memfd_create(
                c"slogjournal-doctor".as_ptr(),
                libc::MFD_CLOEXEC | libc::MFD_ALLOW_SEALING,
            )
        };
        if raw < 0 {
            return CheckResult::new(
                "memfd_sealing",
                CheckStatus::Fail,
                format!("memfd_create: {}", std::io::Error::last_os_error()),
            );
        }
        // SAFETY: `raw` is a fresh descriptor nothing else owns.
        let fd = unsafe { OwnedFd::from_raw_fd(raw) };
        let seals =
            libc::F_SEAL_SHRINK | libc::F_SEAL_GROW | libc::F_SEAL_WRITE | libc::F_SEAL_SEAL;
        // SAFETY: `fd` is open for the duration of the call.
        if unsafe { libc::fcntl(fd.as_raw_fd(), libc::F_ADD_SEALS, seals) } < 0 {
            return CheckResult::new(
                "memfd_sealing",
                CheckStatus::Fail,
                format!("F_ADD_SEALS: {}", std::io::Error::last_os_error()),
            );
        }
        CheckResult::new(
            "memfd_sealing",
            CheckStatus::Pass,
            "oversized entries can be passed as sealed memfds",
        )
    }

    #[cfg(not(target_os = "linux"))]
    {
        CheckResult::new("memfd_sealing", CheckStatus::Skip, "memfd is Linux-only")
    }
}

fn send_buffer_check(path: &Path) -> CheckResult {
    let socket = match JournalSocket::with_config(JournalConfig::with_socket_path(path)) {
        Ok(socket) => socket,
        Err(err) => {
            return CheckResult::new("send_buffer", CheckStatus::Skip, err.to_string());
        }
    };
    match socket.send_buffer_size() {
        Ok(size) => CheckResult::new(
            "send_buffer",
            CheckStatus::Info,
            format!("SO_SNDBUF {size} bytes; larger entries use memfd"),
        ),
        Err(err) => CheckResult::new("send_buffer", CheckStatus::Warn, err.to_string()),
    }
}

fn default_level_check() -> CheckResult {
    let level = LevelVar::from_env().level();
    let status = if level == Level::Debug {
        CheckStatus::Warn
    } else {
        CheckStatus::Info
    };
    CheckResult::new(
        "default_level",
        status,
        format!("{level} ({DEBUG_INVOCATION}={})", debug_invocation_value()),
    )
}

fn debug_invocation_value() -> String {
    std::env::var(DEBUG_INVOCATION).unwrap_or_else(|_| "unset".to_string())
}
