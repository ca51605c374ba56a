#[cfg(not(unix))]
compile_error!("the slogjournal CLI requires a Unix target");

mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "slogjournal", version, about = "Structured logging to the systemd journal")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "warn", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use slogjournal_handler::Level;

    use super::*;

    #[test]
    fn parses_send_subcommand() {
        let cli = Cli::try_parse_from([
            "slogjournal",
            "send",
            "disk almost full",
            "--level",
            "warning",
            "--attr",
            "mount=/var",
            "-a",
            "free.bytes=1024",
            "--group",
            "storage",
        ])
        .expect("send args should parse");

        let Command::Send(args) = cli.command else {
            panic!("expected send");
        };
        assert_eq!(args.message, "disk almost full");
        assert_eq!(args.level, Level::Warning);
        assert_eq!(args.attrs, vec!["mount=/var", "free.bytes=1024"]);
        assert_eq!(args.groups, vec!["storage"]);
    }

    #[test]
    fn rejects_unknown_level() {
        let err = Cli::try_parse_from(["slogjournal", "send", "x", "--level", "verbose"])
            .expect_err("unknown level should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn parses_listen_subcommand() {
        let cli = Cli::try_parse_from(["slogjournal", "listen", "/tmp/j.sock", "--count", "3"])
            .expect("listen args should parse");
        assert!(matches!(
            cli.command,
            Command::Listen(ref args) if args.count == Some(3)
        ));
    }
}
