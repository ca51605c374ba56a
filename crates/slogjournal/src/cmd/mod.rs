use std::path::PathBuf;

use clap::{Args, Subcommand};
use slogjournal_handler::Level;
use slogjournal_transport::{DEFAULT_MAX_DATAGRAM, DEFAULT_SOCKET_PATH};

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod doctor;
pub mod listen;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log a single record to the journal.
    Send(SendArgs),
    /// Bind a journal socket and print received entries.
    Listen(ListenArgs),
    /// Show version information.
    Version(VersionArgs),
    /// Run local environment health checks.
    Doctor(DoctorArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Send(args) => send::run(args, format),
        Command::Listen(args) => listen::run(args, format),
        Command::Version(args) => version::run(args),
        Command::Doctor(args) => doctor::run(args, format),
    }
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Message text (MESSAGE field).
    pub message: String,
    /// Record level (debug, info, notice, warning, error, critical, alert, emergency).
    #[arg(long, short = 'l', default_value = "info")]
    pub level: Level,
    /// Attribute to attach, repeatable. Keys may be dotted to nest groups (http.status=200).
    #[arg(long = "attr", short = 'a', value_name = "KEY=VALUE")]
    pub attrs: Vec<String>,
    /// Group applied to every attribute, repeatable; outermost first.
    #[arg(long = "group", short = 'g', value_name = "NAME")]
    pub groups: Vec<String>,
    /// Journal socket to deliver to.
    #[arg(long, env = "SLOGJOURNAL_SOCKET", default_value = DEFAULT_SOCKET_PATH)]
    pub socket: PathBuf,
    /// Omit the TIMESTAMP field.
    #[arg(long)]
    pub no_timestamp: bool,
    /// Print the encoded entry instead of sending it.
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    /// Socket path to bind.
    pub path: PathBuf,
    /// Exit after receiving N entries.
    #[arg(long)]
    pub count: Option<usize>,
    /// Largest inline datagram accepted, in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_DATAGRAM)]
    pub max_datagram: usize,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

#[derive(Args, Debug, Default)]
pub struct DoctorArgs {
    /// Journal socket to probe.
    #[arg(long, env = "SLOGJOURNAL_SOCKET", default_value = DEFAULT_SOCKET_PATH)]
    pub socket: PathBuf,
}
