//! Structured, leveled log records encoded for the systemd journal.
//!
//! A [`JournalHandler`] turns each [`Record`] into one journal entry and
//! hands it to a shared [`Transport`](slogjournal_transport::Transport) in a
//! single call. Attributes bound with [`JournalHandler::with_attrs`] are
//! encoded once and reused verbatim; [`JournalHandler::with_group`] nests
//! later attributes under a `GROUP_` prefix.

pub mod attr;
mod encode;
pub mod error;
pub mod handler;
pub mod level;
pub mod options;
pub mod priority;
pub mod record;

pub use attr::{Attr, Lazy, LogValuer, Value};
pub use error::{HandlerError, Result};
pub use handler::JournalHandler;
pub use level::{Level, LevelVar, Leveler, ParseLevelError, DEBUG_INVOCATION};
pub use options::{HandlerOptions, ReplaceAttr, ReplaceGroup};
pub use priority::{InvalidPriority, Priority};
pub use record::{Record, SourceLocation};
