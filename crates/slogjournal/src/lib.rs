//! Structured, leveled logging delivered to the systemd journal.
//!
//! Records are flattened into journal fields (`MESSAGE`, `PRIORITY`, `CODE_*`,
//! `TIMESTAMP`, then attributes with group prefixes joined by `_`) and sent
//! as one datagram. Entries too large for a datagram travel as a sealed memfd.
//!
//! # Crate Structure
//!
//! - [`handler`]: levels, attributes, records and the [`JournalHandler`](handler::JournalHandler)
//! - [`transport`]: journal socket, memfd fallback, in-memory and listening ends
//! - [`wire`]: native-protocol field codec and entry decoding
//!
//! ```no_run
//! use slogjournal::handler::{Attr, HandlerOptions, JournalHandler, Level};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let log = JournalHandler::new(HandlerOptions::default())?
//!     .with_group("request")
//!     .with_attrs([Attr::string("id", "r-1")]);
//! log.log(Level::Info, "served", [Attr::int("status", 200)])?;
//! # Ok(())
//! # }
//! ```

/// Re-export handler types.
pub mod handler {
    pub use slogjournal_handler::*;
}

/// Re-export transport types.
pub mod transport {
    pub use slogjournal_transport::*;
}

/// Re-export wire types.
pub mod wire {
    pub use slogjournal_wire::*;
}

pub use slogjournal_handler::source_location;
