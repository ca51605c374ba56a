//! Atomic delivery of encoded journal entries.
//!
//! Every entry goes out in exactly one operation:
//! - inline, as a single datagram to the journal socket, or
//! - when the kernel refuses the datagram as too large, as a sealed memfd
//!   passed with `SCM_RIGHTS` on an otherwise empty datagram.
//!
//! There is no retry, queue, or buffering at this layer. Failures other than
//! the oversize condition reach the caller unchanged.

pub mod error;
pub mod memory;
pub mod traits;

#[cfg(unix)]
pub mod listener;
#[cfg(target_os = "linux")]
mod memfd;
#[cfg(unix)]
pub mod socket;
#[cfg(unix)]
mod sys;

pub use error::{Result, TransportError};
pub use memory::MemoryTransport;
pub use traits::Transport;

#[cfg(unix)]
pub use listener::{Delivery, JournalListener, ReceivedEntry, DEFAULT_MAX_DATAGRAM};
#[cfg(unix)]
pub use socket::{JournalConfig, JournalSocket, DEFAULT_SEND_BUFFER_SIZE, DEFAULT_SOCKET_PATH};
