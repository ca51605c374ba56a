use std::sync::Arc;

use crate::error::Result;

/// A sink that delivers one encoded journal entry per call.
///
/// Implementations must deliver `entry` whole or not at all: an entry is
/// never split across multiple sends. `send` takes `&self` so one transport
/// can be shared by every handler in the process without locking.
pub trait Transport: Send + Sync {
    /// Deliver one complete entry.
    fn send(&self, entry: &[u8]) -> Result<()>;

    /// Short name for diagnostics.
    fn transport_name(&self) -> &'static str {
        "custom"
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(&self, entry: &[u8]) -> Result<()> {
        (**self).send(entry)
    }

    fn transport_name(&self) -> &'static str {
        (**self).transport_name()
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&self, entry: &[u8]) -> Result<()> {
        (**self).send(entry)
    }

    fn transport_name(&self) -> &'static str {
        (**self).transport_name()
    }
}
