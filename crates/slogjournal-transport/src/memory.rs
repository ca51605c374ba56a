use std::sync::{Mutex, MutexGuard, PoisonError};

use bytes::Bytes;

use crate::error::Result;
use crate::traits::Transport;

/// In-process transport that records every entry it is given.
///
/// Useful for inspecting encoder output without a journal socket.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    entries: Mutex<Vec<Bytes>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies of every entry sent so far, oldest first.
    pub fn entries(&self) -> Vec<Bytes> {
        self.lock().clone()
    }

    /// The most recent entry, if any.
    pub fn last(&self) -> Option<Bytes> {
        self.lock().last().cloned()
    }

    /// Remove and return every recorded entry.
    pub fn take(&self) -> Vec<Bytes> {
        std::mem::take(&mut *self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Bytes>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Transport for MemoryTransport {
    fn send(&self, entry: &[u8]) -> Result<()> {
        self.lock().push(Bytes::copy_from_slice(entry));
        Ok(())
    }

    fn transport_name(&self) -> &'static str {
        "memory"
    }
}
