use std::path::PathBuf;

/// Errors that can occur in journal transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to create the sending socket.
    #[error("failed to create journal socket: {0}")]
    Socket(std::io::Error),

    /// The inline (or descriptor-carrying) datagram could not be sent.
    #[error("failed to send to {path}: {source}")]
    Send {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Creating, filling, or sealing the memfd for an oversized entry failed.
    #[error("failed to prepare sealed payload: {0}")]
    Memfd(std::io::Error),

    /// Failed to bind a receiving socket.
    #[error("failed to bind to {path}: {source}")]
    Bind {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to receive or reconstruct an entry.
    #[error("failed to receive entry: {0}")]
    Receive(std::io::Error),

    /// A received datagram did not fit the receive buffer.
    #[error("received datagram truncated (buffer {capacity} bytes)")]
    Truncated { capacity: usize },

    /// An I/O error occurred on the transport socket.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The socket path is too long for the platform.
    #[error("socket path too long ({len} bytes, max {max}): {path}")]
    PathTooLong {
        path: PathBuf,
        len: usize,
        max: usize,
    },

    /// The journal transport is not available on this platform.
    #[error("journal transport unsupported on this platform")]
    Unsupported,
}

impl TransportError {
    /// The underlying OS error, if this failure came from a system call.
    pub fn io_error(&self) -> Option<&std::io::Error> {
        match self {
            TransportError::Socket(source)
            | TransportError::Memfd(source)
            | TransportError::Receive(source)
            | TransportError::Io(source)
            | TransportError::Send { source, .. }
            | TransportError::Bind { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;
