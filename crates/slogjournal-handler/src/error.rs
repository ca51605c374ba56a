use slogjournal_transport::TransportError;

/// Errors that can occur while handling a record.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// The entry could not be delivered. The record is dropped.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

pub type Result<T> = std::result::Result<T, HandlerError>;
