/// Errors that can occur while decoding journal fields.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// The field key is empty or not valid UTF-8.
    #[error("invalid field key (empty or not UTF-8)")]
    InvalidKey,

    /// A binary field declares a value larger than the configured maximum.
    #[error("field value too large ({size} bytes, max {max})")]
    ValueTooLarge { size: u64, max: usize },

    /// A binary field value is not followed by the terminating newline.
    #[error("binary field `{key}` is missing its terminating newline")]
    MissingTerminator { key: String },

    /// Trailing bytes do not form a complete field.
    #[error("entry truncated ({remaining} trailing bytes)")]
    Truncated { remaining: usize },
}

pub type Result<T> = std::result::Result<T, WireError>;
