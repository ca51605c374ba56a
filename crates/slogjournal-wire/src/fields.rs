//! Well-known field names emitted by the encoder.
//!
//! These are the trusted, synthetic fields derived from the record itself
//! rather than from its attributes. Attribute rewrite hooks never see them.

/// Human-readable message text.
pub const MESSAGE: &str = "MESSAGE";
/// Syslog-style priority, `0` (emergency) through `7` (debug).
pub const PRIORITY: &str = "PRIORITY";
/// Source file of the log call.
pub const CODE_FILE: &str = "CODE_FILE";
/// Function (or module path) of the log call.
pub const CODE_FUNC: &str = "CODE_FUNC";
/// Source line of the log call.
pub const CODE_LINE: &str = "CODE_LINE";
/// Record time in whole Unix seconds.
pub const TIMESTAMP: &str = "TIMESTAMP";

/// All synthetic fields, in emission order.
pub const SYNTHETIC_FIELDS: [&str; 6] =
    [MESSAGE, PRIORITY, CODE_FILE, CODE_FUNC, CODE_LINE, TIMESTAMP];

/// Whether `key` names one of the synthetic fields.
pub fn is_synthetic(key: &str) -> bool {
    SYNTHETIC_FIELDS.contains(&key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_fields_are_recognised() {
        assert!(is_synthetic("MESSAGE"));
        assert!(is_synthetic("TIMESTAMP"));
        assert!(!is_synthetic("message"));
        assert!(!is_synthetic("CODE"));
    }
}
