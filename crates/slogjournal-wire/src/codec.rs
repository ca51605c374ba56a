use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{Result, WireError};

/// Size of the little-endian length prefix on binary fields.
pub const LENGTH_SIZE: usize = 8;

/// Default maximum value size accepted by the decoder: 768 MiB.
///
/// Matches the largest field journald itself will store.
pub const DEFAULT_MAX_VALUE: usize = 768 * 1024 * 1024;

/// A single decoded journal field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field name, case preserved.
    pub key: String,
    /// Raw field value.
    pub value: Bytes,
}

impl Field {
    /// Create a new field.
    pub fn new(key: impl Into<String>, value: impl Into<Bytes>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// The value as UTF-8, if it is valid.
    pub fn value_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.value).ok()
    }
}

fn needs_binary(value: &[u8]) -> bool {
    value.contains(&b'\n')
}

/// Append one field to `dst`.
///
/// Wire format:
/// ```text
/// plain:   KEY '=' VALUE '\n'
/// binary:  KEY '\n' LEN(8B LE) VALUE '\n'     (VALUE contains '\n')
/// ```
///
/// The newline after a binary value is not part of the bare
/// `KEY\n<len><bytes>` form but journald requires it, so it is always written.
///
/// Keys are written verbatim; the encoder never rewrites their case.
pub fn encode_field(key: &str, value: &[u8], dst: &mut BytesMut) {
    if needs_binary(value) {
        dst.reserve(key.len() + 1 + LENGTH_SIZE + value.len() + 1);
        dst.put_slice(key.as_bytes());
        dst.put_u8(b'\n');
        dst.put_u64_le(value.len() as u64);
        dst.put_slice(value);
        dst.put_u8(b'\n');
    } else {
        dst.reserve(key.len() + 1 + value.len() + 1);
        dst.put_slice(key.as_bytes());
        dst.put_u8(b'=');
        dst.put_slice(value);
        dst.put_u8(b'\n');
    }
}

/// Decode one field from the front of `src`.
///
/// Returns `Ok(None)` if `src` does not hold a complete field. On success the
/// field's bytes are consumed from `src`.
pub fn decode_field(src: &mut BytesMut, max_value: usize) -> Result<Option<Field>> {
    let Some(split) = src.iter().position(|&b| b == b'=' || b == b'\n') else {
        return Ok(None);
    };

    let key = std::str::from_utf8(&src[..split]).map_err(|_| WireError::InvalidKey)?;
    if key.is_empty() {
        return Err(WireError::InvalidKey);
    }
    let key = key.to_owned();

    if src[split] == b'=' {
        let Some(end) = src[split + 1..].iter().position(|&b| b == b'\n') else {
            return Ok(None);
        };
        src.advance(split + 1);
        let value = src.split_to(end).freeze();
        src.advance(1);
        return Ok(Some(Field { key, value }));
    }

    let header = split + 1 + LENGTH_SIZE;
    if src.len() < header {
        return Ok(None);
    }
    let mut len_bytes = [0u8; LENGTH_SIZE];
    len_bytes.copy_from_slice(&src[split + 1..header]);
    let declared = u64::from_le_bytes(len_bytes);
    if declared > max_value as u64 {
        return Err(WireError::ValueTooLarge {
            size: declared,
            max: max_value,
        });
    }
    let len = declared as usize;

    let Some(total) = header.checked_add(len).and_then(|n| n.checked_add(1)) else {
        return Err(WireError::ValueTooLarge {
            size: declared,
            max: max_value,
        });
    };
    if src.len() < total {
        return Ok(None);
    }
    if src[header + len] != b'\n' {
        return Err(WireError::MissingTerminator { key });
    }

    src.advance(header);
    let value = src.split_to(len).freeze();
    src.advance(1);
    Ok(Some(Field { key, value }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_field_layout() {
        let mut buf = BytesMut::new();
        encode_field("MESSAGE", b"Hello, World!", &mut buf);
        assert_eq!(buf.as_ref(), b"MESSAGE=Hello, World!\n");
    }

    #[test]
    fn binary_field_layout() {
        let mut buf = BytesMut::new();
        encode_field("MESSAGE", b"a\nb", &mut buf);

        let mut expected = b"MESSAGE\n".to_vec();
        expected.extend_from_slice(&3u64.to_le_bytes());
        expected.extend_from_slice(b"a\nb\n");
        assert_eq!(buf.as_ref(), expected.as_slice());
    }

    #[test]
    fn decode_plain_and_binary() {
        let mut buf = BytesMut::new();
        encode_field("first", b"one", &mut buf);
        encode_field("SECOND", b"line1\nline2", &mut buf);

        let f1 = decode_field(&mut buf, DEFAULT_MAX_VALUE).unwrap().unwrap();
        assert_eq!(f1.key, "first");
        assert_eq!(f1.value.as_ref(), b"one");
        assert!(!needs_binary(&f1.value));

        let f2 = decode_field(&mut buf, DEFAULT_MAX_VALUE).unwrap().unwrap();
        assert_eq!(f2.key, "SECOND");
        assert_eq!(f2.value.as_ref(), b"line1\nline2");
        assert!(needs_binary(&f2.value));

        assert!(buf.is_empty());
    }

    #[test]
    fn empty_value_is_plain() {
        let mut buf = BytesMut::new();
        encode_field("EMPTY", b"", &mut buf);
        assert_eq!(buf.as_ref(), b"EMPTY=\n");

        let field = decode_field(&mut buf, DEFAULT_MAX_VALUE).unwrap().unwrap();
        assert!(field.value.is_empty());
    }

    #[test]
    fn value_may_contain_equals_sign() {
        let mut buf = BytesMut::new();
        encode_field("EXPR", b"a=b=c", &mut buf);
        let field = decode_field(&mut buf, DEFAULT_MAX_VALUE).unwrap().unwrap();
        assert_eq!(field.key, "EXPR");
        assert_eq!(field.value.as_ref(), b"a=b=c");
    }

    #[test]
    fn decode_incomplete_plain() {
        let mut buf = BytesMut::from(&b"KEY=no newline yet"[..]);
        assert!(decode_field(&mut buf, DEFAULT_MAX_VALUE).unwrap().is_none());
        assert_eq!(buf.len(), 18, "incomplete input must not be consumed");
    }

    #[test]
    fn decode_incomplete_binary() {
        let mut buf = BytesMut::new();
        encode_field("KEY", b"x\ny", &mut buf);
        buf.truncate(buf.len() - 2);
        assert!(decode_field(&mut buf, DEFAULT_MAX_VALUE).unwrap().is_none());
    }

    #[test]
    fn decode_rejects_empty_key() {
        let mut buf = BytesMut::from(&b"=value\n"[..]);
        let result = decode_field(&mut buf, DEFAULT_MAX_VALUE);
        assert!(matches!(result, Err(WireError::InvalidKey)));
    }

    #[test]
    fn decode_rejects_oversized_binary_value() {
        let mut buf = BytesMut::new();
        buf.put_slice(b"BIG\n");
        buf.put_u64_le(1024);

        let result = decode_field(&mut buf, 16);
        assert!(matches!(
            result,
            Err(WireError::ValueTooLarge { size: 1024, max: 16 })
        ));
    }

    #[test]
    fn decode_rejects_missing_terminator() {
        let mut buf = BytesMut::new();
        buf.put_slice(b"KEY\n");
        buf.put_u64_le(3);
        buf.put_slice(b"a\nbX");

        let result = decode_field(&mut buf, DEFAULT_MAX_VALUE);
        assert!(matches!(result, Err(WireError::MissingTerminator { .. })));
    }

    #[test]
    fn huge_declared_length_does_not_overflow() {
        let mut buf = BytesMut::from(&b"BLOB\n"[..]);
        buf.extend_from_slice(&u64::MAX.to_le_bytes());
        buf.extend_from_slice(b"tail\n");

        let err = decode_field(&mut buf, usize::MAX).unwrap_err();
        assert!(matches!(err, WireError::ValueTooLarge { size: u64::MAX, .. }));
    }
}
