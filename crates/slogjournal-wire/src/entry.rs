use bytes::{Bytes, BytesMut};

use crate::codec::{decode_field, Field, DEFAULT_MAX_VALUE};
use crate::error::{Result, WireError};

/// A fully decoded journal entry: the fields of one datagram, in wire order.
///
/// Repeated keys are kept; lookups by key return the first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entry {
    fields: Vec<Field>,
}

impl Entry {
    /// Build an entry from already decoded fields.
    pub fn from_fields(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// First value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Bytes> {
        self.fields.iter().find(|f| f.key == key).map(|f| &f.value)
    }

    /// First value stored under `key`, as UTF-8.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|v| std::str::from_utf8(v).ok())
    }

    /// Every value stored under `key`, in wire order.
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a Bytes> + 'a {
        self.fields
            .iter()
            .filter(move |f| f.key == key)
            .map(|f| &f.value)
    }

    /// Number of fields stored under `key`.
    pub fn count(&self, key: &str) -> usize {
        self.fields.iter().filter(|f| f.key == key).count()
    }

    /// Whether any field is stored under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.fields.iter().any(|f| f.key == key)
    }

    /// All fields, in wire order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Field keys, in wire order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl IntoIterator for Entry {
    type Item = Field;
    type IntoIter = std::vec::IntoIter<Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

/// Decode a complete entry (one datagram payload).
pub fn decode_entry(data: &[u8]) -> Result<Entry> {
    decode_entry_with_limit(data, DEFAULT_MAX_VALUE)
}

/// Decode a complete entry, rejecting binary values above `max_value` bytes.
pub fn decode_entry_with_limit(data: &[u8], max_value: usize) -> Result<Entry> {
    let mut src = BytesMut::from(data);
    let mut fields = Vec::new();

    while !src.is_empty() {
        match decode_field(&mut src, max_value)? {
            Some(field) => fields.push(field),
            None => {
                return Err(WireError::Truncated {
                    remaining: src.len(),
                })
            }
        }
    }

    Ok(Entry { fields })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode_field;

    fn wire(fields: &[(&str, &[u8])]) -> Vec<u8> {
        let mut buf = BytesMut::new();
        for (key, value) in fields {
            encode_field(key, value, &mut buf);
        }
        buf.to_vec()
    }

    #[test]
    fn decodes_fields_in_order() {
        let data = wire(&[
            ("MESSAGE", b"Hello, World!"),
            ("PRIORITY", b"6"),
            ("key", b"value"),
        ]);

        let entry = decode_entry(&data).unwrap();
        assert_eq!(entry.len(), 3);
        assert_eq!(
            entry.keys().collect::<Vec<_>>(),
            vec!["MESSAGE", "PRIORITY", "key"]
        );
        assert_eq!(entry.get_str("MESSAGE"), Some("Hello, World!"));
        assert_eq!(entry.get_str("PRIORITY"), Some("6"));
        assert_eq!(entry.get_str("key"), Some("value"));
    }

    #[test]
    fn repeated_keys_are_kept() {
        let data = wire(&[("DUP", b"first"), ("DUP", b"second")]);

        let entry = decode_entry(&data).unwrap();
        assert_eq!(entry.count("DUP"), 2);
        assert_eq!(entry.get_str("DUP"), Some("first"));
        let all: Vec<_> = entry.get_all("DUP").map(|v| v.as_ref()).collect();
        assert_eq!(all, vec![&b"first"[..], &b"second"[..]]);
    }

    #[test]
    fn empty_datagram_is_empty_entry() {
        let entry = decode_entry(b"").unwrap();
        assert!(entry.is_empty());
    }

    #[test]
    fn trailing_garbage_is_truncation() {
        let mut data = wire(&[("MESSAGE", b"ok")]);
        data.extend_from_slice(b"PARTIAL=no-newline");

        let result = decode_entry(&data);
        assert!(matches!(result, Err(WireError::Truncated { remaining: 18 })));
    }

    #[test]
    fn limit_applies_to_binary_values() {
        let data = wire(&[("BIN", b"0123456789\n")]);
        assert!(decode_entry_with_limit(&data, 64).is_ok());
        assert!(matches!(
            decode_entry_with_limit(&data, 4),
            Err(WireError::ValueTooLarge { .. })
        ));
    }
}
