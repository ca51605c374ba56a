//! Journal native-protocol field framing.
//!
//! Every journal entry is a sequence of fields, each framed one of two ways:
//! - `KEY=VALUE\n` when the value contains no line break
//! - `KEY\n` + 8-byte little-endian length + raw value + `\n` otherwise
//!
//! One entry travels as exactly one datagram. Nothing here performs I/O.

pub mod codec;
pub mod entry;
pub mod error;
pub mod fields;

pub use codec::{decode_field, encode_field, Field, DEFAULT_MAX_VALUE, LENGTH_SIZE};
pub use entry::{decode_entry, decode_entry_with_limit, Entry};
pub use error::{Result, WireError};
pub use fields::{
    is_synthetic, CODE_FILE, CODE_FUNC, CODE_LINE, MESSAGE, PRIORITY, SYNTHETIC_FIELDS, TIMESTAMP,
};
