use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use bytes::Bytes;
use chrono::{DateTime, SecondsFormat, Utc};

/// Upper bound on chained lazy values before resolution gives up.
const MAX_RESOLVE_DEPTH: usize = 100;

/// A value whose computation is deferred until the record is encoded.
pub trait LogValuer: Send + Sync {
    fn log_value(&self) -> Value;
}

impl<F> LogValuer for F
where
    F: Fn() -> Value + Send + Sync,
{
    fn log_value(&self) -> Value {
        self()
    }
}

/// Shared handle to a [`LogValuer`].
#[derive(Clone)]
pub struct Lazy(Arc<dyn LogValuer>);

impl Lazy {
    pub fn new(valuer: impl LogValuer + 'static) -> Self {
        Self(Arc::new(valuer))
    }
}

impl fmt::Debug for Lazy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Lazy(..)")
    }
}

/// An attribute value: a scalar, a deferred producer, or a nested group.
#[derive(Debug, Clone)]
pub enum Value {
    String(String),
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
    Duration(Duration),
    Time(SystemTime),
    Bytes(Bytes),
    Lazy(Lazy),
    Group(Vec<Attr>),
}

impl Value {
    pub fn is_group(&self) -> bool {
        matches!(self, Value::Group(_))
    }

    /// Run deferred producers until a concrete value remains.
    ///
    /// Each producer in the chain is invoked once. A chain longer than
    /// `MAX_RESOLVE_DEPTH` resolves to an error string.
    pub fn resolve(self) -> Value {
        let mut value = self;
        for _ in 0..MAX_RESOLVE_DEPTH {
            match value {
                Value::Lazy(lazy) => value = lazy.0.log_value(),
                other => return other,
            }
        }
        match value {
            Value::Lazy(_) => Value::String(format!(
                "!ERROR: lazy value not resolved after {MAX_RESOLVE_DEPTH} steps"
            )),
            other => other,
        }
    }

    /// Bytes written to the journal for a scalar value.
    pub fn to_field_bytes(&self) -> Cow<'_, [u8]> {
        match self {
            Value::String(s) => Cow::Borrowed(s.as_bytes()),
            Value::Bytes(b) => Cow::Borrowed(b.as_ref()),
            other => Cow::Owned(other.to_string().into_bytes()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            Value::Int(v) => write!(f, "{v}"),
            Value::Uint(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Duration(d) => write!(f, "{d:?}"),
            Value::Time(t) => {
                let (secs, nanos) = unix_time(*t);
                match DateTime::<Utc>::from_timestamp(secs, nanos) {
                    Some(t) => f.write_str(&t.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
                    None => write!(f, "{secs}"),
                }
            }
            Value::Bytes(b) => f.write_str(&String::from_utf8_lossy(b)),
            Value::Lazy(_) => f.write_str("<lazy>"),
            Value::Group(attrs) => {
                f.write_str("[")?;
                for (i, attr) in attrs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}={}", attr.key, attr.value)?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Whole seconds (floored) and the non-negative nanosecond remainder since
/// the Unix epoch. Saturates at the `i64` range.
pub(crate) fn unix_time(time: SystemTime) -> (i64, u32) {
    match time.duration_since(SystemTime::UNIX_EPOCH) {
        Ok(after) => (
            i64::try_from(after.as_secs()).unwrap_or(i64::MAX),
            after.subsec_nanos(),
        ),
        Err(err) => {
            let before = err.duration();
            let secs = i64::try_from(before.as_secs()).unwrap_or(i64::MAX);
            match before.subsec_nanos() {
                0 => (-secs, 0),
                nanos => (-secs.saturating_add(1), 1_000_000_000 - nanos),
            }
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident $(as $cast:ty)?),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v $(as $cast)?)
                }
            }
        )*
    };
}

value_from! {
    String => String,
    i64 => Int,
    i32 => Int as i64,
    i16 => Int as i64,
    i8 => Int as i64,
    isize => Int as i64,
    u64 => Uint,
    u32 => Uint as u64,
    u16 => Uint as u64,
    u8 => Uint as u64,
    usize => Uint as u64,
    f64 => Float,
    f32 => Float as f64,
    bool => Bool,
    Duration => Duration,
    SystemTime => Time,
    Bytes => Bytes,
    Lazy => Lazy,
    Vec<Attr> => Group,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<Cow<'_, str>> for Value {
    fn from(v: Cow<'_, str>) -> Self {
        Value::String(v.into_owned())
    }
}

/// A key paired with a [`Value`].
#[derive(Debug, Clone)]
pub struct Attr {
    pub key: String,
    pub value: Value,
}

impl Attr {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn string(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(key, Value::String(value.into()))
    }

    pub fn int(key: impl Into<String>, value: i64) -> Self {
        Self::new(key, Value::Int(value))
    }

    pub fn bool(key: impl Into<String>, value: bool) -> Self {
        Self::new(key, Value::Bool(value))
    }

    /// A nested group. An empty `key` splices the children into the parent.
    pub fn group(key: impl Into<String>, attrs: impl IntoIterator<Item = Attr>) -> Self {
        Self::new(key, Value::Group(attrs.into_iter().collect()))
    }

    /// A value computed only if and when the record is encoded.
    pub fn lazy(key: impl Into<String>, valuer: impl LogValuer + 'static) -> Self {
        Self::new(key, Value::Lazy(Lazy::new(valuer)))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn scalars_stringify() {
        assert_eq!(Value::from("text").to_string(), "text");
        assert_eq!(Value::from(-42i32).to_string(), "-42");
        assert_eq!(Value::from(7u8).to_string(), "7");
        assert_eq!(Value::from(1.5f64).to_string(), "1.5");
        assert_eq!(Value::from(true).to_string(), "true");
        assert_eq!(
            Value::from(Duration::from_millis(1500)).to_string(),
            "1.5s"
        );
        assert_eq!(
            Value::from(SystemTime::UNIX_EPOCH + Duration::from_secs(86_400)).to_string(),
            "1970-01-02T00:00:00Z"
        );
    }

    #[test]
    fn unix_time_floors_before_epoch() {
        let epoch = SystemTime::UNIX_EPOCH;
        assert_eq!(unix_time(epoch), (0, 0));
        assert_eq!(unix_time(epoch + Duration::from_millis(1_500)), (1, 500_000_000));
        assert_eq!(unix_time(epoch - Duration::from_millis(1_500)), (-2, 500_000_000));
        assert_eq!(unix_time(epoch - Duration::from_secs(3)), (-3, 0));
    }

    #[test]
    fn far_future_time_displays_raw_seconds() {
        let far = SystemTime::UNIX_EPOCH + Duration::from_secs(1 << 45);
        assert_eq!(Value::from(far).to_string(), (1u64 << 45).to_string());
    }

    #[test]
    fn field_bytes_borrow_strings() {
        let value = Value::from("borrowed");
        assert!(matches!(value.to_field_bytes(), Cow::Borrowed(b"borrowed")));

        let raw = Value::from(Bytes::from_static(b"\x00\x01"));
        assert_eq!(raw.to_field_bytes().as_ref(), b"\x00\x01");
    }

    #[test]
    fn group_display_lists_children() {
        let group = Attr::group("req", [Attr::string("method", "GET"), Attr::int("status", 200)]);
        assert_eq!(group.value.to_string(), "[method=GET status=200]");
        assert!(group.value.is_group());
    }

    #[test]
    fn lazy_resolves_once_per_producer() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let attr = Attr::lazy("computed", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Value::from("done")
        });

        let resolved = attr.value.resolve();
        assert_eq!(resolved.to_string(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn lazy_chains_resolve_to_concrete_value() {
        let inner = Lazy::new(|| Value::from(3i64));
        let outer = Value::Lazy(Lazy::new(move || Value::Lazy(inner.clone())));
        assert!(matches!(outer.resolve(), Value::Int(3)));
    }

    #[test]
    fn self_referential_lazy_stops() {
        struct Forever;
        impl LogValuer for Forever {
            fn log_value(&self) -> Value {
                Value::Lazy(Lazy::new(Forever))
            }
        }

        let resolved = Value::Lazy(Lazy::new(Forever)).resolve();
        assert!(resolved.to_string().starts_with("!ERROR"));
    }
}
