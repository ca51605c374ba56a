//! Record to journal-entry encoding.

use bytes::{Bytes, BytesMut};
use slogjournal_wire::{encode_field, CODE_FILE, CODE_FUNC, CODE_LINE, MESSAGE, PRIORITY, TIMESTAMP};

use crate::attr::{unix_time, Attr, Value};
use crate::options::HandlerOptions;
use crate::priority::Priority;
use crate::record::Record;

const INITIAL_ENTRY_CAPACITY: usize = 1024;

/// Key prefix plus the group path it was built from.
///
/// `prefix` is always `groups` joined with `_`, each segment followed by `_`.
#[derive(Debug, Clone, Default)]
pub(crate) struct Scope {
    prefix: String,
    groups: Vec<String>,
}

impl Scope {
    pub(crate) fn prefix(&self) -> &str {
        &self.prefix
    }

    pub(crate) fn groups(&self) -> &[String] {
        &self.groups
    }

    pub(crate) fn nested(&self, name: &str) -> Scope {
        let mut scope = self.clone();
        scope.push(name);
        scope
    }

    fn push(&mut self, name: &str) {
        self.prefix.push_str(name);
        self.prefix.push('_');
        self.groups.push(name.to_owned());
    }

    fn pop(&mut self) {
        if let Some(name) = self.groups.pop() {
            self.prefix.truncate(self.prefix.len() - name.len() - 1);
        }
    }
}

/// Applies the configured hooks while flattening attributes into fields.
pub(crate) struct AttrEncoder<'a> {
    options: &'a HandlerOptions,
}

impl<'a> AttrEncoder<'a> {
    pub(crate) fn new(options: &'a HandlerOptions) -> Self {
        Self { options }
    }

    /// Group names pass through `replace_group` before joining the prefix.
    pub(crate) fn group_name(&self, name: &str) -> String {
        match &self.options.replace_group {
            Some(replace) => replace(name),
            None => name.to_owned(),
        }
    }

    pub(crate) fn append_attr(&self, dst: &mut BytesMut, scope: &mut Scope, attr: Attr) {
        let attr = match &self.options.replace_attr {
            Some(replace) if !attr.value.is_group() => replace(scope.groups(), attr),
            _ => attr,
        };

        let Attr { key, value } = attr;
        match value.resolve() {
            Value::Group(children) if key.is_empty() => {
                for child in children {
                    self.append_attr(dst, scope, child);
                }
            }
            Value::Group(children) => {
                scope.push(&self.group_name(&key));
                for child in children {
                    self.append_attr(dst, scope, child);
                }
                scope.pop();
            }
            scalar => {
                if key.is_empty() {
                    return;
                }
                let mut field = String::with_capacity(scope.prefix().len() + key.len());
                field.push_str(scope.prefix());
                field.push_str(&key);
                // `=` and `\n` delimit keys on the wire.
                if field.contains(['=', '\n']) {
                    return;
                }
                encode_field(&field, &scalar.to_field_bytes(), dst);
            }
        }
    }
}

/// Encode `record` as one journal entry.
///
/// Synthetic fields come first, then `preformatted` verbatim, then the
/// record's own attributes flattened under `scope`.
pub(crate) fn encode_record(
    record: &Record,
    scope: &Scope,
    preformatted: &Bytes,
    options: &HandlerOptions,
) -> BytesMut {
    let mut buf = BytesMut::with_capacity(INITIAL_ENTRY_CAPACITY + preformatted.len());

    encode_field(MESSAGE, record.message.as_bytes(), &mut buf);
    encode_field(
        PRIORITY,
        Priority::from(record.level).as_str().as_bytes(),
        &mut buf,
    );

    if let Some(source) = &record.source {
        encode_field(CODE_FILE, source.file.as_bytes(), &mut buf);
        encode_field(CODE_FUNC, source.function.as_bytes(), &mut buf);
        encode_field(CODE_LINE, source.line.to_string().as_bytes(), &mut buf);
    }

    if let Some(time) = record.time {
        let (seconds, _) = unix_time(time);
        encode_field(TIMESTAMP, seconds.to_string().as_bytes(), &mut buf);
    }

    buf.extend_from_slice(preformatted);

    if record.num_attrs() > 0 {
        let encoder = AttrEncoder::new(options);
        let mut scope = scope.clone();
        for attr in record.attrs() {
            encoder.append_attr(&mut buf, &mut scope, attr.clone());
        }
    }

    buf
}
