use std::borrow::Cow;
use std::time::SystemTime;

use crate::attr::Attr;
use crate::level::Level;

/// Where a log call originated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: Cow<'static, str>,
    pub function: Cow<'static, str>,
    pub line: u32,
}

impl SourceLocation {
    pub fn new(
        file: impl Into<Cow<'static, str>>,
        function: impl Into<Cow<'static, str>>,
        line: u32,
    ) -> Self {
        Self {
            file: file.into(),
            function: function.into(),
            line,
        }
    }
}

/// Capture the [`SourceLocation`] of the macro invocation.
///
/// The function is reported as the enclosing module path.
#[macro_export]
macro_rules! source_location {
    () => {
        $crate::SourceLocation::new(file!(), module_path!(), line!())
    };
}

/// One log event.
#[derive(Debug, Clone)]
pub struct Record {
    /// When the event happened. `None` omits the `TIMESTAMP` field.
    pub time: Option<SystemTime>,
    pub level: Level,
    pub message: String,
    pub source: Option<SourceLocation>,
    attrs: Vec<Attr>,
}

impl Record {
    /// A record stamped with the current time.
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            time: Some(SystemTime::now()),
            level,
            message: message.into(),
            source: None,
            attrs: Vec::new(),
        }
    }

    pub fn with_time(mut self, time: Option<SystemTime>) -> Self {
        self.time = time;
        self
    }

    pub fn with_source(mut self, source: SourceLocation) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_attr(mut self, attr: Attr) -> Self {
        self.attrs.push(attr);
        self
    }

    pub fn with_attrs(mut self, attrs: impl IntoIterator<Item = Attr>) -> Self {
        self.attrs.extend(attrs);
        self
    }

    pub fn attrs(&self) -> &[Attr] {
        &self.attrs
    }

    pub fn num_attrs(&self) -> usize {
        self.attrs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_is_timestamped() {
        let record = Record::new(Level::Info, "hello");
        assert!(record.time.is_some());
        assert!(record.source.is_none());
        assert_eq!(record.num_attrs(), 0);
    }

    #[test]
    fn builders_accumulate_attrs_in_order() {
        let record = Record::new(Level::Warning, "disk")
            .with_time(None)
            .with_attr(Attr::string("a", "1"))
            .with_attrs([Attr::string("b", "2"), Attr::string("c", "3")])
            .with_attr(Attr::string("d", "4"));

        let keys: Vec<_> = record.attrs().iter().map(|a| a.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "b", "c", "d"]);
        assert!(record.time.is_none());
    }

    #[test]
    fn source_location_macro_captures_call_site() {
        let here = crate::source_location!();
        assert!(here.file.ends_with("record.rs"));
        assert_eq!(here.function, "slogjournal_handler::record::tests");
        assert!(here.line > 0);
    }
}
