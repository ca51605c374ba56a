use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use slogjournal_transport::Transport;
use tracing::debug;
#[cfg(unix)]
use slogjournal_transport::{JournalConfig, JournalSocket};

use crate::attr::Attr;
use crate::encode::{encode_record, AttrEncoder, Scope};
use crate::error::Result;
use crate::level::{Level, LevelVar, Leveler};
use crate::options::HandlerOptions;
use crate::record::Record;

/// Encodes records as journal entries and sends each in one transport call.
///
/// Cloning is cheap. [`with_attrs`](Self::with_attrs) and
/// [`with_group`](Self::with_group) return new handlers and leave the
/// receiver untouched, so one parent can be derived from concurrently.
#[derive(Clone)]
pub struct JournalHandler {
    options: Arc<HandlerOptions>,
    level: Arc<dyn Leveler>,
    transport: Arc<dyn Transport>,
    scope: Scope,
    // Attributes bound through `with_attrs`, already encoded. Never mutated.
    preformatted: Bytes,
}

impl JournalHandler {
    /// Handler writing to the default journal socket.
    #[cfg(unix)]
    pub fn new(options: HandlerOptions) -> Result<Self> {
        Self::with_config(options, JournalConfig::default())
    }

    /// Handler writing to a journal socket with explicit configuration.
    #[cfg(unix)]
    pub fn with_config(options: HandlerOptions, config: JournalConfig) -> Result<Self> {
        let socket = JournalSocket::with_config(config)?;
        Ok(Self::with_transport(options, Arc::new(socket)))
    }

    /// Handler writing to any transport.
    pub fn with_transport(options: HandlerOptions, transport: Arc<dyn Transport>) -> Self {
        let level = options
            .level
            .clone()
            .unwrap_or_else(|| Arc::new(LevelVar::from_env()));
        Self {
            options: Arc::new(options),
            level,
            transport,
            scope: Scope::default(),
            preformatted: Bytes::new(),
        }
    }

    /// Whether records at `level` should be handled.
    pub fn enabled(&self, level: Level) -> bool {
        level >= self.level.level()
    }

    /// Encode `record` and deliver it in a single send.
    ///
    /// Does not consult [`enabled`](Self::enabled); callers gate on level.
    pub fn handle(&self, record: &Record) -> Result<()> {
        let entry = self.encode(record);
        if let Err(err) = self.transport.send(&entry) {
            debug!(
                transport = self.transport.transport_name(),
                size = entry.len(),
                error = %err,
                "journal entry dropped"
            );
            return Err(err.into());
        }
        Ok(())
    }

    /// Build and handle a record stamped now, if `level` is enabled.
    pub fn log(
        &self,
        level: Level,
        message: impl Into<String>,
        attrs: impl IntoIterator<Item = Attr>,
    ) -> Result<()> {
        if !self.enabled(level) {
            return Ok(());
        }
        self.handle(&Record::new(level, message).with_attrs(attrs))
    }

    /// The entry `handle` would send for `record`.
    pub fn encode(&self, record: &Record) -> BytesMut {
        encode_record(record, &self.scope, &self.preformatted, &self.options)
    }

    /// A handler that adds `attrs` to every record.
    ///
    /// The attributes are encoded now, under the current group prefix, into a
    /// private copy of the bound-attribute buffer.
    pub fn with_attrs(&self, attrs: impl IntoIterator<Item = Attr>) -> Self {
        let mut attrs = attrs.into_iter().peekable();
        if attrs.peek().is_none() {
            return self.clone();
        }

        let mut buf = BytesMut::with_capacity(self.preformatted.len() + 256);
        buf.extend_from_slice(&self.preformatted);
        let encoder = AttrEncoder::new(&self.options);
        let mut scope = self.scope.clone();
        for attr in attrs {
            encoder.append_attr(&mut buf, &mut scope, attr);
        }

        Self {
            preformatted: buf.freeze(),
            ..self.clone()
        }
    }

    /// A handler that nests every later attribute under `name`.
    ///
    /// The bound-attribute buffer is shared with the receiver, not copied. An
    /// empty name returns an equivalent handler.
    pub fn with_group(&self, name: &str) -> Self {
        if name.is_empty() {
            return self.clone();
        }
        let name = AttrEncoder::new(&self.options).group_name(name);
        Self {
            scope: self.scope.nested(&name),
            ..self.clone()
        }
    }

    /// Current key prefix, e.g. `REQUEST_`.
    pub fn prefix(&self) -> &str {
        self.scope.prefix()
    }

    /// Current group path.
    pub fn groups(&self) -> &[String] {
        self.scope.groups()
    }

    pub fn options(&self) -> &HandlerOptions {
        &self.options
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }
}

impl std::fmt::Debug for JournalHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JournalHandler")
            .field("level", &self.level)
            .field("transport", &self.transport.transport_name())
            .field("prefix", &self.scope.prefix())
            .field("preformatted_len", &self.preformatted.len())
            .finish()
    }
}
