use std::fmt;
use std::sync::Arc;

use crate::attr::Attr;
use crate::level::Leveler;

/// Rewrites a leaf attribute before it is encoded.
///
/// Receives the group path enclosing the attribute. Never called for groups
/// or for the synthetic `MESSAGE`, `PRIORITY`, `CODE_*` and `TIMESTAMP`
/// fields.
pub type ReplaceAttr = Arc<dyn Fn(&[String], Attr) -> Attr + Send + Sync>;

/// Rewrites a group name before it extends the key prefix.
pub type ReplaceGroup = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Handler configuration.
#[derive(Clone, Default)]
pub struct HandlerOptions {
    /// Minimum enabled level. Defaults to [`LevelVar::from_env`](crate::LevelVar::from_env).
    pub level: Option<Arc<dyn Leveler>>,
    pub replace_attr: Option<ReplaceAttr>,
    pub replace_group: Option<ReplaceGroup>,
}

impl HandlerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(mut self, level: impl Leveler + 'static) -> Self {
        self.level = Some(Arc::new(level));
        self
    }

    /// Share a level source (typically an `Arc<LevelVar>`) with other handlers.
    pub fn shared_level(mut self, level: Arc<dyn Leveler>) -> Self {
        self.level = Some(level);
        self
    }

    pub fn replace_attr(
        mut self,
        f: impl Fn(&[String], Attr) -> Attr + Send + Sync + 'static,
    ) -> Self {
        self.replace_attr = Some(Arc::new(f));
        self
    }

    pub fn replace_group(mut self, f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        self.replace_group = Some(Arc::new(f));
        self
    }
}

impl fmt::Debug for HandlerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerOptions")
            .field("level", &self.level)
            .field("replace_attr", &self.replace_attr.is_some())
            .field("replace_group", &self.replace_group.is_some())
            .finish()
    }
}
