use std::ffi::OsStr;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};

/// Environment variable systemd sets when a unit is started for debugging.
pub const DEBUG_INVOCATION: &str = "DEBUG_INVOCATION";

/// Record severity, least to most severe.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Level {
    Debug,
    #[default]
    Info,
    Notice,
    Warning,
    Error,
    Critical,
    Alert,
    Emergency,
}

impl Level {
    /// Every level, least severe first.
    pub const ALL: [Level; 8] = [
        Level::Debug,
        Level::Info,
        Level::Notice,
        Level::Warning,
        Level::Error,
        Level::Critical,
        Level::Alert,
        Level::Emergency,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Notice => "NOTICE",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Critical => "CRITICAL",
            Level::Alert => "ALERT",
            Level::Emergency => "EMERGENCY",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no known level.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown log level `{0}`")]
pub struct ParseLevelError(pub String);

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(Self::Debug),
            "INFO" => Ok(Self::Info),
            "NOTICE" => Ok(Self::Notice),
            "WARN" | "WARNING" => Ok(Self::Warning),
            "ERR" | "ERROR" => Ok(Self::Error),
            "CRIT" | "CRITICAL" => Ok(Self::Critical),
            "ALERT" => Ok(Self::Alert),
            "EMERG" | "EMERGENCY" => Ok(Self::Emergency),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}

/// Source of the minimum enabled level.
pub trait Leveler: Send + Sync + fmt::Debug {
    fn level(&self) -> Level;
}

impl Leveler for Level {
    fn level(&self) -> Level {
        *self
    }
}

/// A minimum level that can be changed while handlers are live.
///
/// Handlers sharing one `LevelVar` (through an `Arc`) all observe updates.
#[derive(Debug)]
pub struct LevelVar {
    level: AtomicU8,
}

impl LevelVar {
    pub fn new(level: Level) -> Self {
        Self {
            level: AtomicU8::new(level as u8),
        }
    }

    /// Debug when `DEBUG_INVOCATION=1` is set in the environment, else info.
    pub fn from_env() -> Self {
        Self::new(level_for_debug_invocation(
            std::env::var_os(DEBUG_INVOCATION).as_deref(),
        ))
    }

    pub fn set(&self, level: Level) {
        self.level.store(level as u8, Ordering::Relaxed);
    }
}

impl Default for LevelVar {
    fn default() -> Self {
        Self::from_env()
    }
}

impl Leveler for LevelVar {
    fn level(&self) -> Level {
        // Only `Level as u8` is ever stored.
        Level::ALL[self.level.load(Ordering::Relaxed) as usize]
    }
}

fn level_for_debug_invocation(value: Option<&OsStr>) -> Level {
    if value == Some(OsStr::new("1")) {
        Level::Debug
    } else {
        Level::Info
    }
}
