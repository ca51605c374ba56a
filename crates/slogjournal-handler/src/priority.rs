use std::fmt;

use crate::level::Level;

/// Syslog priority carried in the `PRIORITY` field, most severe first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Priority {
    Emergency = 0,
    Alert = 1,
    Critical = 2,
    Error = 3,
    Warning = 4,
    Notice = 5,
    Info = 6,
    Debug = 7,
}

impl Priority {
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// The decimal wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Priority::Emergency => "0",
            Priority::Alert => "1",
            Priority::Critical => "2",
            Priority::Error => "3",
            Priority::Warning => "4",
            Priority::Notice => "5",
            Priority::Info => "6",
            Priority::Debug => "7",
        }
    }
}

impl From<Level> for Priority {
    fn from(level: Level) -> Self {
        match level {
            Level::Debug => Priority::Debug,
            Level::Info => Priority::Info,
            Level::Notice => Priority::Notice,
            Level::Warning => Priority::Warning,
            Level::Error => Priority::Error,
            Level::Critical => Priority::Critical,
            Level::Alert => Priority::Alert,
            Level::Emergency => Priority::Emergency,
        }
    }
}

impl From<Priority> for Level {
    fn from(priority: Priority) -> Self {
        match priority {
            Priority::Debug => Level::Debug,
            Priority::Info => Level::Info,
            Priority::Notice => Level::Notice,
            Priority::Warning => Level::Warning,
            Priority::Error => Level::Error,
            Priority::Critical => Level::Critical,
            Priority::Alert => Level::Alert,
            Priority::Emergency => Level::Emergency,
        }
    }
}

/// A numeric priority outside `0..=7`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("priority {0} out of range 0..=7")]
pub struct InvalidPriority(pub u8);

impl TryFrom<u8> for Priority {
    type Error = InvalidPriority;

    fn try_from(value: u8) -> Result<Self, InvalidPriority> {
        match value {
            0 => Ok(Priority::Emergency),
            1 => Ok(Priority::Alert),
            2 => Ok(Priority::Critical),
            3 => Ok(Priority::Error),
            4 => Ok(Priority::Warning),
            5 => Ok(Priority::Notice),
            6 => Ok(Priority::Info),
            7 => Ok(Priority::Debug),
            other => Err(InvalidPriority(other)),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
