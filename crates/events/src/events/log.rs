//! Channel-scoped log lines
//!
//! Every manager writes to a named channel (one per bootstrap step). Raw
//! subprocess output is forwarded chunk by chunk; lifecycle messages are
//! marked significant so front ends can surface them.

use serde::{Deserialize, Serialize};

use crate::EventLevel;

/// Severity attached to a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogSeverity {
    /// Raw output, no particular severity
    #[default]
    Log,
    Info,
    Warn,
    Error,
}

impl LogSeverity {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Log => "log",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl From<LogSeverity> for EventLevel {
    fn from(severity: LogSeverity) -> Self {
        match severity {
            LogSeverity::Log => EventLevel::Debug,
            LogSeverity::Info => EventLevel::Info,
            LogSeverity::Warn => EventLevel::Warn,
            LogSeverity::Error => EventLevel::Error,
        }
    }
}

/// One write to the log sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    pub channel: String,
    pub text: String,
    /// Whether the line should be surfaced to the user, not just persisted.
    pub significant: bool,
    pub severity: LogSeverity,
}

impl LogEvent {
    pub fn new(
        channel: impl Into<String>,
        text: impl Into<String>,
        significant: bool,
        severity: LogSeverity,
    ) -> Self {
        Self {
            channel: channel.into(),
            text: text.into(),
            significant,
            severity,
        }
    }
}
