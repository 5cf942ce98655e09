use serde::{Deserialize, Serialize};

use crate::{EventLevel, EventSource};
use devboot_errors::UserFacingError;

/// Structured failure information shared across domains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureContext {
    /// Stable error code, when the error provides one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Short user-facing message.
    pub message: String,
    /// Optional remediation hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether retrying the operation might succeed.
    pub retryable: bool,
}

impl FailureContext {
    /// Construct a new failure context.
    #[must_use]
    pub fn new(
        code: Option<impl Into<String>>,
        message: impl Into<String>,
        hint: Option<impl Into<String>>,
        retryable: bool,
    ) -> Self {
        Self {
            code: code.map(Into::into),
            message: message.into(),
            hint: hint.map(Into::into),
            retryable,
        }
    }

    /// Build failure context from a `UserFacingError` implementation.
    #[must_use]
    pub fn from_error<E: UserFacingError + ?Sized>(error: &E) -> Self {
        Self::new(
            error.user_code(),
            error.user_message().into_owned(),
            error.user_hint(),
            error.is_retryable(),
        )
    }
}

pub mod general;
pub mod log;
pub mod package;
pub mod platform;

pub use general::*;
pub use log::*;
pub use package::*;
pub use platform::*;

/// Top-level application event enum that aggregates all domain-specific events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    /// General utility events (warnings, errors, operations)
    General(GeneralEvent),

    /// Channel-scoped log lines (subprocess output, lifecycle messages)
    Log(LogEvent),

    /// Package manager operation events
    Package(PackageEvent),

    /// Platform operation events (filesystem, process)
    Platform(PlatformEvent),
}

impl AppEvent {
    /// Identify the source domain for this event.
    #[must_use]
    pub fn event_source(&self) -> EventSource {
        match self {
            Self::General(_) => EventSource::GENERAL,
            Self::Log(_) => EventSource::LOG,
            Self::Package(_) => EventSource::PACKAGE,
            Self::Platform(_) => EventSource::PLATFORM,
        }
    }

    /// Severity this event is recorded at
    #[must_use]
    pub fn log_level(&self) -> EventLevel {
        match self {
            Self::General(GeneralEvent::Error { .. })
            | Self::Package(PackageEvent::OperationFailed { .. })
            | Self::Platform(PlatformEvent::OperationFailed { .. }) => EventLevel::Error,

            Self::General(GeneralEvent::Warning { .. }) => EventLevel::Warn,

            Self::Log(event) => event.severity.into(),

            Self::General(GeneralEvent::DebugLog { .. })
            | Self::Platform(PlatformEvent::OperationStarted { .. }) => EventLevel::Debug,

            _ => EventLevel::Info,
        }
    }
}
