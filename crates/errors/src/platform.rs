//! Platform-specific operation errors

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

/// Errors that can occur during platform-specific operations
#[derive(Debug, Clone, Error)]
pub enum PlatformError {
    #[error("filesystem operation failed: {operation} - {message}")]
    FilesystemOperationFailed { operation: String, message: String },

    #[error("source not found: {path}")]
    SourceNotFound { path: String },

    #[error("permission denied: {operation} - {message}")]
    PermissionDenied { operation: String, message: String },

    /// The process could not be started, or the OS reported an error while it ran.
    /// `message` carries the last stderr text observed, or the OS error when none was.
    #[error("process execution failed: {command} - {message}")]
    ProcessExecutionFailed { command: String, message: String },

    #[error("command not found: {command}")]
    CommandNotFound { command: String },
}

impl PlatformError {
    /// Classify an I/O error raised by a filesystem operation.
    #[must_use]
    pub fn from_io(operation: &str, err: &std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied {
                operation: operation.to_string(),
                message: err.to_string(),
            },
            _ => Self::FilesystemOperationFailed {
                operation: operation.to_string(),
                message: err.to_string(),
            },
        }
    }
}

impl UserFacingError for PlatformError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::PermissionDenied { .. } => {
                Some("Adjust filesystem permissions or retry with elevated privileges.")
            }
            Self::CommandNotFound { .. } => Some("Make sure the command is installed and on PATH."),
            _ => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::FilesystemOperationFailed { .. } => "platform.filesystem",
            Self::SourceNotFound { .. } => "platform.source_not_found",
            Self::PermissionDenied { .. } => "platform.permission_denied",
            Self::ProcessExecutionFailed { .. } => "platform.process",
            Self::CommandNotFound { .. } => "platform.command_not_found",
        };
        Some(code)
    }
}
