//! Installation layer error types

use std::borrow::Cow;

use crate::{PlatformError, UserFacingError};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum InstallError {
    /// No catalog entry exists for the app on the current platform.
    #[error("{app} info was not found.")]
    AppInfoNotFound { app: String },

    #[error("the install mechanism `{mechanism}` of {app} is not supported")]
    UnsupportedMechanism { app: String, mechanism: String },

    #[error("{app} was not installed.")]
    PrerequisiteMissing { app: String },

    #[error("failed to install `{command}` command to path: {message}")]
    CommandLinkFailed { command: String, message: String },

    #[error("command `{command}` is still unavailable after installing it to path")]
    CommandUnavailable { command: String },

    #[error("failed to run `{command}`: {message}")]
    SpawnFailed { command: String, message: String },

    #[error("`{command}` exited with code {code:?}")]
    NonZeroExit { command: String, code: Option<i32> },

    #[error("unsupported extension type: {ide_type}")]
    UnsupportedExtensionType { ide_type: String },

    #[error("package {package} is missing option `{key}`")]
    MissingOption { package: String, key: String },
}

impl InstallError {
    /// Wrap a platform failure raised while linking a command shim.
    #[must_use]
    pub fn command_link(command: impl Into<String>, err: &PlatformError) -> Self {
        Self::CommandLinkFailed {
            command: command.into(),
            message: err.to_string(),
        }
    }
}

impl UserFacingError for InstallError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::AppInfoNotFound { .. } => {
                Some("Add the application to the catalog for this platform.")
            }
            Self::PrerequisiteMissing { .. } => {
                Some("Install the application first, then retry the extension operation.")
            }
            Self::CommandLinkFailed { .. } => {
                Some("Ensure the command directory is writable or retry with elevated privileges.")
            }
            Self::UnsupportedExtensionType { .. } => {
                Some("Use a supported IDE type or set `unknown_ide_type = \"skip\"`.")
            }
            Self::MissingOption { .. } => Some("Pass the missing option with the package."),
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::SpawnFailed { .. } | Self::NonZeroExit { .. } | Self::CommandLinkFailed { .. }
        )
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::AppInfoNotFound { .. } => "install.configuration",
            Self::UnsupportedMechanism { .. } => "install.unsupported_mechanism",
            Self::PrerequisiteMissing { .. } => "install.prerequisite_missing",
            Self::CommandLinkFailed { .. } => "install.io",
            Self::CommandUnavailable { .. } => "install.command_unavailable",
            Self::SpawnFailed { .. } => "install.spawn",
            Self::NonZeroExit { .. } => "install.exit_status",
            Self::UnsupportedExtensionType { .. } => "install.unsupported_extension_type",
            Self::MissingOption { .. } => "install.missing_option",
        };
        Some(code)
    }
}
