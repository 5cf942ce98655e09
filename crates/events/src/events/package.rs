use serde::{Deserialize, Serialize};

use super::FailureContext;

/// Which direction a package operation goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageOperation {
    Install,
    Uninstall,
}

impl PackageOperation {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Install => "install",
            Self::Uninstall => "uninstall",
        }
    }
}

impl std::fmt::Display for PackageOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Package operation events surfaced by managers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PackageEvent {
    /// Manager is about to run the operation
    OperationStarted {
        manager: String,
        package: String,
        operation: PackageOperation,
    },

    /// Underlying command finished
    OperationCompleted {
        manager: String,
        package: String,
        operation: PackageOperation,
        exit_code: Option<i32>,
    },

    /// Operation rejected
    OperationFailed {
        manager: String,
        package: String,
        operation: PackageOperation,
        failure: FailureContext,
    },
}
