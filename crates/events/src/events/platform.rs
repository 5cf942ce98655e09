//! Platform-specific operation events

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::FailureContext;

/// Kind of platform operation being reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformOperationKind {
    Filesystem,
    Process,
}

/// Command descriptor attached to process operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessCommandDescriptor {
    pub program: String,
    pub args: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,
}

/// What a platform operation was doing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformOperationContext {
    pub kind: PlatformOperationKind,
    /// Operation name (e.g., `install_to_path`, `run`)
    pub operation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<ProcessCommandDescriptor>,
}

/// Measurements collected once an operation finishes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlatformOperationMetrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdout_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stderr_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changes: Option<Vec<String>>,
}

/// Platform operation events for tracking platform-specific operations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum PlatformEvent {
    OperationStarted {
        context: PlatformOperationContext,
    },

    OperationCompleted {
        context: PlatformOperationContext,
        #[serde(skip_serializing_if = "Option::is_none")]
        metrics: Option<PlatformOperationMetrics>,
    },

    OperationFailed {
        context: PlatformOperationContext,
        failure: FailureContext,
        #[serde(skip_serializing_if = "Option::is_none")]
        metrics: Option<PlatformOperationMetrics>,
    },
}
