//! Filesystem operations

use async_trait::async_trait;
use devboot_errors::PlatformError;
use std::path::{Path, PathBuf};

use crate::core::PlatformContext;

/// Trait for filesystem operations
#[async_trait]
pub trait FilesystemOperations: Send + Sync {
    /// Make `command_name` resolve to `source` from the command directory.
    ///
    /// The command directory must already exist and be on PATH; it is never
    /// created here. Calling twice with the same arguments leaves the same end
    /// state. Returns the path of the installed entry.
    async fn install_to_path(
        &self,
        ctx: &PlatformContext,
        source: &Path,
        command_name: &str,
    ) -> Result<PathBuf, PlatformError>;

    /// Check if a path exists
    async fn exists(&self, path: &Path) -> bool;

    /// Remove a directory and all its contents
    async fn remove_dir_all(&self, ctx: &PlatformContext, path: &Path)
        -> Result<(), PlatformError>;
}
