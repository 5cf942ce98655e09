//! Filesystem operations backed by `tokio::fs`

use async_trait::async_trait;
use devboot_errors::PlatformError;
use devboot_events::{
    AppEvent, FailureContext, PlatformEvent, PlatformOperationContext, PlatformOperationKind,
    PlatformOperationMetrics,
};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::fs;

use super::duration_to_millis;
use crate::core::PlatformContext;
use crate::filesystem::FilesystemOperations;

/// System implementation of filesystem operations
#[derive(Debug, Clone)]
pub struct SystemFilesystemOperations {
    command_dir: PathBuf,
}

impl SystemFilesystemOperations {
    /// `command_dir` must be a directory the OS already puts on PATH.
    #[must_use]
    pub fn new(command_dir: PathBuf) -> Self {
        Self { command_dir }
    }

    #[must_use]
    pub fn command_dir(&self) -> &Path {
        &self.command_dir
    }

    async fn link_command(&self, source: &Path, command_name: &str) -> Result<PathBuf, PlatformError> {
        const OPERATION: &str = "install_to_path";

        if fs::metadata(source).await.is_err() {
            return Err(PlatformError::SourceNotFound {
                path: source.display().to_string(),
            });
        }

        match fs::metadata(&self.command_dir).await {
            Ok(metadata) if metadata.is_dir() => {}
            Ok(_) => {
                return Err(PlatformError::FilesystemOperationFailed {
                    operation: OPERATION.to_string(),
                    message: format!("{} is not a directory", self.command_dir.display()),
                })
            }
            Err(e) => return Err(PlatformError::from_io(OPERATION, &e)),
        }

        let target = self.command_dir.join(command_name);

        if links_to(&target, source).await {
            tracing::debug!(target = %target.display(), "command already linked");
            return Ok(target);
        }

        replace_entry(source, &target, command_name)
            .await
            .map_err(|e| PlatformError::from_io(OPERATION, &e))?;

        Ok(target)
    }
}

/// Swap `target` for a fresh entry pointing at `source` without leaving a
/// window where the command is missing.
///
/// Concurrent calls for the same command stage under distinct names, and a
/// call that loses the race still succeeds once `target` points at `source`.
#[cfg(unix)]
async fn replace_entry(source: &Path, target: &Path, command_name: &str) -> std::io::Result<()> {
    let temp = target.with_file_name(format!(
        ".{command_name}.{}.devboot-tmp",
        uuid::Uuid::new_v4().simple()
    ));
    let staged = match fs::symlink(source, &temp).await {
        Ok(()) => fs::rename(&temp, target).await,
        Err(e) => Err(e),
    };
    match staged {
        Ok(()) => Ok(()),
        Err(e) => {
            let _ = fs::remove_file(&temp).await;
            if links_to(target, source).await {
                return Ok(());
            }
            Err(e)
        }
    }
}

#[cfg(not(unix))]
async fn replace_entry(source: &Path, target: &Path, _command_name: &str) -> std::io::Result<()> {
    fs::copy(source, target).await.map(|_| ())
}

async fn links_to(target: &Path, source: &Path) -> bool {
    fs::read_link(target)
        .await
        .is_ok_and(|existing| existing == source)
}

fn filesystem_context(
    operation: &str,
    source: Option<&Path>,
    target: &Path,
) -> PlatformOperationContext {
    PlatformOperationContext {
        kind: PlatformOperationKind::Filesystem,
        operation: operation.to_string(),
        target: Some(target.to_path_buf()),
        source: source.map(Path::to_path_buf),
        command: None,
    }
}

fn filesystem_metrics(duration: Duration, changes: Option<Vec<String>>) -> PlatformOperationMetrics {
    PlatformOperationMetrics {
        duration_ms: Some(duration_to_millis(duration)),
        changes,
        ..PlatformOperationMetrics::default()
    }
}

fn emit_fs_result<T>(
    ctx: &PlatformContext,
    operation: &str,
    source: Option<&Path>,
    target: &Path,
    result: &Result<T, PlatformError>,
    duration: Duration,
) {
    let context = filesystem_context(operation, source, target);
    let event = match result {
        Ok(_) => PlatformEvent::OperationCompleted {
            context,
            metrics: Some(filesystem_metrics(
                duration,
                Some(vec![target.display().to_string()]),
            )),
        },
        Err(e) => PlatformEvent::OperationFailed {
            context,
            failure: FailureContext::from_error(e),
            metrics: Some(filesystem_metrics(duration, None)),
        },
    };
    ctx.emit_event(AppEvent::Platform(event));
}

#[async_trait]
impl FilesystemOperations for SystemFilesystemOperations {
    async fn install_to_path(
        &self,
        ctx: &PlatformContext,
        source: &Path,
        command_name: &str,
    ) -> Result<PathBuf, PlatformError> {
        let start = Instant::now();
        let target = self.command_dir.join(command_name);
        ctx.emit_event(AppEvent::Platform(PlatformEvent::OperationStarted {
            context: filesystem_context("install_to_path", Some(source), &target),
        }));

        let result = self.link_command(source, command_name).await;
        emit_fs_result(
            ctx,
            "install_to_path",
            Some(source),
            &target,
            &result,
            start.elapsed(),
        );
        result
    }

    async fn exists(&self, path: &Path) -> bool {
        fs::try_exists(path).await.unwrap_or(false)
    }

    async fn remove_dir_all(&self, ctx: &PlatformContext, path: &Path) -> Result<(), PlatformError> {
        let start = Instant::now();
        ctx.emit_event(AppEvent::Platform(PlatformEvent::OperationStarted {
            context: filesystem_context("remove_dir_all", None, path),
        }));

        let result = fs::remove_dir_all(path)
            .await
            .map_err(|e| PlatformError::from_io("remove_dir_all", &e));
        emit_fs_result(ctx, "remove_dir_all", None, path, &result, start.elapsed());
        result
    }
}
