//! Process operations backed by `tokio::process`
//!
//! Commands are resolved with the `which` crate, so lookup follows the same
//! rules a shell would (including `PATHEXT` on Windows) without spawning one.

use async_trait::async_trait;
use devboot_errors::PlatformError;
use devboot_events::{
    AppEvent, FailureContext, PlatformEvent, PlatformOperationContext, PlatformOperationKind,
    PlatformOperationMetrics, ProcessCommandDescriptor,
};
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::sync::mpsc;

use super::duration_to_millis;
use crate::core::PlatformContext;
use crate::process::{OutputChunk, OutputStream, PlatformCommand, ProcessExit, ProcessOperations};

const READ_BUFFER_SIZE: usize = 8 * 1024;

/// System implementation of process operations
#[derive(Debug, Clone, Default)]
pub struct SystemProcessOperations {
    search_path: Option<OsString>,
}

impl SystemProcessOperations {
    #[must_use]
    pub fn new() -> Self {
        Self { search_path: None }
    }

    /// Resolve commands against `search_path` instead of the `PATH` variable.
    #[must_use]
    pub fn with_search_path(search_path: impl Into<OsString>) -> Self {
        Self {
            search_path: Some(search_path.into()),
        }
    }
}

#[derive(Debug, Default)]
struct StreamStats {
    stdout_bytes: u64,
    stderr_bytes: u64,
}

fn process_context(descriptor: ProcessCommandDescriptor) -> PlatformOperationContext {
    PlatformOperationContext {
        kind: PlatformOperationKind::Process,
        operation: "run".to_string(),
        target: None,
        source: None,
        command: Some(descriptor),
    }
}

fn process_metrics(
    duration: Duration,
    exit: Option<ProcessExit>,
    stats: &StreamStats,
) -> PlatformOperationMetrics {
    PlatformOperationMetrics {
        duration_ms: Some(duration_to_millis(duration)),
        exit_code: exit.and_then(|e| e.code),
        stdout_bytes: Some(stats.stdout_bytes),
        stderr_bytes: Some(stats.stderr_bytes),
        changes: None,
    }
}

fn process_failure(program: &str, last_stderr: &str, err: &io::Error) -> PlatformError {
    let last_stderr = last_stderr.trim();
    let message = if last_stderr.is_empty() {
        err.to_string()
    } else {
        last_stderr.to_string()
    };
    PlatformError::ProcessExecutionFailed {
        command: program.to_string(),
        message,
    }
}

/// Length of a UTF-8 sequence cut off at the end of `bytes`.
fn incomplete_suffix_len(bytes: &[u8]) -> usize {
    for back in 1..=bytes.len().min(3) {
        let byte = bytes[bytes.len() - back];
        if byte & 0xC0 == 0x80 {
            continue;
        }
        let width = match byte {
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => 1,
        };
        return if width > back { back } else { 0 };
    }
    0
}

/// Decode `bytes` behind whatever the previous read left in `pending`.
///
/// A character split across reads is held back until its remaining bytes
/// arrive; invalid sequences still decode lossily.
fn decode_chunk(pending: &mut Vec<u8>, bytes: &[u8]) -> String {
    pending.extend_from_slice(bytes);
    let complete = pending.len() - incomplete_suffix_len(pending);
    let rest = pending.split_off(complete);
    let text = String::from_utf8_lossy(pending).into_owned();
    *pending = rest;
    text
}

/// Copy everything readable from `reader` into the channel, chunk by chunk.
async fn pump<R>(
    mut reader: R,
    stream: OutputStream,
    tx: mpsc::UnboundedSender<io::Result<OutputChunk>>,
) where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; READ_BUFFER_SIZE];
    let mut pending = Vec::new();
    loop {
        match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                let text = decode_chunk(&mut pending, &buf[..n]);
                if text.is_empty() {
                    continue;
                }
                if tx.send(Ok(OutputChunk::new(stream, text))).is_err() {
                    return;
                }
            }
            Err(e) => {
                let _ = tx.send(Err(e));
                return;
            }
        }
    }
    if !pending.is_empty() {
        let text = String::from_utf8_lossy(&pending).into_owned();
        let _ = tx.send(Ok(OutputChunk::new(stream, text)));
    }
}

async fn run_streaming(
    cmd: &PlatformCommand,
    on_output: &(dyn Fn(OutputChunk) + Send + Sync),
    stats: &mut StreamStats,
) -> Result<ProcessExit, PlatformError> {
    let mut command = Command::new(cmd.program());
    command
        .args(cmd.get_args())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    if let Some(dir) = cmd.get_current_dir() {
        command.current_dir(dir);
    }

    let mut child = command
        .spawn()
        .map_err(|e| process_failure(cmd.program(), "", &e))?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    if let Some(stdout) = child.stdout.take() {
        tokio::spawn(pump(stdout, OutputStream::Stdout, tx.clone()));
    }
    if let Some(stderr) = child.stderr.take() {
        tokio::spawn(pump(stderr, OutputStream::Stderr, tx.clone()));
    }
    drop(tx);

    let mut last_stderr = String::new();
    let mut read_error = None;
    while let Some(item) = rx.recv().await {
        match item {
            Ok(chunk) => {
                let len = u64::try_from(chunk.text.len()).unwrap_or(u64::MAX);
                match chunk.stream {
                    OutputStream::Stdout => stats.stdout_bytes += len,
                    OutputStream::Stderr => {
                        stats.stderr_bytes += len;
                        last_stderr.clone_from(&chunk.text);
                    }
                }
                on_output(chunk);
            }
            Err(e) => {
                read_error.get_or_insert(e);
            }
        }
    }

    let status = child
        .wait()
        .await
        .map_err(|e| process_failure(cmd.program(), &last_stderr, &e))?;

    if let Some(e) = read_error {
        return Err(process_failure(cmd.program(), &last_stderr, &e));
    }

    Ok(ProcessExit::from(status))
}

#[async_trait]
impl ProcessOperations for SystemProcessOperations {
    async fn which(&self, program: &str) -> Result<PathBuf, PlatformError> {
        let lookup = program.to_string();
        let search_path = self.search_path.clone();

        let resolved = tokio::task::spawn_blocking(move || match search_path {
            Some(paths) => which::which_in(&lookup, Some(paths), Path::new(".")),
            None => which::which(&lookup),
        })
        .await
        .map_err(|e| PlatformError::ProcessExecutionFailed {
            command: "which".to_string(),
            message: e.to_string(),
        })?;

        resolved.map_err(|_| PlatformError::CommandNotFound {
            command: program.to_string(),
        })
    }

    async fn run(
        &self,
        ctx: &PlatformContext,
        cmd: PlatformCommand,
        on_output: &(dyn Fn(OutputChunk) + Send + Sync),
    ) -> Result<ProcessExit, PlatformError> {
        let start = Instant::now();
        let descriptor = ProcessCommandDescriptor {
            program: cmd.program().to_string(),
            args: cmd.get_args().to_vec(),
            cwd: cmd.get_current_dir().cloned(),
        };

        ctx.emit_event(AppEvent::Platform(PlatformEvent::OperationStarted {
            context: process_context(descriptor.clone()),
        }));
        tracing::debug!(command = %cmd, "spawning process");

        let mut stats = StreamStats::default();
        let result = run_streaming(&cmd, on_output, &mut stats).await;
        let duration = start.elapsed();

        match &result {
            Ok(exit) => {
                ctx.emit_event(AppEvent::Platform(PlatformEvent::OperationCompleted {
                    context: process_context(descriptor),
                    metrics: Some(process_metrics(duration, Some(*exit), &stats)),
                }));
            }
            Err(e) => {
                ctx.emit_event(AppEvent::Platform(PlatformEvent::OperationFailed {
                    context: process_context(descriptor),
                    failure: FailureContext::from_error(e),
                    metrics: Some(process_metrics(duration, None, &stats)),
                }));
            }
        }

        result
    }
}
