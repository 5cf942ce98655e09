//! Process execution operations

use async_trait::async_trait;
use devboot_errors::PlatformError;
use std::fmt;
use std::path::PathBuf;
use std::process::ExitStatus;

use crate::core::PlatformContext;

/// Platform-specific command builder
#[derive(Debug, Clone)]
pub struct PlatformCommand {
    program: String,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
}

impl PlatformCommand {
    /// Create a new platform command
    #[must_use]
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            args: Vec::new(),
            current_dir: None,
        }
    }

    /// Add an argument to the command
    #[must_use]
    pub fn arg<S: AsRef<str>>(mut self, arg: S) -> Self {
        self.args.push(arg.as_ref().to_string());
        self
    }

    /// Add multiple arguments to the command
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.args
            .extend(args.into_iter().map(|arg| arg.as_ref().to_string()));
        self
    }

    /// Set the working directory for the command
    #[must_use]
    pub fn current_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    #[must_use]
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    #[must_use]
    pub fn get_current_dir(&self) -> Option<&PathBuf> {
        self.current_dir.as_ref()
    }
}

impl fmt::Display for PlatformCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Which pipe a chunk was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

/// A piece of subprocess output, delivered as soon as it was read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputChunk {
    pub stream: OutputStream,
    pub text: String,
}

impl OutputChunk {
    #[must_use]
    pub fn new(stream: OutputStream, text: impl Into<String>) -> Self {
        Self {
            stream,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn stdout(text: impl Into<String>) -> Self {
        Self::new(OutputStream::Stdout, text)
    }

    #[must_use]
    pub fn stderr(text: impl Into<String>) -> Self {
        Self::new(OutputStream::Stderr, text)
    }
}

/// How a process terminated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessExit {
    /// Exit code, `None` when the process was killed by a signal
    pub code: Option<i32>,
}

impl ProcessExit {
    #[must_use]
    pub fn new(code: Option<i32>) -> Self {
        Self { code }
    }

    #[must_use]
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<ExitStatus> for ProcessExit {
    fn from(status: ExitStatus) -> Self {
        Self::new(status.code())
    }
}

/// Trait for process execution operations
#[async_trait]
pub trait ProcessOperations: Send + Sync {
    /// Find the path to an executable on the search path
    async fn which(&self, program: &str) -> Result<PathBuf, PlatformError>;

    /// Whether invoking `program` from a shell would resolve.
    ///
    /// Absence is a normal `false`; this never fails.
    async fn is_installed(&self, program: &str) -> bool {
        self.which(program).await.is_ok()
    }

    /// Run a command to completion, streaming its output to `on_output`.
    ///
    /// Chunks of one stream arrive in the order the process wrote them; the
    /// two streams are not ordered relative to each other. Resolves with the
    /// exit status whatever its value. Fails with
    /// `ProcessExecutionFailed` when the process cannot be started or the OS
    /// reports an error while reading from it.
    async fn run(
        &self,
        ctx: &PlatformContext,
        cmd: PlatformCommand,
        on_output: &(dyn Fn(OutputChunk) + Send + Sync),
    ) -> Result<ProcessExit, PlatformError>;

    /// Create a new command builder
    fn create_command(&self, program: &str) -> PlatformCommand {
        PlatformCommand::new(program)
    }
}
