//! Core platform abstractions and context management

use devboot_events::{AppEvent, EventEmitter, EventSender};
use std::path::PathBuf;

use crate::apps::LocalAppProbe;
use crate::filesystem::FilesystemOperations;
use crate::implementations::system::{
    DiskImageProbe, SystemFilesystemOperations, SystemProcessOperations,
};
use crate::process::ProcessOperations;

/// Context for platform operations, providing event emission
#[derive(Debug, Clone, Default)]
pub struct PlatformContext {
    event_sender: Option<EventSender>,
}

impl PlatformContext {
    /// Create a new platform context with event emission capabilities
    #[must_use]
    pub fn new(event_sender: Option<EventSender>) -> Self {
        Self { event_sender }
    }

    /// Emit a platform event if event sender is available
    pub fn emit_event(&self, event: AppEvent) {
        self.emit(event);
    }
}

impl EventEmitter for PlatformContext {
    fn event_sender(&self) -> Option<&EventSender> {
        self.event_sender.as_ref()
    }
}

/// Where the system implementations act on disk
#[derive(Debug, Clone)]
pub struct PlatformSettings {
    /// Directory already on PATH that receives command shims
    pub command_dir: PathBuf,
    /// Directory app bundles are installed into
    pub applications_dir: PathBuf,
}

/// Main platform abstraction providing access to all platform operations
pub struct Platform {
    process_ops: Box<dyn ProcessOperations>,
    filesystem_ops: Box<dyn FilesystemOperations>,
    app_probe: Box<dyn LocalAppProbe>,
}

impl Platform {
    /// Create a new platform instance with the specified implementations
    #[must_use]
    pub fn new(
        process_ops: Box<dyn ProcessOperations>,
        filesystem_ops: Box<dyn FilesystemOperations>,
        app_probe: Box<dyn LocalAppProbe>,
    ) -> Self {
        Self {
            process_ops,
            filesystem_ops,
            app_probe,
        }
    }

    /// The implementations backed by the running operating system
    #[must_use]
    pub fn system(settings: &PlatformSettings) -> Self {
        Self::new(
            Box::new(SystemProcessOperations::new()),
            Box::new(SystemFilesystemOperations::new(settings.command_dir.clone())),
            Box::new(DiskImageProbe::new(settings.applications_dir.clone())),
        )
    }

    /// Access process operations
    #[must_use]
    pub fn process(&self) -> &dyn ProcessOperations {
        &*self.process_ops
    }

    /// Access filesystem operations
    #[must_use]
    pub fn filesystem(&self) -> &dyn FilesystemOperations {
        &*self.filesystem_ops
    }

    /// Access the local app probe
    #[must_use]
    pub fn apps(&self) -> &dyn LocalAppProbe {
        &*self.app_probe
    }

    /// Create a platform context with event emission
    #[must_use]
    pub fn create_context(&self, event_sender: Option<EventSender>) -> PlatformContext {
        PlatformContext::new(event_sender)
    }
}
