//! In-memory platform fakes shared by the manager tests

#![allow(dead_code)]

use async_trait::async_trait;
use devboot_errors::PlatformError;
use devboot_events::{AppEvent, EventReceiver, LogEvent};
use devboot_platform::{
    FilesystemOperations, LocalAppProbe, OutputChunk, Platform, PlatformCommand, PlatformContext,
    ProcessExit, ProcessOperations,
};
use devboot_types::{
    AppType, BaseApp, LocalAppInfo, Os, PackagesData, VersionStatus,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const APPLICATIONS: &str = "/Applications";
pub const COMMAND_DIR: &str = "/usr/local/bin";

/// Everything the fakes observed
#[derive(Default)]
pub struct World {
    pub command_present: AtomicBool,
    pub probes: AtomicUsize,
    pub app_probes: AtomicUsize,
    pub runs: Mutex<Vec<String>>,
    pub links: Mutex<Vec<(PathBuf, String)>>,
    pub removed: Mutex<Vec<PathBuf>>,
}

impl World {
    pub fn runs(&self) -> Vec<String> {
        self.runs.lock().unwrap().clone()
    }

    pub fn links(&self) -> Vec<(PathBuf, String)> {
        self.links.lock().unwrap().clone()
    }

    pub fn probes(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    pub fn app_probes(&self) -> usize {
        self.app_probes.load(Ordering::SeqCst)
    }
}

pub struct FakeProcess {
    world: Arc<World>,
    output: Vec<OutputChunk>,
    exit: Option<i32>,
    spawn_error: Option<String>,
}

#[async_trait]
impl ProcessOperations for FakeProcess {
    async fn which(&self, program: &str) -> Result<PathBuf, PlatformError> {
        self.world.probes.fetch_add(1, Ordering::SeqCst);
        if self.world.command_present.load(Ordering::SeqCst) {
            Ok(Path::new(COMMAND_DIR).join(program))
        } else {
            Err(PlatformError::CommandNotFound {
                command: program.to_string(),
            })
        }
    }

    async fn run(
        &self,
        _ctx: &PlatformContext,
        cmd: PlatformCommand,
        on_output: &(dyn Fn(OutputChunk) + Send + Sync),
    ) -> Result<ProcessExit, PlatformError> {
        self.world.runs.lock().unwrap().push(cmd.to_string());
        if let Some(message) = &self.spawn_error {
            return Err(PlatformError::ProcessExecutionFailed {
                command: cmd.program().to_string(),
                message: message.clone(),
            });
        }
        for chunk in &self.output {
            on_output(chunk.clone());
        }
        Ok(ProcessExit::new(self.exit))
    }
}

pub struct FakeFilesystem {
    world: Arc<World>,
    link_error: Option<PlatformError>,
    link_makes_command_available: bool,
}

#[async_trait]
impl FilesystemOperations for FakeFilesystem {
    async fn install_to_path(
        &self,
        _ctx: &PlatformContext,
        source: &Path,
        command_name: &str,
    ) -> Result<PathBuf, PlatformError> {
        self.world
            .links
            .lock()
            .unwrap()
            .push((source.to_path_buf(), command_name.to_string()));
        if let Some(err) = &self.link_error {
            return Err(err.clone());
        }
        if self.link_makes_command_available {
            self.world.command_present.store(true, Ordering::SeqCst);
        }
        Ok(Path::new(COMMAND_DIR).join(command_name))
    }

    async fn exists(&self, path: &Path) -> bool {
        !self.world.removed.lock().unwrap().iter().any(|p| p == path)
    }

    async fn remove_dir_all(&self, _ctx: &PlatformContext, path: &Path) -> Result<(), PlatformError> {
        self.world.removed.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }
}

pub struct FakeProbe {
    world: Arc<World>,
    installed: bool,
}

#[async_trait]
impl LocalAppProbe for FakeProbe {
    async fn local_info(&self, app: &BaseApp) -> Result<LocalAppInfo, PlatformError> {
        self.world.app_probes.fetch_add(1, Ordering::SeqCst);
        let status = if self.installed {
            VersionStatus::Installed
        } else {
            VersionStatus::Uninstalled
        };
        Ok(LocalAppInfo::new(
            Path::new(APPLICATIONS).join(app.bundle_name()),
            status,
        ))
    }
}

/// Knobs for building a fake platform
pub struct FakePlatform {
    pub command_present: bool,
    pub app_installed: bool,
    pub output: Vec<OutputChunk>,
    pub exit: Option<i32>,
    pub spawn_error: Option<String>,
    pub link_error: Option<PlatformError>,
    pub link_makes_command_available: bool,
}

impl Default for FakePlatform {
    fn default() -> Self {
        Self {
            command_present: true,
            app_installed: true,
            output: Vec::new(),
            exit: Some(0),
            spawn_error: None,
            link_error: None,
            link_makes_command_available: true,
        }
    }
}

impl FakePlatform {
    pub fn build(self) -> (Arc<Platform>, Arc<World>) {
        let world = Arc::new(World::default());
        world
            .command_present
            .store(self.command_present, Ordering::SeqCst);

        let platform = Platform::new(
            Box::new(FakeProcess {
                world: world.clone(),
                output: self.output,
                exit: self.exit,
                spawn_error: self.spawn_error,
            }),
            Box::new(FakeFilesystem {
                world: world.clone(),
                link_error: self.link_error,
                link_makes_command_available: self.link_makes_command_available,
            }),
            Box::new(FakeProbe {
                world: world.clone(),
                installed: self.app_installed,
            }),
        );
        (Arc::new(platform), world)
    }
}

pub fn vscode_base(app_type: AppType) -> BaseApp {
    BaseApp {
        name: "VSCode".to_string(),
        app_type,
        platforms: vec![Os::Darwin],
        bundle: Some("Visual Studio Code.app".to_string()),
    }
}

pub fn vscode_catalog() -> Arc<PackagesData> {
    Arc::new(PackagesData::new(vec![vscode_base(AppType::Dmg)]))
}

/// Every event sent so far
pub fn drain(rx: &mut EventReceiver) -> Vec<AppEvent> {
    let mut events = Vec::new();
    while let Ok(message) = rx.try_recv() {
        events.push(message.event);
    }
    events
}

pub fn log_events(events: &[AppEvent]) -> Vec<LogEvent> {
    events
        .iter()
        .filter_map(|event| match event {
            AppEvent::Log(log) => Some(log.clone()),
            _ => None,
        })
        .collect()
}
