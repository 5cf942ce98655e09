//! IDE extension manager
//!
//! Each call resolves the package's `IDEType`, makes sure the IDE's CLI
//! command resolves on PATH (relinking the shim from the installed app when
//! it does not), then runs exactly one `--install-extension` or
//! `--uninstall-extension` subprocess.

mod heal;
mod ide;

pub use ide::IdeType;

use async_trait::async_trait;
use devboot_errors::{Error, InstallError};
use devboot_events::{EventEmitter, EventSender, PackageOperation};
use devboot_platform::Platform;
use devboot_types::{
    ExitCodePolicy, InstallCommandTable, OperationResult, Os, PackageInfo, PackagesData,
    UnknownIdePolicy,
};
use std::sync::Arc;

use crate::manager::PackageManager;
use crate::runner::{report_outcome, report_started, run_logged};

const MANAGER_NAME: &str = "extension";

/// Extension manager configuration
#[derive(Clone, Copy, Debug, Default)]
pub struct ExtensionSettings {
    pub unknown_ide_type: UnknownIdePolicy,
    pub exit_code_policy: ExitCodePolicy,
    /// Probe the command again after relinking it
    pub reverify_after_heal: bool,
}

impl ExtensionSettings {
    #[must_use]
    pub fn with_unknown_ide_type(mut self, policy: UnknownIdePolicy) -> Self {
        self.unknown_ide_type = policy;
        self
    }

    #[must_use]
    pub fn with_exit_code_policy(mut self, policy: ExitCodePolicy) -> Self {
        self.exit_code_policy = policy;
        self
    }

    #[must_use]
    pub fn with_reverify_after_heal(mut self, enable: bool) -> Self {
        self.reverify_after_heal = enable;
        self
    }
}

/// Package manager for IDE extensions
pub struct ExtensionManager {
    channel: String,
    packages: Arc<PackagesData>,
    install_commands: Arc<InstallCommandTable>,
    platform: Arc<Platform>,
    tx: Option<EventSender>,
    settings: ExtensionSettings,
    os: Os,
}

impl std::fmt::Debug for ExtensionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionManager")
            .field("channel", &self.channel)
            .field("settings", &self.settings)
            .field("os", &self.os)
            .finish_non_exhaustive()
    }
}

impl EventEmitter for ExtensionManager {
    fn event_sender(&self) -> Option<&EventSender> {
        self.tx.as_ref()
    }
}

impl ExtensionManager {
    /// Create a manager logging to `channel`
    #[must_use]
    pub fn new(
        channel: impl Into<String>,
        packages: Arc<PackagesData>,
        install_commands: Arc<InstallCommandTable>,
        platform: Arc<Platform>,
        tx: Option<EventSender>,
    ) -> Self {
        Self {
            channel: channel.into(),
            packages,
            install_commands,
            platform,
            tx,
            settings: ExtensionSettings::default(),
            os: Os::current(),
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: ExtensionSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Filter the catalog for `os` instead of the running system
    #[must_use]
    pub fn with_os(mut self, os: Os) -> Self {
        self.os = os;
        self
    }

    #[must_use]
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Resolve the processor for a package, `None` meaning skip.
    fn resolve_ide(&self, package: &PackageInfo) -> Result<Option<IdeType>, InstallError> {
        let tag = package.options.ide_type().unwrap_or_default();
        match tag.parse::<IdeType>() {
            Ok(ide) => Ok(Some(ide)),
            Err(_) => match self.settings.unknown_ide_type {
                UnknownIdePolicy::Skip => {
                    tracing::debug!(
                        package = %package.name,
                        ide_type = tag,
                        "no extension processor registered, skipping"
                    );
                    Ok(None)
                }
                UnknownIdePolicy::Reject => Err(InstallError::UnsupportedExtensionType {
                    ide_type: tag.to_string(),
                }),
            },
        }
    }

    async fn process(
        &self,
        ide: IdeType,
        package: &PackageInfo,
        operation: PackageOperation,
    ) -> Result<Option<i32>, InstallError> {
        report_started(self, MANAGER_NAME, &package.name, operation);

        let outcome = self.run_operation(ide, package, operation).await;
        report_outcome(
            self,
            MANAGER_NAME,
            &self.channel,
            &package.name,
            operation,
            &outcome,
        );
        outcome
    }

    async fn run_operation(
        &self,
        ide: IdeType,
        package: &PackageInfo,
        operation: PackageOperation,
    ) -> Result<Option<i32>, InstallError> {
        let ctx = self.platform.create_context(self.tx.clone());
        self.ensure_command_installed(ide, &ctx).await?;

        let args = match operation {
            PackageOperation::Install => ide.install_args(&package.name),
            PackageOperation::Uninstall => ide.uninstall_args(&package.name),
        };
        let process = self.platform.process();
        let cmd = process.create_command(ide.command()).args(args);

        let exit = run_logged(process, &ctx, self, &self.channel, cmd).await?;
        if !self.settings.exit_code_policy.accepts(exit.code) {
            return Err(InstallError::NonZeroExit {
                command: ide.command().to_string(),
                code: exit.code,
            });
        }
        Ok(exit.code)
    }
}

#[async_trait]
impl PackageManager for ExtensionManager {
    async fn install(&self, package: &PackageInfo) -> Result<OperationResult, Error> {
        let Some(ide) = self.resolve_ide(package)? else {
            return Ok(OperationResult::skipped(&package.name));
        };
        let exit_code = self
            .process(ide, package, PackageOperation::Install)
            .await?;
        Ok(OperationResult::exited(&package.name, exit_code))
    }

    async fn uninstall(&self, package: &PackageInfo) -> Result<(), Error> {
        let Some(ide) = self.resolve_ide(package)? else {
            return Ok(());
        };
        self.process(ide, package, PackageOperation::Uninstall)
            .await?;
        Ok(())
    }
}
