//! Native app manager for disk-image distributed applications

use async_trait::async_trait;
use devboot_errors::{Error, InstallError};
use devboot_events::{EventEmitter, EventSender, LogSeverity, LogSink, PackageOperation};
use devboot_platform::{Platform, PlatformContext};
use devboot_types::{
    AppType, BaseApp, ExitCodePolicy, OperationResult, Os, PackageInfo, PackageOptions,
    PackagesData,
};
use std::path::Path;
use std::sync::Arc;

use crate::manager::PackageManager;
use crate::runner::{report_outcome, report_started, run_logged};

const MANAGER_NAME: &str = "app";

/// Package manager for base applications
pub struct AppManager {
    channel: String,
    packages: Arc<PackagesData>,
    platform: Arc<Platform>,
    tx: Option<EventSender>,
    exit_code_policy: ExitCodePolicy,
    os: Os,
}

impl std::fmt::Debug for AppManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppManager")
            .field("channel", &self.channel)
            .field("os", &self.os)
            .field("exit_code_policy", &self.exit_code_policy)
            .finish_non_exhaustive()
    }
}

impl EventEmitter for AppManager {
    fn event_sender(&self) -> Option<&EventSender> {
        self.tx.as_ref()
    }
}

impl AppManager {
    #[must_use]
    pub fn new(
        channel: impl Into<String>,
        packages: Arc<PackagesData>,
        platform: Arc<Platform>,
        tx: Option<EventSender>,
    ) -> Self {
        Self {
            channel: channel.into(),
            packages,
            platform,
            tx,
            exit_code_policy: ExitCodePolicy::default(),
            os: Os::current(),
        }
    }

    #[must_use]
    pub fn with_exit_code_policy(mut self, policy: ExitCodePolicy) -> Self {
        self.exit_code_policy = policy;
        self
    }

    #[must_use]
    pub fn with_os(mut self, os: Os) -> Self {
        self.os = os;
        self
    }

    fn find_base(&self, name: &str) -> Result<&BaseApp, InstallError> {
        let base = self
            .packages
            .find_base(name, self.os)
            .ok_or_else(|| InstallError::AppInfoNotFound {
                app: name.to_string(),
            })?;
        match &base.app_type {
            AppType::Dmg => Ok(base),
            AppType::Other(mechanism) => Err(InstallError::UnsupportedMechanism {
                app: base.name.clone(),
                mechanism: mechanism.clone(),
            }),
        }
    }

    async fn install_app(&self, package: &PackageInfo) -> Result<Option<i32>, Error> {
        let base = self.find_base(&package.name)?;
        let local = self.platform.apps().local_info(base).await?;
        if local.is_installed() {
            self.write(
                &self.channel,
                &format!("{} is already installed", base.name),
                true,
                LogSeverity::Info,
            );
            return Ok(None);
        }

        let source = package
            .options
            .get(PackageOptions::SOURCE)
            .ok_or_else(|| InstallError::MissingOption {
                package: package.name.clone(),
                key: PackageOptions::SOURCE.to_string(),
            })?;

        let mount = tempfile::Builder::new()
            .prefix("devboot-mount-")
            .tempdir()
            .map_err(|e| Error::io_with_path(&e, std::env::temp_dir()))?;
        let ctx = self.platform.create_context(self.tx.clone());

        self.attach(&ctx, Path::new(source), mount.path()).await?;
        let copied = self
            .copy_bundle(&ctx, &mount.path().join(base.bundle_name()), &local.path)
            .await;
        self.detach(&ctx, mount.path()).await;

        let code = copied?;
        if !self.exit_code_policy.accepts(code) {
            return Err(InstallError::NonZeroExit {
                command: "ditto".to_string(),
                code,
            }
            .into());
        }

        self.write(
            &self.channel,
            &format!("{} was installed", base.name),
            true,
            LogSeverity::Info,
        );
        Ok(code)
    }

    async fn attach(
        &self,
        ctx: &PlatformContext,
        image: &Path,
        mount: &Path,
    ) -> Result<(), InstallError> {
        let process = self.platform.process();
        let mount = mount.to_string_lossy().into_owned();
        let image = image.to_string_lossy().into_owned();
        let cmd = process.create_command("hdiutil").args([
            "attach",
            "-nobrowse",
            "-readonly",
            "-mountpoint",
            mount.as_str(),
            image.as_str(),
        ]);
        let exit = run_logged(process, ctx, self, &self.channel, cmd).await?;
        if exit.success() {
            Ok(())
        } else {
            Err(InstallError::NonZeroExit {
                command: "hdiutil attach".to_string(),
                code: exit.code,
            })
        }
    }

    async fn copy_bundle(
        &self,
        ctx: &PlatformContext,
        bundle: &Path,
        destination: &Path,
    ) -> Result<Option<i32>, InstallError> {
        let process = self.platform.process();
        let cmd = process
            .create_command("ditto")
            .arg(bundle.to_string_lossy())
            .arg(destination.to_string_lossy());
        let exit = run_logged(process, ctx, self, &self.channel, cmd).await?;
        Ok(exit.code)
    }

    /// Detach failures are logged and otherwise ignored.
    async fn detach(&self, ctx: &PlatformContext, mount: &Path) {
        let process = self.platform.process();
        let cmd = process
            .create_command("hdiutil")
            .arg("detach")
            .arg(mount.to_string_lossy());
        match run_logged(process, ctx, self, &self.channel, cmd).await {
            Ok(exit) if exit.success() => {}
            Ok(exit) => tracing::warn!(code = ?exit.code, mount = %mount.display(), "detach failed"),
            Err(e) => self.write(&self.channel, &e.to_string(), true, LogSeverity::Warn),
        }
    }

    async fn uninstall_app(&self, package: &PackageInfo) -> Result<Option<i32>, Error> {
        let base = self.find_base(&package.name)?;
        let local = self.platform.apps().local_info(base).await?;
        if !local.is_installed() {
            tracing::debug!(app = %base.name, "not installed, nothing to remove");
            return Ok(None);
        }

        let ctx = self.platform.create_context(self.tx.clone());
        self.platform
            .filesystem()
            .remove_dir_all(&ctx, &local.path)
            .await?;
        self.write(
            &self.channel,
            &format!("{} was removed", base.name),
            true,
            LogSeverity::Info,
        );
        Ok(None)
    }
}

#[async_trait]
impl PackageManager for AppManager {
    async fn install(&self, package: &PackageInfo) -> Result<OperationResult, Error> {
        report_started(self, MANAGER_NAME, &package.name, PackageOperation::Install);
        let outcome = self.install_app(package).await;
        report_outcome(
            self,
            MANAGER_NAME,
            &self.channel,
            &package.name,
            PackageOperation::Install,
            &outcome,
        );
        Ok(OperationResult::exited(&package.name, outcome?))
    }

    async fn uninstall(&self, package: &PackageInfo) -> Result<(), Error> {
        report_started(self, MANAGER_NAME, &package.name, PackageOperation::Uninstall);
        let outcome = self.uninstall_app(package).await;
        report_outcome(
            self,
            MANAGER_NAME,
            &self.channel,
            &package.name,
            PackageOperation::Uninstall,
            &outcome,
        );
        outcome.map(|_| ())
    }
}
