//! Relinking a missing IDE command shim

use devboot_errors::InstallError;
use devboot_events::{LogSeverity, LogSink};
use devboot_platform::PlatformContext;
use devboot_types::{AppType, BaseApp, LocalAppInfo};

use super::{ExtensionManager, IdeType};

impl ExtensionManager {
    /// Make sure `ide`'s CLI command resolves on PATH.
    ///
    /// Runs on every call. When the command is missing, the shim inside the
    /// installed app bundle is linked into the command directory; the app
    /// itself is never installed from here.
    pub(super) async fn ensure_command_installed(
        &self,
        ide: IdeType,
        ctx: &PlatformContext,
    ) -> Result<(), InstallError> {
        let command = ide.command();
        let process = self.platform.process();
        if process.is_installed(command).await {
            return Ok(());
        }

        tracing::warn!(command, "command not found on PATH, installing it");
        self.write(
            &self.channel,
            &format!("`{command}` command was not found, installing it to path"),
            true,
            LogSeverity::Warn,
        );

        let app_name = ide.app_name();
        let base = self
            .packages
            .find_base(app_name, self.os)
            .ok_or_else(|| InstallError::AppInfoNotFound {
                app: app_name.to_string(),
            })?;

        let local = self.local_info(base, command).await?;
        if !local.is_installed() {
            return Err(InstallError::PrerequisiteMissing {
                app: app_name.to_string(),
            });
        }

        match self.install_commands.find(app_name) {
            Some(entry) => {
                let source = local.path.join(&entry.command_relative_path);
                self.platform
                    .filesystem()
                    .install_to_path(ctx, &source, command)
                    .await
                    .map_err(|e| InstallError::command_link(command, &e))?;

                self.write(
                    &self.channel,
                    &format!("`{command}` command was installed to path"),
                    true,
                    LogSeverity::Info,
                );
            }
            None => {
                // Nothing to link; the command is run as is
                tracing::warn!(app = app_name, command, "no command shim registered");
                self.write(
                    &self.channel,
                    &format!("no `{command}` shim is registered for {app_name}, not linking it"),
                    true,
                    LogSeverity::Warn,
                );
            }
        }

        if self.settings.reverify_after_heal && !process.is_installed(command).await {
            return Err(InstallError::CommandUnavailable {
                command: command.to_string(),
            });
        }

        Ok(())
    }

    async fn local_info(&self, base: &BaseApp, command: &str) -> Result<LocalAppInfo, InstallError> {
        match &base.app_type {
            AppType::Dmg => self
                .platform
                .apps()
                .local_info(base)
                .await
                .map_err(|e| InstallError::command_link(command, &e)),
            AppType::Other(mechanism) => Err(InstallError::UnsupportedMechanism {
                app: base.name.clone(),
                mechanism: mechanism.clone(),
            }),
        }
    }
}
