//! System setup: catalog, platform and package managers

use crate::error::CliError;
use devboot_config::{Catalog, Config};
use devboot_events::EventSender;
use devboot_packages::{AppManager, ExtensionManager, ExtensionSettings, PackageManagers};
use devboot_platform::{Platform, PlatformSettings};
use devboot_types::PackageFamily;
use std::sync::Arc;
use tracing::debug;

/// Log channel of the extension manager
pub const EXTENSIONS_CHANNEL: &str = "vscode-extensions";
/// Log channel of the app manager
pub const APPS_CHANNEL: &str = "base-apps";

/// Everything a command needs, built once per run
pub struct SystemSetup {
    config: Config,
    platform: Arc<Platform>,
    managers: PackageManagers,
}

impl SystemSetup {
    /// Load the catalog and wire the managers to the system platform
    pub async fn initialize(config: Config, event_sender: &EventSender) -> Result<Self, CliError> {
        let catalog = Catalog::load_or_empty(config.paths.catalog.as_deref()).await?;
        debug!(bases = catalog.packages.bases.len(), "catalog loaded");

        let platform = Arc::new(Platform::system(&PlatformSettings {
            command_dir: config.command_dir(),
            applications_dir: config.applications_dir(),
        }));
        let packages = Arc::new(catalog.packages);

        let settings = ExtensionSettings::default()
            .with_unknown_ide_type(config.extensions.unknown_ide_type)
            .with_exit_code_policy(config.extensions.exit_code_policy)
            .with_reverify_after_heal(config.extensions.reverify_after_heal);
        let extensions = ExtensionManager::new(
            EXTENSIONS_CHANNEL,
            packages.clone(),
            Arc::new(catalog.install_commands),
            platform.clone(),
            Some(event_sender.clone()),
        )
        .with_settings(settings);
        let apps = AppManager::new(
            APPS_CHANNEL,
            packages,
            platform.clone(),
            Some(event_sender.clone()),
        )
        .with_exit_code_policy(config.extensions.exit_code_policy);

        let managers = PackageManagers::new()
            .with(PackageFamily::Extension, Arc::new(extensions))
            .with(PackageFamily::App, Arc::new(apps));

        Ok(Self {
            config,
            platform,
            managers,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    pub fn managers(&self) -> &PackageManagers {
        &self.managers
    }
}
