#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for devboot
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/devboot/config.toml)
//! - Environment variables
//! - CLI flags (applied by the binary)
//!
//! It also loads the packages catalog the managers are constructed with.

pub mod catalog;
pub mod constants;

pub use catalog::Catalog;

use devboot_errors::{ConfigError, Error};
use devboot_types::{ColorChoice, ExitCodePolicy, UnknownIdePolicy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub paths: PathConfig,

    #[serde(default)]
    pub extensions: ExtensionConfig,
}

/// General configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GeneralConfig {
    #[serde(default)]
    pub color: ColorChoice,
    pub log_dir: Option<PathBuf>,
}

/// Path configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PathConfig {
    /// Directory already on PATH that receives command shims
    pub command_dir: Option<PathBuf>,
    pub applications_dir: Option<PathBuf>,
    /// Packages catalog (JSON)
    pub catalog: Option<PathBuf>,
}

/// Extension manager behaviour
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ExtensionConfig {
    #[serde(default)]
    pub unknown_ide_type: UnknownIdePolicy,
    #[serde(default)]
    pub exit_code_policy: ExitCodePolicy,
    /// Probe the command again after installing it to path
    #[serde(default)]
    pub reverify_after_heal: bool,
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir.join(constants::CONFIG_FILE))
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or contains invalid TOML.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        let config: Self = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Load configuration with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or parsed.
    pub async fn load() -> Result<Self, Error> {
        let config_path = Self::default_path()?;

        if config_path.exists() {
            Self::load_from_file(&config_path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit path, or the default location
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if an environment variable holds an invalid value.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        self.merge_vars(|key| std::env::var(key).ok())
    }

    /// Merge overrides from an arbitrary variable lookup
    ///
    /// # Errors
    ///
    /// Returns an error if a variable holds an invalid value.
    pub fn merge_vars(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), Error> {
        if let Some(color) = lookup("DEVBOOT_COLOR") {
            self.general.color = match color.as_str() {
                "always" => ColorChoice::Always,
                "auto" => ColorChoice::Auto,
                "never" => ColorChoice::Never,
                _ => return Err(invalid("DEVBOOT_COLOR", color)),
            };
        }

        if let Some(dir) = lookup("DEVBOOT_COMMAND_DIR") {
            self.paths.command_dir = Some(PathBuf::from(dir));
        }

        if let Some(dir) = lookup("DEVBOOT_APPLICATIONS_DIR") {
            self.paths.applications_dir = Some(PathBuf::from(dir));
        }

        if let Some(catalog) = lookup("DEVBOOT_CATALOG") {
            self.paths.catalog = Some(PathBuf::from(catalog));
        }

        if let Some(policy) = lookup("DEVBOOT_UNKNOWN_IDE_TYPE") {
            self.extensions.unknown_ide_type = match policy.as_str() {
                "skip" => UnknownIdePolicy::Skip,
                "reject" => UnknownIdePolicy::Reject,
                _ => return Err(invalid("DEVBOOT_UNKNOWN_IDE_TYPE", policy)),
            };
        }

        if let Some(policy) = lookup("DEVBOOT_EXIT_CODE_POLICY") {
            self.extensions.exit_code_policy = match policy.as_str() {
                "report" => ExitCodePolicy::Report,
                "reject" => ExitCodePolicy::Reject,
                _ => return Err(invalid("DEVBOOT_EXIT_CODE_POLICY", policy)),
            };
        }

        if let Some(flag) = lookup("DEVBOOT_REVERIFY_AFTER_HEAL") {
            self.extensions.reverify_after_heal = match flag.as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => return Err(invalid("DEVBOOT_REVERIFY_AFTER_HEAL", flag)),
            };
        }

        Ok(())
    }

    /// Directory command shims are linked into
    #[must_use]
    pub fn command_dir(&self) -> PathBuf {
        self.paths
            .command_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(constants::DEFAULT_COMMAND_DIR))
    }

    /// Directory app bundles live in
    #[must_use]
    pub fn applications_dir(&self) -> PathBuf {
        self.paths
            .applications_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(constants::DEFAULT_APPLICATIONS_DIR))
    }

    /// Directory per-channel log files are written to
    #[must_use]
    pub fn log_dir(&self) -> PathBuf {
        self.general.log_dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(constants::LOGS_SUBDIR)
        })
    }
}

fn invalid(field: &str, value: String) -> Error {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value,
    }
    .into()
}
