//! Packages catalog loading
//!
//! The catalog is a JSON document owned by the bootstrap sequencer:
//!
//! ```json
//! {
//!   "bases": [{ "name": "VSCode", "type": "dmg", "platforms": ["darwin"] }],
//!   "installCommands": [{ "name": "VSCode", "commandRelativePath": "Contents/Resources/app/bin/code" }]
//! }
//! ```
//!
//! `installCommands` is optional; the built-in table is used when it is absent.

use devboot_errors::{ConfigError, Error};
use devboot_types::{BaseApp, InstallCommandTable, PackagesData};
use serde::Deserialize;
use std::path::Path;
use tokio::fs;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogFile {
    #[serde(default)]
    bases: Vec<BaseApp>,
    #[serde(default)]
    install_commands: Option<InstallCommandTable>,
}

/// Read-only lookup data handed to managers at construction time
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub packages: PackagesData,
    pub install_commands: InstallCommandTable,
}

impl Catalog {
    /// Load a catalog from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid catalog.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::CatalogNotFound {
                path: path.display().to_string(),
            })?;
        Self::parse(&contents, path)
    }

    /// Load from an optional path, falling back to an empty catalog
    ///
    /// # Errors
    ///
    /// Returns an error if a path is given and cannot be loaded.
    pub async fn load_or_empty(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(path) => Self::load_from_file(path).await,
            None => {
                tracing::debug!("no catalog configured, starting with an empty one");
                Ok(Self::default())
            }
        }
    }

    fn parse(contents: &str, path: &Path) -> Result<Self, Error> {
        let file: CatalogFile =
            serde_json::from_str(contents).map_err(|e| ConfigError::InvalidCatalog {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            packages: PackagesData::new(file.bases),
            install_commands: file.install_commands.unwrap_or_default(),
        })
    }
}
