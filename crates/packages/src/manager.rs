//! The package manager contract

use async_trait::async_trait;
use devboot_errors::Error;
use devboot_types::{OperationResult, PackageInfo};

/// Installs and uninstalls packages of one family
#[async_trait]
pub trait PackageManager: Send + Sync {
    /// Install one package
    ///
    /// # Errors
    ///
    /// Returns an error if a prerequisite is missing, the install mechanism
    /// is unsupported or the underlying command could not run.
    async fn install(&self, package: &PackageInfo) -> Result<OperationResult, Error>;

    /// Uninstall one package
    ///
    /// # Errors
    ///
    /// Same conditions as [`PackageManager::install`].
    async fn uninstall(&self, package: &PackageInfo) -> Result<(), Error>;
}
