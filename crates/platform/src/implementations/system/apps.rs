//! App bundle probe for disk-image installs

use async_trait::async_trait;
use devboot_errors::PlatformError;
use devboot_types::{BaseApp, LocalAppInfo, VersionStatus};
use std::path::PathBuf;
use tokio::fs;

use crate::apps::LocalAppProbe;

/// Looks for `<applications_dir>/<bundle>` on disk
#[derive(Debug, Clone)]
pub struct DiskImageProbe {
    applications_dir: PathBuf,
}

impl DiskImageProbe {
    #[must_use]
    pub fn new(applications_dir: PathBuf) -> Self {
        Self { applications_dir }
    }
}

#[async_trait]
impl LocalAppProbe for DiskImageProbe {
    async fn local_info(&self, app: &BaseApp) -> Result<LocalAppInfo, PlatformError> {
        let path = self.applications_dir.join(app.bundle_name());
        let status = match fs::metadata(&path).await {
            Ok(metadata) if metadata.is_dir() => VersionStatus::Installed,
            _ => VersionStatus::Uninstalled,
        };
        tracing::trace!(app = %app.name, path = %path.display(), ?status, "probed local app");
        Ok(LocalAppInfo::new(path, status))
    }
}
