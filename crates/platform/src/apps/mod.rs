//! Local application probing

use async_trait::async_trait;
use devboot_errors::PlatformError;
use devboot_types::{BaseApp, LocalAppInfo};

/// Reports where an app lives on this machine and whether it is installed
#[async_trait]
pub trait LocalAppProbe: Send + Sync {
    async fn local_info(&self, app: &BaseApp) -> Result<LocalAppInfo, PlatformError>;
}
