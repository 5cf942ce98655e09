//! Base-app catalog and install-command table

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Operating system identifier used by catalog entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    Darwin,
    Win32,
    Linux,
}

impl Os {
    /// The platform this binary was compiled for.
    #[must_use]
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Self::Darwin
        } else if cfg!(target_os = "windows") {
            Self::Win32
        } else {
            Self::Linux
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Darwin => "darwin",
            Self::Win32 => "win32",
            Self::Linux => "linux",
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Os {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "darwin" => Ok(Self::Darwin),
            "win32" => Ok(Self::Win32),
            "linux" => Ok(Self::Linux),
            other => Err(format!("unknown platform: {other}")),
        }
    }
}

/// Install mechanism tag of a base app.
///
/// Unknown tags are kept verbatim so the manager can report them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AppType {
    /// Mounted disk image (`.dmg`) containing an app bundle
    Dmg,
    Other(String),
}

impl AppType {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Dmg => "dmg",
            Self::Other(tag) => tag,
        }
    }
}

impl From<String> for AppType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "dmg" => Self::Dmg,
            _ => Self::Other(tag),
        }
    }
}

impl From<AppType> for String {
    fn from(app_type: AppType) -> Self {
        match app_type {
            AppType::Dmg => "dmg".to_string(),
            AppType::Other(tag) => tag,
        }
    }
}

impl fmt::Display for AppType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A base application known to the bootstrap
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseApp {
    pub name: String,
    #[serde(rename = "type")]
    pub app_type: AppType,
    /// Platform tags this build does not know are dropped while loading
    #[serde(default, deserialize_with = "known_platforms")]
    pub platforms: Vec<Os>,
    /// Bundle directory name inside the applications directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle: Option<String>,
}

impl BaseApp {
    /// Bundle directory name, `<name>.app` unless the catalog overrides it.
    #[must_use]
    pub fn bundle_name(&self) -> String {
        self.bundle
            .clone()
            .unwrap_or_else(|| format!("{}.app", self.name))
    }

    #[must_use]
    pub fn supports(&self, platform: Os) -> bool {
        self.platforms.contains(&platform)
    }
}

fn known_platforms<'de, D>(deserializer: D) -> Result<Vec<Os>, D::Error>
where
    D: Deserializer<'de>,
{
    let tags = Vec::<String>::deserialize(deserializer)?;
    Ok(tags.iter().filter_map(|tag| tag.parse().ok()).collect())
}

/// Catalog of base applications, read-only once loaded
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackagesData {
    #[serde(default)]
    pub bases: Vec<BaseApp>,
}

impl PackagesData {
    #[must_use]
    pub fn new(bases: Vec<BaseApp>) -> Self {
        Self { bases }
    }

    /// Find a base app by name among those distributable on `platform`.
    #[must_use]
    pub fn find_base(&self, name: &str, platform: Os) -> Option<&BaseApp> {
        self.bases
            .iter()
            .find(|base| base.name == name && base.supports(platform))
    }
}

/// Maps a well-known app to the CLI shim embedded in its bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallCommandPackage {
    pub name: String,
    pub command_relative_path: PathBuf,
}

/// Lookup table of command shims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstallCommandTable(Vec<InstallCommandPackage>);

impl InstallCommandTable {
    #[must_use]
    pub fn new(entries: Vec<InstallCommandPackage>) -> Self {
        Self(entries)
    }

    #[must_use]
    pub fn find(&self, name: &str) -> Option<&InstallCommandPackage> {
        self.0.iter().find(|entry| entry.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &InstallCommandPackage> {
        self.0.iter()
    }
}

impl Default for InstallCommandTable {
    fn default() -> Self {
        Self(vec![InstallCommandPackage {
            name: "VSCode".to_string(),
            command_relative_path: PathBuf::from("Contents/Resources/app/bin/code"),
        }])
    }
}

/// Whether an app is present on this machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionStatus {
    Installed,
    Uninstalled,
}

/// Local install descriptor produced by an app probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalAppInfo {
    /// Where the app lives (or would live) on disk
    pub path: PathBuf,
    pub version_status: VersionStatus,
}

impl LocalAppInfo {
    #[must_use]
    pub fn new(path: impl AsRef<Path>, version_status: VersionStatus) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            version_status,
        }
    }

    #[must_use]
    pub fn is_installed(&self) -> bool {
        self.version_status == VersionStatus::Installed
    }
}
