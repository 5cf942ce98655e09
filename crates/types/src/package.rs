//! Package descriptors and operation results

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Configuration bag attached to a package.
///
/// Recognized keys depend on the manager: extensions read [`Self::IDE_TYPE`],
/// native apps read [`Self::SOURCE`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageOptions(BTreeMap<String, String>);

impl PackageOptions {
    pub const IDE_TYPE: &'static str = "IDEType";
    pub const SOURCE: &'static str = "source";

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn ide_type(&self) -> Option<&str> {
        self.get(Self::IDE_TYPE)
    }
}

/// One installable unit, immutable once constructed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageInfo {
    pub name: String,
    #[serde(default)]
    pub options: PackageOptions,
}

impl PackageInfo {
    pub fn new(name: impl Into<String>, options: PackageOptions) -> Self {
        Self {
            name: name.into(),
            options,
        }
    }

    /// Descriptor for an IDE extension, e.g. `("ms-python.python", "VSCode")`.
    pub fn extension(id: impl Into<String>, ide_type: impl Into<String>) -> Self {
        Self::new(
            id,
            PackageOptions::new().with(PackageOptions::IDE_TYPE, ide_type),
        )
    }
}

/// Result of an install call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationResult {
    pub name: String,
    /// Exit code of the underlying command; `None` when nothing ran or the
    /// process was terminated by a signal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
}

impl OperationResult {
    /// Result for a call that did not run anything.
    pub fn skipped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            exit_code: None,
        }
    }

    pub fn exited(name: impl Into<String>, exit_code: Option<i32>) -> Self {
        Self {
            name: name.into(),
            exit_code,
        }
    }
}

/// Family of packages a manager handles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageFamily {
    App,
    Extension,
}

impl fmt::Display for PackageFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::App => f.write_str("app"),
            Self::Extension => f.write_str("extension"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_descriptor() {
        let package = PackageInfo::extension("ms-python.python", "VSCode");
        assert_eq!(package.name, "ms-python.python");
        assert_eq!(package.options.ide_type(), Some("VSCode"));
        assert_eq!(package.options.get(PackageOptions::SOURCE), None);
    }

    #[test]
    fn test_package_info_deserializes_option_bag() {
        let package: PackageInfo = serde_json::from_str(
            r#"{ "name": "ms-python.python", "options": { "IDEType": "VSCode" } }"#,
        )
        .unwrap();
        assert_eq!(package, PackageInfo::extension("ms-python.python", "VSCode"));

        let bare: PackageInfo = serde_json::from_str(r#"{ "name": "Git" }"#).unwrap();
        assert_eq!(bare.options, PackageOptions::new());
    }

    #[test]
    fn test_skipped_result_omits_exit_code() {
        let json = serde_json::to_string(&OperationResult::skipped("x")).unwrap();
        assert_eq!(json, r#"{"name":"x"}"#);
    }
}
