#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for the devboot installation layer
//!
//! This crate provides the data model shared by the managers, the platform
//! layer and the CLI: package descriptors, the base-app catalog and the
//! install-command table.

pub mod catalog;
pub mod package;

pub use catalog::{
    AppType, BaseApp, InstallCommandPackage, InstallCommandTable, LocalAppInfo, PackagesData,
    Os, VersionStatus,
};
pub use package::{OperationResult, PackageFamily, PackageInfo, PackageOptions};

use serde::{Deserialize, Serialize};

/// Color output control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    Always,
    Auto,
    Never,
}

// Implement clap::ValueEnum for ColorChoice
impl clap::ValueEnum for ColorChoice {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Always, Self::Auto, Self::Never]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(match self {
            Self::Always => clap::builder::PossibleValue::new("always"),
            Self::Auto => clap::builder::PossibleValue::new("auto"),
            Self::Never => clap::builder::PossibleValue::new("never"),
        })
    }
}

impl Default for ColorChoice {
    fn default() -> Self {
        Self::Auto
    }
}

/// What to do when a package names an IDE type with no registered processor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownIdePolicy {
    /// Resolve without doing anything
    #[default]
    Skip,
    /// Fail with `UnsupportedExtensionType`
    Reject,
}

/// How a finished subprocess's exit code is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExitCodePolicy {
    /// Hand the exit code back to the caller, whatever it is
    #[default]
    Report,
    /// Treat anything but exit code 0 as a failure
    Reject,
}

impl ExitCodePolicy {
    /// Whether an exit code is acceptable under this policy.
    #[must_use]
    pub fn accepts(self, code: Option<i32>) -> bool {
        match self {
            Self::Report => true,
            Self::Reject => code == Some(0),
        }
    }
}
