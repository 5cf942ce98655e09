//! Command line interface definition

use clap::{Parser, Subcommand};
use devboot_events::PackageOperation;
use devboot_types::{ColorChoice, PackageFamily, PackageInfo, PackageOptions};
use std::path::PathBuf;

/// devboot - Developer environment bootstrap
#[derive(Parser)]
#[command(name = "devboot")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Developer environment bootstrap for apps, IDE extensions and command shims")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Parser)]
pub struct GlobalArgs {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging to the log directory
    #[arg(long, global = true)]
    pub debug: bool,

    /// Color output control
    #[arg(long, global = true, value_enum)]
    pub color: Option<ColorChoice>,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Packages catalog (JSON)
    #[arg(long, global = true, value_name = "PATH")]
    pub catalog: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Manage IDE extensions
    #[command(subcommand)]
    Ext(ExtCommands),

    /// Manage base applications
    #[command(subcommand)]
    App(AppCommands),

    /// Check whether a command resolves on PATH
    Which {
        /// Command name
        command: String,
    },
}

/// Extension subcommands
#[derive(Subcommand)]
pub enum ExtCommands {
    /// Install extensions
    #[command(alias = "i")]
    Install {
        /// Extension identifiers (e.g. ms-python.python)
        #[arg(required = true)]
        ids: Vec<String>,

        /// IDE the extensions belong to
        #[arg(long, default_value = "VSCode")]
        ide: String,
    },

    /// Uninstall extensions
    #[command(alias = "rm")]
    Uninstall {
        /// Extension identifiers
        #[arg(required = true)]
        ids: Vec<String>,

        /// IDE the extensions belong to
        #[arg(long, default_value = "VSCode")]
        ide: String,
    },
}

/// Base application subcommands
#[derive(Subcommand)]
pub enum AppCommands {
    /// Install an application from a local disk image
    Install {
        /// Catalog name of the application
        name: String,

        /// Path to the .dmg to install from
        #[arg(long, value_name = "DMG")]
        source: PathBuf,
    },

    /// Remove an installed application
    #[command(alias = "rm")]
    Uninstall {
        /// Catalog name of the application
        name: String,
    },
}

/// A batch of packages for one manager
#[derive(Debug)]
pub struct PackageRequest {
    pub family: PackageFamily,
    pub operation: PackageOperation,
    pub packages: Vec<PackageInfo>,
}

impl Commands {
    /// Package descriptors for the package commands, `None` for the rest
    pub fn package_request(&self) -> Option<PackageRequest> {
        let (family, operation, packages) = match self {
            Commands::Ext(ExtCommands::Install { ids, ide }) => (
                PackageFamily::Extension,
                PackageOperation::Install,
                extensions(ids, ide),
            ),
            Commands::Ext(ExtCommands::Uninstall { ids, ide }) => (
                PackageFamily::Extension,
                PackageOperation::Uninstall,
                extensions(ids, ide),
            ),
            Commands::App(AppCommands::Install { name, source }) => (
                PackageFamily::App,
                PackageOperation::Install,
                vec![PackageInfo::new(
                    name.clone(),
                    PackageOptions::new()
                        .with(PackageOptions::SOURCE, source.to_string_lossy()),
                )],
            ),
            Commands::App(AppCommands::Uninstall { name }) => (
                PackageFamily::App,
                PackageOperation::Uninstall,
                vec![PackageInfo::new(name.clone(), PackageOptions::new())],
            ),
            Commands::Which { .. } => return None,
        };
        Some(PackageRequest {
            family,
            operation,
            packages,
        })
    }
}

fn extensions(ids: &[String], ide: &str) -> Vec<PackageInfo> {
    ids.iter()
        .map(|id| PackageInfo::extension(id.clone(), ide))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ext_install_defaults_to_vscode() {
        let cli = Cli::parse_from([
            "devboot",
            "ext",
            "install",
            "ms-python.python",
            "rust-lang.rust-analyzer",
        ]);
        let request = cli.command.package_request().unwrap();

        assert_eq!(request.family, PackageFamily::Extension);
        assert_eq!(request.operation, PackageOperation::Install);
        assert_eq!(
            request.packages,
            vec![
                PackageInfo::extension("ms-python.python", "VSCode"),
                PackageInfo::extension("rust-lang.rust-analyzer", "VSCode"),
            ]
        );
    }

    #[test]
    fn test_ext_uninstall_with_ide() {
        let cli = Cli::parse_from(["devboot", "ext", "rm", "--ide", "Cursor", "a.b"]);
        let request = cli.command.package_request().unwrap();

        assert_eq!(request.operation, PackageOperation::Uninstall);
        assert_eq!(request.packages[0].options.ide_type(), Some("Cursor"));
    }

    #[test]
    fn test_ext_install_requires_ids() {
        assert!(Cli::try_parse_from(["devboot", "ext", "install"]).is_err());
    }

    #[test]
    fn test_app_install_carries_source() {
        let cli = Cli::parse_from([
            "devboot",
            "app",
            "install",
            "VSCode",
            "--source",
            "/tmp/VSCode.dmg",
        ]);
        let request = cli.command.package_request().unwrap();

        assert_eq!(request.family, PackageFamily::App);
        assert_eq!(
            request.packages[0].options.get(PackageOptions::SOURCE),
            Some("/tmp/VSCode.dmg")
        );
        assert!(Cli::try_parse_from(["devboot", "app", "install", "VSCode"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "devboot",
            "which",
            "code",
            "--json",
            "--color",
            "never",
            "--catalog",
            "catalog.json",
        ]);

        assert!(cli.global.json);
        assert_eq!(cli.global.color, Some(ColorChoice::Never));
        assert_eq!(cli.global.catalog, Some(PathBuf::from("catalog.json")));
        assert!(cli.command.package_request().is_none());
    }
}
