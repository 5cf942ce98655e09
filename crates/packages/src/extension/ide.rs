//! IDE types with a registered extension processor

use std::fmt;
use std::str::FromStr;

/// An IDE whose extensions can be managed through its CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdeType {
    VsCode,
}

impl IdeType {
    pub const ALL: &'static [Self] = &[Self::VsCode];

    /// Tag used in package options (`IDEType`)
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::VsCode => "VSCode",
        }
    }

    /// Catalog and install-command table name of the IDE application
    #[must_use]
    pub fn app_name(self) -> &'static str {
        match self {
            Self::VsCode => "VSCode",
        }
    }

    /// CLI command the IDE installs extensions with
    #[must_use]
    pub fn command(self) -> &'static str {
        match self {
            Self::VsCode => "code",
        }
    }

    #[must_use]
    pub fn install_args(self, extension_id: &str) -> [String; 2] {
        match self {
            Self::VsCode => ["--install-extension".to_string(), extension_id.to_string()],
        }
    }

    #[must_use]
    pub fn uninstall_args(self, extension_id: &str) -> [String; 2] {
        match self {
            Self::VsCode => ["--uninstall-extension".to_string(), extension_id.to_string()],
        }
    }
}

impl fmt::Display for IdeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for IdeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|ide| ide.tag() == s)
            .ok_or_else(|| format!("unknown IDE type: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_exact() {
        assert_eq!("VSCode".parse::<IdeType>().unwrap(), IdeType::VsCode);
        assert!("vscode".parse::<IdeType>().is_err());
        assert!("Unknown".parse::<IdeType>().is_err());
    }

    #[test]
    fn test_vscode_command_line() {
        let ide = IdeType::VsCode;
        assert_eq!(ide.command(), "code");
        assert_eq!(
            ide.install_args("ms-python.python"),
            ["--install-extension", "ms-python.python"]
        );
        assert_eq!(
            ide.uninstall_args("ms-python.python"),
            ["--uninstall-extension", "ms-python.python"]
        );
    }
}
