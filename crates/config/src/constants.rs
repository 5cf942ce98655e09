//! Default locations used when the configuration does not override them

/// Directory on PATH where command shims are linked
pub const DEFAULT_COMMAND_DIR: &str = "/usr/local/bin";

/// Where app bundles are installed
pub const DEFAULT_APPLICATIONS_DIR: &str = "/Applications";

/// Log directory relative to the home directory
pub const LOGS_SUBDIR: &str = ".devboot/logs";

/// Config file relative to the platform config directory
pub const CONFIG_FILE: &str = "devboot/config.toml";
