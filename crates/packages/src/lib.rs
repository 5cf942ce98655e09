#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Package managers for devboot
//!
//! Every package family sits behind the same [`PackageManager`] contract so
//! callers can install and uninstall without knowing which variant they hold:
//! - [`ExtensionManager`] installs IDE extensions through the IDE's CLI and
//!   repairs the CLI shim on PATH when it has gone missing
//! - [`AppManager`] installs base applications shipped as disk images
//!
//! Managers never print. Subprocess output and lifecycle messages go to the
//! log sink (the event channel) on the manager's channel.

pub mod app;
pub mod extension;
pub mod manager;
pub mod registry;
mod runner;

pub use app::AppManager;
pub use extension::{ExtensionManager, ExtensionSettings, IdeType};
pub use manager::PackageManager;
pub use registry::PackageManagers;
