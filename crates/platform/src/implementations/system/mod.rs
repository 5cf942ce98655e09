//! Implementations backed by the running operating system

pub mod apps;
pub mod filesystem;
pub mod process;

pub use apps::DiskImageProbe;
pub use filesystem::SystemFilesystemOperations;
pub use process::SystemProcessOperations;

use std::time::Duration;

fn duration_to_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
