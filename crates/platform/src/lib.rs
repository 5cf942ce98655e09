#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Platform abstraction layer for the devboot installation layer.
//!
//! This crate provides a unified interface for the side-effecting operations
//! the package managers depend on:
//! - Process operations (command lookup on the search path, streamed subprocess runs)
//! - Filesystem operations (linking a command shim into a directory on PATH)
//! - Local app probing (is an app bundle present on this machine)
//!
//! Every operation reports itself through `PlatformEvent`s on the context's
//! event channel, and every seam is a trait so managers can be exercised
//! against in-memory fakes.

pub mod apps;
pub mod core;
pub mod filesystem;
pub mod implementations;
pub mod process;

pub use core::{Platform, PlatformContext, PlatformSettings};
pub use implementations::system::{
    DiskImageProbe, SystemFilesystemOperations, SystemProcessOperations,
};

/// Re-export commonly used types
pub use apps::LocalAppProbe;
pub use filesystem::FilesystemOperations;
pub use process::{
    OutputChunk, OutputStream, PlatformCommand, ProcessExit, ProcessOperations,
};
