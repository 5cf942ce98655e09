//! Concrete platform implementations

pub mod system;
