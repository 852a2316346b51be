//! Shared delta data models consumed by the core engine and hosting crates.

pub mod delta;
pub mod deployment;
pub mod revision;

pub use delta::*;
pub use deployment::*;
pub use revision::*;
