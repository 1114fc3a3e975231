//! Configuration types
//!
//! Board description consumed by the signal I/O core. The firmware builds
//! one of these from the compile-time board file and validates it before
//! bringing anything up.

pub mod types;

pub use types::*;
