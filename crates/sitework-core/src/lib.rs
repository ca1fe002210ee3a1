//! Core data types for the Sitework scheduling engine.
//!
//! This crate defines the fundamental types that represent a construction
//! schedule: the schedulable unit (a phase or a task), its identifiers and
//! status, partial updates, civil-date arithmetic, the on-disk project
//! snapshot, and global configuration.
//!
//! This crate is intentionally free of async code and I/O beyond reading
//! and writing its own files.

/// Default project snapshot file name.
pub const PROJECT_FILE_NAME: &str = "sitework.json";

pub mod config;
pub mod dates;
pub mod snapshot;
pub mod unit;
