//! Scheduling core: dependency graph over phases and tasks, predecessor
//! resolution and conflict detection, progress rollup, cascade propagation of
//! date changes, and sibling sequencing.
//!
//! Everything here is synchronous and operates on an in-memory
//! [`working_set::WorkingSet`]; persistence is the caller's job.

pub mod cascade;
pub mod conflict;
pub mod graph;
pub mod resolver;
pub mod rollup;
pub mod sequence;
pub mod visited;
pub mod working_set;
