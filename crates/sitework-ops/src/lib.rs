//! Scheduling commands over external collaborators.
//!
//! [`engine::ScheduleEngine`] takes a consistent snapshot of a project from a
//! [`store::UnitStore`], runs the pure computations from
//! `sitework-scheduler`, writes each changed unit back one at a time and hands
//! the resulting events to a [`notify::ChangeNotifier`]. Commands on the same
//! project are serialized; different projects proceed in parallel.

pub mod engine;
pub mod notify;
pub mod ops_create;
pub mod ops_dates;
pub mod ops_delete;
pub mod ops_predecessor;
pub mod ops_query;
pub mod ops_reorder;
pub mod ops_status;
pub mod store;
pub mod store_file;
pub mod store_memory;
