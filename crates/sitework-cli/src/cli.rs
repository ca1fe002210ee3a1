//! CLI argument definitions for Sitework.
//!
//! Uses `clap` derive macros to define the full command surface. Each command
//! corresponds to a handler in the [`super::commands`] module.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use sitework_core::dates;
use sitework_core::unit::UnitStatus;

#[derive(Parser, Debug)]
#[command(
    name = "sitework",
    version,
    about = "Phase and task scheduling for construction projects",
    long_about = "Sitework keeps a project's phases and tasks on a calendar: predecessor \
                  links place start dates, edits cascade through every dependent, and \
                  phases roll up the dates and progress of their tasks."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Project file to operate on
    #[arg(short, long, global = true, env = "SITEWORK_FILE", default_value = sitework_core::PROJECT_FILE_NAME)]
    pub file: PathBuf,

    /// Print results as JSON on stdout
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create an empty project file
    Init {
        /// Project identifier
        project: String,
    },

    /// Add a phase, or a task with --parent
    Add {
        /// Display name
        name: String,
        /// Planned start (YYYY-MM-DD); moved after --after when given
        #[arg(long, value_parser = parse_date_arg)]
        start: NaiveDate,
        /// Working days
        #[arg(long)]
        duration: u32,
        /// Slack days appended after the working days
        #[arg(long, default_value_t = 0)]
        buffer: u32,
        /// Phase to nest this task under
        #[arg(long)]
        parent: Option<String>,
        /// Predecessor unit
        #[arg(long)]
        after: Option<String>,
        /// Sequence order among siblings (default: last)
        #[arg(long)]
        order: Option<u32>,
        /// Explicit unit ID (default: generated)
        #[arg(long)]
        id: Option<String>,
    },

    /// Move a unit to a new start date
    Move {
        id: String,
        /// New start (YYYY-MM-DD)
        #[arg(value_parser = parse_date_arg)]
        start: NaiveDate,
    },

    /// Change a unit's duration, buffer or end date
    Resize {
        id: String,
        #[arg(long, conflicts_with = "end")]
        duration: Option<u32>,
        #[arg(long)]
        buffer: Option<u32>,
        /// Resize against the end edge (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date_arg)]
        end: Option<NaiveDate>,
    },

    /// Set or clear a unit's predecessor
    Depend {
        id: String,
        /// New predecessor
        #[arg(long, conflicts_with = "none", required_unless_present = "none")]
        on: Option<String>,
        /// Remove the predecessor
        #[arg(long)]
        none: bool,
    },

    /// Put siblings in a new order
    Reorder {
        /// Reorder the tasks of this phase instead of the phases
        #[arg(long)]
        parent: Option<String>,
        /// Every sibling ID, in the new order
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },

    /// Change a unit's status
    Status {
        id: String,
        /// not_started, in_progress, completed, delayed or blocked
        #[arg(value_parser = parse_status_arg)]
        status: UnitStatus,
        /// Actual start date (default: today)
        #[arg(long, value_parser = parse_date_arg)]
        started: Option<NaiveDate>,
        /// Actual end date (default: today)
        #[arg(long, value_parser = parse_date_arg)]
        finished: Option<NaiveDate>,
    },

    /// Delete a unit and its tasks
    Rm { id: String },

    /// Display the schedule as a tree
    Show,

    /// Scan the project for scheduling conflicts
    Conflicts,
}

fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
    dates::parse_date(s).map_err(|e| e.to_string())
}

fn parse_status_arg(s: &str) -> Result<UnitStatus, String> {
    s.parse().map_err(|e: sitework_util::errors::SiteworkError| e.to_string())
}

pub fn parse() -> Cli {
    Cli::parse()
}
