//! Command dispatch and handler modules.

mod add;
mod conflicts;
mod depend;
mod edit;
mod init;
mod reorder;
mod rm;
mod show;
mod status;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use miette::Result;
use sitework_core::config::GlobalConfig;
use sitework_core::dates::format_date;
use sitework_core::unit::{ProjectId, ScheduleUnit};
use sitework_ops::engine::{CommandOutcome, ScheduleEngine};
use sitework_ops::store_file::JsonFileStore;
use sitework_util::errors::SiteworkError;
use sitework_util::progress::{status, status_warn};

use crate::cli::{Cli, Command};

/// Route a parsed CLI invocation to the appropriate command handler.
pub async fn dispatch(cli: Cli) -> Result<()> {
    let file = locate(&cli.file);
    let file = file.as_path();
    let json = cli.json;
    match cli.command {
        Command::Init { project } => init::exec(&cli.file, &project),
        Command::Add {
            name,
            start,
            duration,
            buffer,
            parent,
            after,
            order,
            id,
        } => {
            let opts = add::AddArgs {
                name,
                start,
                duration,
                buffer,
                parent,
                after,
                order,
                id,
            };
            add::exec(file, opts, json).await
        }
        Command::Move { id, start } => edit::exec_move(file, &id, start, json).await,
        Command::Resize {
            id,
            duration,
            buffer,
            end,
        } => edit::exec_resize(file, &id, duration, buffer, end, json).await,
        Command::Depend { id, on, .. } => depend::exec(file, &id, on, json).await,
        Command::Reorder { parent, ids } => reorder::exec(file, parent, &ids, json).await,
        Command::Status {
            id,
            status,
            started,
            finished,
        } => status::exec(file, &id, status, started, finished, json).await,
        Command::Rm { id } => rm::exec(file, &id, json).await,
        Command::Show => show::exec(file, json).await,
        Command::Conflicts => conflicts::exec(file, json).await,
    }
}

/// A bare file name that is not in the current directory is searched for in
/// its ancestors, so commands work from anywhere inside a project tree.
fn locate(file: &Path) -> PathBuf {
    let bare = file.parent().is_some_and(|p| p.as_os_str().is_empty());
    if file.is_file() || !bare {
        return file.to_path_buf();
    }
    let found = std::env::current_dir().ok().and_then(|cwd| {
        let name = file.to_str()?;
        sitework_util::fs::find_ancestor_with(&cwd, name)
    });
    match found {
        Some(dir) => dir.join(file),
        None => file.to_path_buf(),
    }
}

/// Open the project file and build an engine configured from the global config.
pub(crate) async fn open_project(file: &Path) -> Result<(ScheduleEngine, ProjectId)> {
    if !file.is_file() {
        return Err(SiteworkError::Snapshot {
            message: format!(
                "No project file at {}; run `sitework init <project>` first",
                file.display()
            ),
        }
        .into());
    }
    let config = GlobalConfig::load()?;
    let store = Arc::new(JsonFileStore::open(file)?);
    let project = store.project_id().await;
    tracing::info!("Opened project {project} from {}", file.display());
    Ok((ScheduleEngine::from_config(store, &config), project))
}

/// One-line summary of a unit.
pub(crate) fn describe(unit: &ScheduleUnit) -> String {
    format!(
        "{} [{}] {}..{}",
        unit.name,
        unit.id,
        format_date(unit.planned_start_date),
        format_date(unit.planned_end_date)
    )
}

/// Print what a command changed.
pub(crate) fn report(outcome: &CommandOutcome, json: bool) -> Result<()> {
    if json {
        let text = serde_json::to_string_pretty(outcome).map_err(|e| SiteworkError::Snapshot {
            message: format!("Failed to serialize outcome: {e}"),
        })?;
        println!("{text}");
        return Ok(());
    }

    for unit in &outcome.units {
        let label = if outcome.created.as_ref() == Some(&unit.id) {
            "Added"
        } else {
            "Updated"
        };
        status(label, &describe(unit));
    }
    for id in &outcome.removed {
        status("Removed", id.as_str());
    }
    if outcome.is_noop() {
        status("Unchanged", "nothing to write");
    }
    for conflict in outcome.conflicts.iter() {
        status_warn("Conflict", &conflict.to_string());
    }
    Ok(())
}
