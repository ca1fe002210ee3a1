//! Handler for `sitework conflicts`.

use std::path::Path;

use miette::Result;
use sitework_util::errors::SiteworkError;
use sitework_util::progress::status_warn;

pub async fn exec(file: &Path, json: bool) -> Result<()> {
    let (engine, project) = super::open_project(file).await?;
    let health = engine.conflicts(&project).await?;

    if json {
        let text = serde_json::to_string_pretty(&health).map_err(|e| SiteworkError::Snapshot {
            message: format!("Failed to serialize conflicts: {e}"),
        })?;
        println!("{text}");
        return Ok(());
    }

    println!("{}", health.conflicts.to_string().trim_end());
    for cycle in &health.cycles {
        let ids: Vec<&str> = cycle.iter().map(|id| id.as_str()).collect();
        status_warn("Cycle", &ids.join(" -> "));
    }
    Ok(())
}
