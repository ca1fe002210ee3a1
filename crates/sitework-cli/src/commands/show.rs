//! Handler for `sitework show`.

use std::path::Path;

use miette::Result;
use sitework_util::errors::SiteworkError;
use sitework_util::progress::status_info;

pub async fn exec(file: &Path, json: bool) -> Result<()> {
    let (engine, project) = super::open_project(file).await?;
    if json {
        let units = engine.snapshot(&project).await?;
        let text = serde_json::to_string_pretty(&units).map_err(|e| SiteworkError::Snapshot {
            message: format!("Failed to serialize units: {e}"),
        })?;
        println!("{text}");
        return Ok(());
    }

    let tree = engine.print_tree(&project).await?;
    if tree.is_empty() {
        status_info("Empty", &format!("project `{project}` has no units yet"));
    } else {
        print!("{tree}");
    }
    Ok(())
}
