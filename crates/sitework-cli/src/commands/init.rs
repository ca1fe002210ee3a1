//! Handler for `sitework init`.

use std::path::Path;

use miette::Result;
use sitework_core::unit::ProjectId;
use sitework_ops::store_file::JsonFileStore;
use sitework_util::errors::SiteworkError;
use sitework_util::progress::status;

pub fn exec(file: &Path, project: &str) -> Result<()> {
    if project.trim().is_empty() {
        return Err(SiteworkError::validation("project identifier must not be empty").into());
    }
    if let Some(dir) = file.parent().filter(|d| !d.as_os_str().is_empty()) {
        sitework_util::fs::ensure_dir(dir).map_err(SiteworkError::Io)?;
    }
    JsonFileStore::create(file, ProjectId::new(project.trim()))?;
    status("Created", &format!("project `{}` in {}", project.trim(), file.display()));
    Ok(())
}
