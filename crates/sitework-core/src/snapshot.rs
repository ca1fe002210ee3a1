use serde::{Deserialize, Serialize};
use std::path::Path;

use sitework_util::errors::SiteworkError;

use crate::unit::{ProjectId, ScheduleUnit};

/// On-disk snapshot of one project's schedule (`sitework.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectFile {
    pub project_id: ProjectId,
    #[serde(default)]
    pub units: Vec<ScheduleUnit>,
}

impl ProjectFile {
    pub fn new(project_id: ProjectId) -> Self {
        Self {
            project_id,
            units: Vec::new(),
        }
    }

    /// Load and parse a project file from the given path.
    pub fn from_path(path: &Path) -> Result<Self, SiteworkError> {
        let content = std::fs::read_to_string(path).map_err(|e| SiteworkError::Snapshot {
            message: format!("Failed to read project file {}: {e}", path.display()),
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, SiteworkError> {
        let file: Self = serde_json::from_str(content).map_err(|e| SiteworkError::Snapshot {
            message: format!("Failed to parse project file: {e}"),
        })?;
        if let Some(stray) = file.units.iter().find(|u| u.project_id != file.project_id) {
            return Err(SiteworkError::Snapshot {
                message: format!(
                    "unit {} belongs to project {}, not {}",
                    stray.id, stray.project_id, file.project_id
                ),
            });
        }
        Ok(file)
    }

    /// Serialize the snapshot to pretty-printed JSON.
    pub fn to_string_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write the snapshot to `path`, replacing any previous contents atomically.
    pub fn write_to(&self, path: &Path) -> Result<(), SiteworkError> {
        let json = self.to_string_pretty().map_err(|e| SiteworkError::Snapshot {
            message: format!("Failed to serialize project file: {e}"),
        })?;
        sitework_util::fs::write_atomic(path, json.as_bytes())?;
        Ok(())
    }
}
