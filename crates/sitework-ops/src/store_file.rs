//! [`UnitStore`] backed by a single-project JSON snapshot file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sitework_core::snapshot::ProjectFile;
use sitework_core::unit::{ProjectId, ScheduleUnit, UnitId, UnitPatch};
use sitework_util::errors::SiteworkError;
use tokio::sync::Mutex;

use crate::store::UnitStore;

/// Every write rewrites the whole file, so each persisted update is durable
/// on its own.
pub struct JsonFileStore {
    path: PathBuf,
    file: Mutex<ProjectFile>,
}

impl JsonFileStore {
    /// Open an existing project file.
    pub fn open(path: &Path) -> Result<Self, SiteworkError> {
        let file = ProjectFile::from_path(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
        })
    }

    /// Create a new, empty project file. Fails if the file already exists.
    pub fn create(path: &Path, project_id: ProjectId) -> Result<Self, SiteworkError> {
        if path.exists() {
            return Err(SiteworkError::Snapshot {
                message: format!("{} already exists", path.display()),
            });
        }
        let file = ProjectFile::new(project_id);
        file.write_to(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn project_id(&self) -> ProjectId {
        self.file.lock().await.project_id.clone()
    }
}

#[async_trait]
impl UnitStore for JsonFileStore {
    async fn fetch_units_by_project(
        &self,
        project: &ProjectId,
    ) -> Result<Vec<ScheduleUnit>, SiteworkError> {
        let file = self.file.lock().await;
        if &file.project_id != project {
            return Ok(Vec::new());
        }
        Ok(file.units.clone())
    }

    async fn fetch_unit(&self, id: &UnitId) -> Result<ScheduleUnit, SiteworkError> {
        self.file
            .lock()
            .await
            .units
            .iter()
            .find(|u| &u.id == id)
            .cloned()
            .ok_or_else(|| SiteworkError::not_found(id.as_str()))
    }

    async fn persist_unit_update(
        &self,
        id: &UnitId,
        patch: &UnitPatch,
    ) -> Result<(), SiteworkError> {
        let mut file = self.file.lock().await;
        let mut next = file.clone();
        let unit = next
            .units
            .iter_mut()
            .find(|u| &u.id == id)
            .ok_or_else(|| SiteworkError::not_found(id.as_str()))?;
        patch.apply_to(unit);
        next.write_to(&self.path)?;
        *file = next;
        Ok(())
    }

    async fn insert_unit(&self, unit: &ScheduleUnit) -> Result<(), SiteworkError> {
        let mut file = self.file.lock().await;
        if unit.project_id != file.project_id {
            return Err(SiteworkError::validation(format!(
                "{} holds project {}, not {}",
                self.path.display(),
                file.project_id,
                unit.project_id
            )));
        }
        if file.units.iter().any(|u| u.id == unit.id) {
            return Err(SiteworkError::validation(format!(
                "unit {} already exists",
                unit.id
            )));
        }
        let mut next = file.clone();
        next.units.push(unit.clone());
        next.write_to(&self.path)?;
        *file = next;
        Ok(())
    }

    async fn remove_unit(&self, id: &UnitId) -> Result<Vec<UnitId>, SiteworkError> {
        let mut file = self.file.lock().await;
        if !file.units.iter().any(|u| &u.id == id) {
            return Err(SiteworkError::not_found(id.as_str()));
        }
        let mut removed = vec![id.clone()];
        removed.extend(
            file.units
                .iter()
                .filter(|u| u.parent_unit_id.as_ref() == Some(id))
                .map(|u| u.id.clone()),
        );
        let mut next = file.clone();
        next.units.retain(|u| !removed.contains(&u.id));
        next.write_to(&self.path)?;
        *file = next;
        Ok(removed)
    }
}
