//! In-memory [`UnitStore`], with write logging and failure injection.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use sitework_core::unit::{ProjectId, ScheduleUnit, UnitId, UnitPatch};
use sitework_util::errors::SiteworkError;
use tokio::sync::RwLock;

use crate::store::UnitStore;

#[derive(Debug, Default)]
pub struct MemoryStore {
    units: RwLock<BTreeMap<UnitId, ScheduleUnit>>,
    failing: Mutex<HashSet<UnitId>>,
    writes: Mutex<Vec<UnitId>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_units(units: impl IntoIterator<Item = ScheduleUnit>) -> Self {
        Self {
            units: RwLock::new(units.into_iter().map(|u| (u.id.clone(), u)).collect()),
            ..Default::default()
        }
    }

    /// Make every later write to `id` fail: updates, inserts and removals.
    pub fn fail_writes_for(&self, id: &UnitId) {
        self.failing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.clone());
    }

    pub fn clear_failures(&self) {
        self.failing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// IDs of every successful `persist_unit_update`, in order.
    pub fn write_log(&self) -> Vec<UnitId> {
        self.writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub async fn get(&self, id: &UnitId) -> Option<ScheduleUnit> {
        self.units.read().await.get(id).cloned()
    }

    fn check_writable(&self, id: &UnitId) -> Result<(), SiteworkError> {
        let failing = self
            .failing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(id);
        if failing {
            return Err(SiteworkError::Io(std::io::Error::other(format!(
                "write to {id} rejected"
            ))));
        }
        Ok(())
    }
}

#[async_trait]
impl UnitStore for MemoryStore {
    async fn fetch_units_by_project(
        &self,
        project: &ProjectId,
    ) -> Result<Vec<ScheduleUnit>, SiteworkError> {
        Ok(self
            .units
            .read()
            .await
            .values()
            .filter(|u| &u.project_id == project)
            .cloned()
            .collect())
    }

    async fn fetch_unit(&self, id: &UnitId) -> Result<ScheduleUnit, SiteworkError> {
        self.get(id)
            .await
            .ok_or_else(|| SiteworkError::not_found(id.as_str()))
    }

    async fn persist_unit_update(
        &self,
        id: &UnitId,
        patch: &UnitPatch,
    ) -> Result<(), SiteworkError> {
        self.check_writable(id)?;
        let mut units = self.units.write().await;
        let unit = units
            .get_mut(id)
            .ok_or_else(|| SiteworkError::not_found(id.as_str()))?;
        patch.apply_to(unit);
        self.writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(id.clone());
        Ok(())
    }

    async fn insert_unit(&self, unit: &ScheduleUnit) -> Result<(), SiteworkError> {
        self.check_writable(&unit.id)?;
        let mut units = self.units.write().await;
        if units.contains_key(&unit.id) {
            return Err(SiteworkError::validation(format!(
                "unit {} already exists",
                unit.id
            )));
        }
        units.insert(unit.id.clone(), unit.clone());
        Ok(())
    }

    async fn remove_unit(&self, id: &UnitId) -> Result<Vec<UnitId>, SiteworkError> {
        self.check_writable(id)?;
        let mut units = self.units.write().await;
        if units.remove(id).is_none() {
            return Err(SiteworkError::not_found(id.as_str()));
        }
        let children: Vec<UnitId> = units
            .values()
            .filter(|u| u.parent_unit_id.as_ref() == Some(id))
            .map(|u| u.id.clone())
            .collect();
        for child in &children {
            units.remove(child);
        }
        let mut removed = vec![id.clone()];
        removed.extend(children);
        Ok(removed)
    }
}
