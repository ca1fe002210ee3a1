//! Persistence collaborator contract.

use async_trait::async_trait;
use sitework_core::unit::{ProjectId, ScheduleUnit, UnitId, UnitPatch};
use sitework_util::errors::SiteworkError;

/// Read/write access to stored units.
///
/// The engine never issues queries of its own; it computes field values and
/// delegates every write through this trait.
#[async_trait]
pub trait UnitStore: Send + Sync {
    /// Every unit of a project, as one consistent read.
    async fn fetch_units_by_project(
        &self,
        project: &ProjectId,
    ) -> Result<Vec<ScheduleUnit>, SiteworkError>;

    async fn fetch_unit(&self, id: &UnitId) -> Result<ScheduleUnit, SiteworkError>;

    /// Apply a partial update to one unit.
    async fn persist_unit_update(&self, id: &UnitId, patch: &UnitPatch)
        -> Result<(), SiteworkError>;

    async fn insert_unit(&self, unit: &ScheduleUnit) -> Result<(), SiteworkError>;

    /// Remove a unit along with any tasks nested under it. Returns the IDs
    /// removed, the unit itself first.
    async fn remove_unit(&self, id: &UnitId) -> Result<Vec<UnitId>, SiteworkError>;
}
