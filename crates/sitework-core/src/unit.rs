//! The schedulable unit: one type for phases and tasks.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use sitework_util::errors::SiteworkError;

use crate::dates;

/// Stable identifier of a phase or task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(String);

impl UnitId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// A fresh random identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UnitId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for UnitId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Identifier of the project that owns a set of units.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProjectId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Work status of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
    Delayed,
    Blocked,
}

impl UnitStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Delayed => "delayed",
            Self::Blocked => "blocked",
        }
    }
}

impl fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnitStatus {
    type Err = SiteworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.replace('-', "_").as_str() {
            "not_started" => Ok(Self::NotStarted),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "delayed" => Ok(Self::Delayed),
            "blocked" => Ok(Self::Blocked),
            other => Err(SiteworkError::validation(format!(
                "unknown status '{other}': expected one of not_started, in_progress, completed, delayed, blocked"
            ))),
        }
    }
}

/// The set of siblings a unit is ordered among and may depend on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SiblingScope {
    /// Top-level phases of a project.
    Phases,
    /// Tasks nested under the given phase.
    TasksOf(UnitId),
}

impl fmt::Display for SiblingScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Phases => write!(f, "phases"),
            Self::TasksOf(parent) => write!(f, "tasks of {parent}"),
        }
    }
}

/// A phase (top-level) or a task (nested under a phase).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleUnit {
    pub id: UnitId,
    pub project_id: ProjectId,
    pub name: String,
    #[serde(default)]
    pub parent_unit_id: Option<UnitId>,
    #[serde(default)]
    pub is_task: bool,
    pub sequence_order: u32,
    #[serde(default)]
    pub predecessor_unit_id: Option<UnitId>,
    pub planned_start_date: NaiveDate,
    pub planned_duration_days: u32,
    #[serde(default)]
    pub buffer_days: u32,
    pub planned_end_date: NaiveDate,
    #[serde(default)]
    pub progress_percent: u8,
    #[serde(default)]
    pub status: UnitStatus,
    #[serde(default)]
    pub actual_start_date: Option<NaiveDate>,
    #[serde(default)]
    pub actual_end_date: Option<NaiveDate>,
}

impl ScheduleUnit {
    /// Build a top-level phase with its end date derived from the duration.
    pub fn phase(
        id: impl Into<UnitId>,
        project_id: &ProjectId,
        name: &str,
        sequence_order: u32,
        start: NaiveDate,
        duration_days: u32,
    ) -> Result<Self, SiteworkError> {
        Ok(Self {
            id: id.into(),
            project_id: project_id.clone(),
            name: name.to_string(),
            parent_unit_id: None,
            is_task: false,
            sequence_order,
            predecessor_unit_id: None,
            planned_start_date: start,
            planned_duration_days: duration_days,
            buffer_days: 0,
            planned_end_date: dates::end_date(start, duration_days, 0)?,
            progress_percent: 0,
            status: UnitStatus::NotStarted,
            actual_start_date: None,
            actual_end_date: None,
        })
    }

    /// Build a task nested under `parent`.
    pub fn task(
        id: impl Into<UnitId>,
        parent: &ScheduleUnit,
        name: &str,
        sequence_order: u32,
        start: NaiveDate,
        duration_days: u32,
    ) -> Result<Self, SiteworkError> {
        let mut unit = Self::phase(
            id,
            &parent.project_id,
            name,
            sequence_order,
            start,
            duration_days,
        )?;
        unit.parent_unit_id = Some(parent.id.clone());
        unit.is_task = true;
        Ok(unit)
    }

    pub fn with_predecessor(mut self, predecessor: &UnitId) -> Self {
        self.predecessor_unit_id = Some(predecessor.clone());
        self
    }

    pub fn with_buffer(mut self, buffer_days: u32) -> Result<Self, SiteworkError> {
        self.buffer_days = buffer_days;
        self.planned_end_date = self.computed_end_date()?;
        Ok(self)
    }

    pub fn is_phase(&self) -> bool {
        !self.is_task
    }

    pub fn scope(&self) -> SiblingScope {
        match &self.parent_unit_id {
            Some(parent) if self.is_task => SiblingScope::TasksOf(parent.clone()),
            _ => SiblingScope::Phases,
        }
    }

    /// End date implied by start, duration and buffer.
    pub fn computed_end_date(&self) -> Result<NaiveDate, SiteworkError> {
        dates::end_date(
            self.planned_start_date,
            self.planned_duration_days,
            self.buffer_days,
        )
    }

    /// Move the start and re-derive the end from the existing duration and buffer.
    pub fn reschedule(&mut self, start: NaiveDate) -> Result<(), SiteworkError> {
        self.planned_start_date = start;
        self.planned_end_date = self.computed_end_date()?;
        Ok(())
    }

    /// Shift both edges by `delta_days` without changing the span.
    pub fn shift_by(&mut self, delta_days: i64) -> Result<(), SiteworkError> {
        self.planned_start_date = dates::shift(self.planned_start_date, delta_days)?;
        self.planned_end_date = dates::shift(self.planned_end_date, delta_days)?;
        Ok(())
    }
}

/// A partial update to a stored unit. Unset fields are left untouched; a
/// clearable field set to `Some(None)` is written as `null` and clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planned_start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planned_duration_days: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buffer_days: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planned_end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_order: Option<u32>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present"
    )]
    pub predecessor_unit_id: Option<Option<UnitId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress_percent: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<UnitStatus>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present"
    )]
    pub actual_start_date: Option<Option<NaiveDate>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present"
    )]
    pub actual_end_date: Option<Option<NaiveDate>>,
}

/// A field that is present, even as `null`, deserializes to `Some`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl UnitPatch {
    /// The fields that differ between `before` and `after` (identity fields
    /// are immutable and never diffed).
    pub fn between(before: &ScheduleUnit, after: &ScheduleUnit) -> Self {
        fn changed<T: PartialEq + Clone>(a: &T, b: &T) -> Option<T> {
            if a == b {
                None
            } else {
                Some(b.clone())
            }
        }
        Self {
            planned_start_date: changed(&before.planned_start_date, &after.planned_start_date),
            planned_duration_days: changed(
                &before.planned_duration_days,
                &after.planned_duration_days,
            ),
            buffer_days: changed(&before.buffer_days, &after.buffer_days),
            planned_end_date: changed(&before.planned_end_date, &after.planned_end_date),
            sequence_order: changed(&before.sequence_order, &after.sequence_order),
            predecessor_unit_id: changed(
                &before.predecessor_unit_id,
                &after.predecessor_unit_id,
            ),
            progress_percent: changed(&before.progress_percent, &after.progress_percent),
            status: changed(&before.status, &after.status),
            actual_start_date: changed(&before.actual_start_date, &after.actual_start_date),
            actual_end_date: changed(&before.actual_end_date, &after.actual_end_date),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply_to(&self, unit: &mut ScheduleUnit) {
        if let Some(v) = self.planned_start_date {
            unit.planned_start_date = v;
        }
        if let Some(v) = self.planned_duration_days {
            unit.planned_duration_days = v;
        }
        if let Some(v) = self.buffer_days {
            unit.buffer_days = v;
        }
        if let Some(v) = self.planned_end_date {
            unit.planned_end_date = v;
        }
        if let Some(v) = self.sequence_order {
            unit.sequence_order = v;
        }
        if let Some(ref v) = self.predecessor_unit_id {
            unit.predecessor_unit_id = v.clone();
        }
        if let Some(v) = self.progress_percent {
            unit.progress_percent = v;
        }
        if let Some(v) = self.status {
            unit.status = v;
        }
        if let Some(v) = self.actual_start_date {
            unit.actual_start_date = v;
        }
        if let Some(v) = self.actual_end_date {
            unit.actual_end_date = v;
        }
    }
}
