//! Handlers for `sitework move` and `sitework resize`.

use std::path::Path;

use chrono::NaiveDate;
use miette::Result;
use sitework_core::unit::UnitId;
use sitework_ops::ops_dates::DateEdit;

pub async fn exec_move(file: &Path, id: &str, start: NaiveDate, json: bool) -> Result<()> {
    let (engine, _) = super::open_project(file).await?;
    let outcome = engine
        .update_unit_dates(&UnitId::from(id), DateEdit::move_to(start))
        .await?;
    super::report(&outcome, json)
}

pub async fn exec_resize(
    file: &Path,
    id: &str,
    duration: Option<u32>,
    buffer: Option<u32>,
    end: Option<NaiveDate>,
    json: bool,
) -> Result<()> {
    let (engine, _) = super::open_project(file).await?;
    let edit = DateEdit {
        start: None,
        duration_days: duration,
        buffer_days: buffer,
        end,
    };
    let outcome = engine.update_unit_dates(&UnitId::from(id), edit).await?;
    super::report(&outcome, json)
}
