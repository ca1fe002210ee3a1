//! Handler for `sitework status`.

use std::path::Path;

use chrono::NaiveDate;
use miette::Result;
use sitework_core::unit::{UnitId, UnitStatus};
use sitework_ops::ops_status::ActualDates;

pub async fn exec(
    file: &Path,
    id: &str,
    status: UnitStatus,
    started: Option<NaiveDate>,
    finished: Option<NaiveDate>,
    json: bool,
) -> Result<()> {
    let (engine, _) = super::open_project(file).await?;
    let outcome = engine
        .set_status(&UnitId::from(id), status, ActualDates { started, finished })
        .await?;
    super::report(&outcome, json)
}
