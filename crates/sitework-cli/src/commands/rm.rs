//! Handler for `sitework rm`.

use std::path::Path;

use miette::Result;
use sitework_core::unit::UnitId;

pub async fn exec(file: &Path, id: &str, json: bool) -> Result<()> {
    let (engine, _) = super::open_project(file).await?;
    let outcome = engine.delete_unit(&UnitId::from(id)).await?;
    super::report(&outcome, json)
}
