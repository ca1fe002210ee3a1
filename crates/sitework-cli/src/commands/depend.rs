//! Handler for `sitework depend`.

use std::path::Path;

use miette::Result;
use sitework_core::unit::UnitId;

pub async fn exec(file: &Path, id: &str, on: Option<String>, json: bool) -> Result<()> {
    let (engine, _) = super::open_project(file).await?;
    let outcome = engine
        .reassign_predecessor(&UnitId::from(id), on.map(UnitId::from))
        .await?;
    super::report(&outcome, json)
}
