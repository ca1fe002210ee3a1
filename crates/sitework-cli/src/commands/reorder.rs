//! Handler for `sitework reorder`.

use std::path::Path;

use miette::Result;
use sitework_core::unit::{SiblingScope, UnitId};

pub async fn exec(file: &Path, parent: Option<String>, ids: &[String], json: bool) -> Result<()> {
    let (engine, project) = super::open_project(file).await?;
    let scope = match parent {
        Some(parent) => SiblingScope::TasksOf(UnitId::from(parent)),
        None => SiblingScope::Phases,
    };
    let ordered: Vec<UnitId> = ids.iter().map(|s| UnitId::from(s.as_str())).collect();
    let outcome = engine.reorder_siblings(&project, &scope, &ordered).await?;
    super::report(&outcome, json)
}
