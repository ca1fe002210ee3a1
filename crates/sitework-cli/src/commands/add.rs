//! Handler for `sitework add`.

use std::path::Path;

use chrono::NaiveDate;
use miette::Result;
use sitework_core::unit::UnitId;
use sitework_ops::ops_create::NewUnit;

pub struct AddArgs {
    pub name: String,
    pub start: NaiveDate,
    pub duration: u32,
    pub buffer: u32,
    pub parent: Option<String>,
    pub after: Option<String>,
    pub order: Option<u32>,
    pub id: Option<String>,
}

pub async fn exec(file: &Path, args: AddArgs, json: bool) -> Result<()> {
    let (engine, project) = super::open_project(file).await?;

    let mut new = NewUnit::new(&project, args.name, args.start, args.duration)
        .with_buffer(args.buffer);
    new.id = args.id.map(UnitId::from);
    new.parent = args.parent.map(UnitId::from);
    new.predecessor = args.after.map(UnitId::from);
    new.sequence_order = args.order;

    let outcome = engine.create_unit(new).await?;
    super::report(&outcome, json)
}
