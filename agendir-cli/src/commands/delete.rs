//! Delete an event or activity.

use agendir_core::entity::Operation;
use anyhow::{Result, bail};

use super::App;
use crate::render::Render;
use crate::store;

pub async fn run(app: &App, id: String) -> Result<()> {
    let records = store::list(&app.config.records_dir())?;
    let Some(existing) = records.get(&id) else {
        bail!("No record with id '{id}'");
    };

    store::delete(existing)?;
    app.engine
        .on_mutation(&existing.record.to_mutation(Operation::Delete)?)?;

    println!("Deleted {}", existing.record.render());
    super::sync::drain_and_report(app).await
}
