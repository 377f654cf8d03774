//! List local records.

use anyhow::Result;

use super::App;
use crate::render::Render;
use crate::store;

pub async fn run(app: &App) -> Result<()> {
    let records = store::list(&app.config.records_dir())?;
    if records.is_empty() {
        println!("No records yet. Try `agendir new`.");
        return Ok(());
    }

    let mut records: Vec<_> = records.into_values().collect();
    records.sort_by_key(|r| r.record.date());
    for local in &records {
        println!("{}", local.record.render());
    }
    Ok(())
}
