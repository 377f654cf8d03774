//! Arm reminder timers from stored records and run until interrupted.
//!
//! Timers are never persisted, so this re-derives them from the record
//! files, then keeps the process alive dispatching desktop notifications.
//! The sync drainer runs alongside, reacting to connectivity changes.

use std::sync::Arc;

use agendir_core::entity::Operation;
use anyhow::Result;
use owo_colors::OwoColorize;

use super::App;
use crate::store;

pub async fn run(app: &App) -> Result<()> {
    let records = store::list(&app.config.records_dir())?;
    let mutations: Vec<_> = records
        .values()
        .filter_map(|local| local.record.to_mutation(Operation::Update).ok())
        .collect();
    app.engine.rearm_reminders(mutations.iter());

    let armed = app.engine.scheduler().armed_count();
    if armed == 0 {
        println!("No upcoming reminders.");
    } else {
        println!("{}", format!("{armed} reminder(s) armed").green());
    }
    println!("Watching — press Ctrl-C to stop");

    let drain_loop = tokio::spawn(Arc::clone(app.engine.drainer()).run());
    if app.is_online() {
        app.engine.drainer().request_drain();
    }

    tokio::signal::ctrl_c().await?;
    drain_loop.abort();
    app.engine.scheduler().cancel_all();
    println!("\nStopped.");
    Ok(())
}
