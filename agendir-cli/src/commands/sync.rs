//! Drain the outbox against the remote store.

use agendir_core::sync::DrainOutcome;
use anyhow::Result;
use owo_colors::OwoColorize;

use super::App;

pub async fn run(app: &App) -> Result<()> {
    if !app.is_online() {
        println!("{}", "Offline — sync paused. Run `agendir online` first.".yellow());
        return Ok(());
    }
    drain_and_report(app).await
}

/// One drain pass with a human summary. Shared with the mutating commands,
/// which sync opportunistically after enqueueing.
pub(crate) async fn drain_and_report(app: &App) -> Result<()> {
    if !app.is_online() {
        let pending = app.engine.queue().len();
        println!("{}", format!("Offline — {pending} item(s) queued for later sync").yellow());
        return Ok(());
    }

    let report = app.engine.drainer().drain().await?;
    match report.outcome {
        DrainOutcome::Drained => {
            if report.applied > 0 {
                println!("{}", format!("Synced {} item(s)", report.applied).green());
            } else {
                println!("Nothing to sync");
            }
        }
        DrainOutcome::Stalled => {
            println!(
                "{}",
                format!(
                    "Synced {} item(s), then stalled — {} still pending",
                    report.applied,
                    app.engine.queue().len()
                )
                .yellow()
            );
        }
        DrainOutcome::Paused => {
            println!("{}", "Connection lost mid-sync; remaining items kept".yellow());
        }
        DrainOutcome::Offline => {
            println!("{}", "Offline — sync paused".yellow());
        }
        DrainOutcome::AlreadyRunning => {
            println!("A sync is already running");
        }
    }
    if report.dead_lettered > 0 {
        println!(
            "{}",
            format!(
                "{} item(s) moved to the dead-letter list (see `agendir status`)",
                report.dead_lettered
            )
            .red()
        );
    }
    Ok(())
}
