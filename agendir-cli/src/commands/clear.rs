//! Reset the outbox and cancel all reminders.

use anyhow::Result;
use owo_colors::OwoColorize;

use super::App;

pub async fn run(app: &App) -> Result<()> {
    let pending = app.engine.queue().len();
    let dead = app.engine.queue().dead_items().len();
    app.engine.queue().clear()?;
    app.engine.scheduler().cancel_all();

    println!(
        "{}",
        format!("Cleared {pending} pending and {dead} dead item(s); reminders cancelled").yellow()
    );
    Ok(())
}
