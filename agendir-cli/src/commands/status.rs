//! Show connectivity, pending sync items and dead letters.

use anyhow::Result;
use owo_colors::OwoColorize;

use super::App;
use crate::render::Render;

pub async fn run(app: &App) -> Result<()> {
    if app.is_online() {
        println!("{}", "● online".green());
    } else {
        println!("{}", "● offline".red());
    }

    let queue = app.engine.queue();
    let pending = queue.peek_all();
    if pending.is_empty() {
        println!("Outbox empty — everything synced");
    } else {
        println!("\n{} item(s) pending sync:", pending.len());
        for item in &pending {
            println!("   {}", item.render());
        }
    }

    let dead = queue.dead_items();
    if !dead.is_empty() {
        println!("\n{}", format!("{} item(s) gave up syncing:", dead.len()).red());
        for item in &dead {
            println!("   {}", item.render());
        }
    }

    Ok(())
}
