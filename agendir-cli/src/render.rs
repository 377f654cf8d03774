//! TUI rendering traits for agendir types.
//!
//! Extension traits that add colored terminal rendering to core types using
//! owo_colors.

use agendir_core::entity::Operation;
use agendir_core::outbox::{DeadItem, OutboxItem};
use chrono::Utc;
use owo_colors::OwoColorize;

use crate::store::Record;

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for Operation {
    fn render(&self) -> String {
        match self {
            Operation::Create => "+".green().to_string(),
            Operation::Update => "~".yellow().to_string(),
            Operation::Delete => "-".red().to_string(),
        }
    }
}

impl Render for Record {
    fn render(&self) -> String {
        let kind = match self {
            Record::Event(_) => "📅",
            Record::Activity(_) => "☑️ ",
        };
        let time = self.date().format("%Y-%m-%d %H:%M").to_string();
        format!(
            "{} {}  {}  {}",
            kind,
            time.dimmed(),
            self.title(),
            self.id().dimmed()
        )
    }
}

impl Render for OutboxItem {
    fn render(&self) -> String {
        format!(
            "{} {} {}  {}",
            Render::render(&self.operation),
            self.entity_kind.label(),
            self.entity_id,
            render_age(self).dimmed()
        )
    }
}

impl Render for DeadItem {
    fn render(&self) -> String {
        format!(
            "{} {} {}  {}",
            "✗".red(),
            self.item.entity_id,
            self.reason.red(),
            render_age(&self.item).dimmed()
        )
    }
}

/// Human rendering of how long an item has been pending.
fn render_age(item: &OutboxItem) -> String {
    let age = item.age(Utc::now());
    if age.num_days() > 0 {
        format!("pending {}d", age.num_days())
    } else if age.num_hours() > 0 {
        format!("pending {}h", age.num_hours())
    } else {
        format!("pending {}m", age.num_minutes().max(0))
    }
}
