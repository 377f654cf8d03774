//! Create a new event or activity.

use agendir_core::entity::{Activity, Event, Operation, Priority};
use anyhow::{Result, bail};
use uuid::Uuid;

use super::{App, parse_datetime};
use crate::render::Render;
use crate::store::{self, Record};

#[allow(clippy::too_many_arguments)]
pub async fn run(
    app: &App,
    title: String,
    date: String,
    activity: bool,
    description: Option<String>,
    location: Option<String>,
    reminder: Option<i64>,
    no_notify: bool,
    category: Option<String>,
    priority: Option<String>,
) -> Result<()> {
    let date = parse_datetime(&date)?;
    let id = Uuid::new_v4().to_string();

    let record = if activity {
        Record::Activity(Activity {
            id,
            owner: whoami(),
            title,
            description,
            date,
            location,
            category,
            completed: false,
            priority: parse_priority(priority.as_deref())?,
        })
    } else {
        Record::Event(Event {
            id,
            title,
            description,
            date,
            location,
            notifications_enabled: !no_notify,
            reminder_minutes: reminder.unwrap_or(app.config.default_reminder_minutes),
        })
    };

    let created = store::create(&app.config.records_dir(), &record)?;
    app.engine
        .on_mutation(&record.to_mutation(Operation::Create)?)?;

    println!("Created {}", created.record.render());
    super::sync::drain_and_report(app).await
}

fn parse_priority(s: Option<&str>) -> Result<Priority> {
    match s {
        None | Some("medium") => Ok(Priority::Medium),
        Some("low") => Ok(Priority::Low),
        Some("high") => Ok(Priority::High),
        Some(other) => bail!("Unknown priority '{other}' (expected low, medium or high)"),
    }
}

fn whoami() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "local".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_parsing() {
        assert_eq!(parse_priority(None).unwrap(), Priority::Medium);
        assert_eq!(parse_priority(Some("low")).unwrap(), Priority::Low);
        assert_eq!(parse_priority(Some("high")).unwrap(), Priority::High);
        assert!(parse_priority(Some("urgent")).is_err());
    }
}
