//! Update an existing event or activity.

use agendir_core::entity::Operation;
use anyhow::{Result, bail};

use super::{App, parse_datetime};
use crate::render::Render;
use crate::store::{self, Record};

#[allow(clippy::too_many_arguments)]
pub async fn run(
    app: &App,
    id: String,
    title: Option<String>,
    date: Option<String>,
    description: Option<String>,
    location: Option<String>,
    reminder: Option<i64>,
    notify: Option<bool>,
    completed: Option<bool>,
) -> Result<()> {
    let records_dir = app.config.records_dir();
    let records = store::list(&records_dir)?;
    let Some(existing) = records.get(&id) else {
        bail!("No record with id '{id}'");
    };

    let mut record = existing.record.clone();
    match &mut record {
        Record::Event(event) => {
            if let Some(title) = title {
                event.title = title;
            }
            if let Some(date) = &date {
                event.date = parse_datetime(date)?;
            }
            if description.is_some() {
                event.description = description;
            }
            if location.is_some() {
                event.location = location;
            }
            if let Some(reminder) = reminder {
                event.reminder_minutes = reminder;
            }
            if let Some(notify) = notify {
                event.notifications_enabled = notify;
            }
            if completed.is_some() {
                bail!("--completed only applies to activities");
            }
        }
        Record::Activity(activity) => {
            if let Some(title) = title {
                activity.title = title;
            }
            if let Some(date) = &date {
                activity.date = parse_datetime(date)?;
            }
            if description.is_some() {
                activity.description = description;
            }
            if location.is_some() {
                activity.location = location;
            }
            if let Some(completed) = completed {
                activity.completed = completed;
            }
            if reminder.is_some() || notify.is_some() {
                bail!("--reminder/--notify only apply to events");
            }
        }
    }

    let updated = store::update(&records_dir, existing, &record)?;
    app.engine
        .on_mutation(&record.to_mutation(Operation::Update)?)?;

    println!("Updated {}", updated.record.render());
    super::sync::drain_and_report(app).await
}
