mod commands;
mod config;
mod notifier;
mod remote;
mod render;
mod store;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::App;
use config::GlobalConfig;

#[derive(Parser)]
#[command(name = "agendir")]
#[command(about = "Offline-first agenda: local events and activities with outbox sync")]
struct Cli {
    /// Override the data directory
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an event (default) or activity
    New {
        title: String,

        /// Start date/time (e.g., "2026-03-20T15:00")
        #[arg(short, long)]
        date: String,

        /// Create an activity instead of an event
        #[arg(long)]
        activity: bool,

        #[arg(long)]
        description: Option<String>,

        #[arg(short, long)]
        location: Option<String>,

        /// Reminder lead time in minutes (events only)
        #[arg(short, long)]
        reminder: Option<i64>,

        /// Do not arm a reminder for this event
        #[arg(long)]
        no_notify: bool,

        /// Activity category, e.g. work, personal, social
        #[arg(long)]
        category: Option<String>,

        /// Activity priority: low, medium or high
        #[arg(long)]
        priority: Option<String>,
    },
    /// Edit a record by id
    Update {
        id: String,

        #[arg(short, long)]
        title: Option<String>,

        /// New start date/time
        #[arg(short, long)]
        date: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(short, long)]
        location: Option<String>,

        /// Reminder lead time in minutes (events only)
        #[arg(short, long)]
        reminder: Option<i64>,

        /// Enable or disable the reminder (events only)
        #[arg(long)]
        notify: Option<bool>,

        /// Mark an activity done / not done
        #[arg(long)]
        completed: Option<bool>,
    },
    /// Delete a record by id
    Delete { id: String },
    /// List local events and activities
    List,
    /// Show connectivity and pending sync state
    Status,
    /// Drain the outbox to the remote store
    Sync,
    /// Mark the connection as available and drain
    Online,
    /// Mark the connection as unavailable
    Offline,
    /// Arm reminders from stored records and wait for them to fire
    Remind,
    /// Drop all pending sync items and cancel reminders
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = GlobalConfig::load()?;
    if let Some(dir) = cli.dir {
        config.remote_dir = dir.join("remote");
        config.data_dir = dir;
    }
    let app = App::load(config)?;

    match cli.command {
        Commands::New {
            title,
            date,
            activity,
            description,
            location,
            reminder,
            no_notify,
            category,
            priority,
        } => {
            commands::new::run(
                &app, title, date, activity, description, location, reminder, no_notify, category,
                priority,
            )
            .await
        }
        Commands::Update {
            id,
            title,
            date,
            description,
            location,
            reminder,
            notify,
            completed,
        } => {
            commands::update::run(
                &app, id, title, date, description, location, reminder, notify, completed,
            )
            .await
        }
        Commands::Delete { id } => commands::delete::run(&app, id).await,
        Commands::List => commands::list::run(&app).await,
        Commands::Status => commands::status::run(&app).await,
        Commands::Sync => commands::sync::run(&app).await,
        Commands::Online => commands::network::run(&app, true).await,
        Commands::Offline => commands::network::run(&app, false).await,
        Commands::Remind => commands::remind::run(&app).await,
        Commands::Clear => commands::clear::run(&app).await,
    }
}
