//! Flip the persisted connectivity flag.
//!
//! Connectivity is a marker file: present means offline. Long-running
//! commands in other processes pick the flag up on their next start; within
//! this process the monitor is updated directly so a drain can follow.

use anyhow::{Context, Result};
use owo_colors::OwoColorize;

use super::App;

pub async fn run(app: &App, online: bool) -> Result<()> {
    let marker = app.config.offline_marker();
    if online {
        match std::fs::remove_file(&marker) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to remove {}", marker.display()));
            }
        }
    } else {
        if let Some(parent) = marker.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&marker, b"")
            .with_context(|| format!("Failed to write {}", marker.display()))?;
    }

    app.engine.connectivity().set_online(online);
    if online {
        println!("{}", "● online".green());
        // Reconnecting kicks off a drain attempt right away.
        super::sync::drain_and_report(app).await?;
    } else {
        println!("{}", "● offline — mutations will queue locally".red());
    }
    Ok(())
}
