//! Desktop notification dispatch.

use agendir_core::notify::Notifier;
use tracing::warn;

/// Sends reminders through the platform notification channel, falling back
/// to the terminal when that fails.
pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    fn notify(&self, title: &str, body: &str) {
        let shown = notify_rust::Notification::new()
            .summary(title)
            .body(body)
            .show();
        if let Err(e) = shown {
            warn!(error = %e, "desktop notification failed, printing instead");
            println!("\n🔔 {}\n   {}", title, body);
        }
    }
}
