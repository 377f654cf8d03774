//! Process-wide connectivity state.
//!
//! A pure observer: it reports online/offline and publishes transitions, but
//! never touches entities or the queue. The drainer receives it as an
//! explicit dependency and reacts to offline→online edges.

use tokio::sync::watch;
use tracing::info;

/// Shared online/offline flag with subscribe semantics.
pub struct ConnectivityMonitor {
    tx: watch::Sender<bool>,
}

impl ConnectivityMonitor {
    pub fn new(initially_online: bool) -> Self {
        let (tx, _rx) = watch::channel(initially_online);
        ConnectivityMonitor { tx }
    }

    pub fn is_online(&self) -> bool {
        *self.tx.borrow()
    }

    /// Record a connectivity transition. Setting the current value again is
    /// a no-op and does not wake subscribers.
    pub fn set_online(&self, online: bool) {
        let changed = self.tx.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        });
        if changed {
            info!(online, "connectivity changed");
        }
    }

    /// Subscribe to transitions. The receiver sees the current value plus
    /// every change after this call.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}
