//! Event bridge between backend notifications and the session cache.
//!
//! A [`SessionWatcher`] owns a background task that listens to the
//! backend's account and network streams and refreshes the session on each
//! notification. The task is torn down when the watcher is stopped or
//! dropped, so a UI component that holds the watcher for its lifetime
//! unsubscribes on every exit path.

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use crate::backend::{Account, Network, WalletBackend};
use crate::session::WalletSession;

/// Handle to a running event bridge.
#[derive(Debug)]
pub struct SessionWatcher {
    task: Option<JoinHandle<()>>,
}

impl SessionWatcher {
    /// Subscribe to both backend streams, then spawn the bridge task.
    ///
    /// Subscribing happens before this returns, so no notification sent
    /// afterwards is missed.
    pub(crate) fn spawn<B: WalletBackend>(session: WalletSession<B>) -> Self {
        let accounts = session.backend().watch_account();
        let networks = session.backend().watch_network();
        let task = tokio::spawn(bridge(session, accounts, networks));
        debug!("session watcher started");
        Self { task: Some(task) }
    }

    /// Whether the bridge task is still running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stop the bridge and wait for the task to end.
    ///
    /// Once this returns no further refresh is triggered by this watcher.
    pub async fn stop(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
            debug!("session watcher stopped");
        }
    }
}

impl Drop for SessionWatcher {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Trigger {
    Account,
    Network,
}

/// Outcome of one receive: `Some(trigger)` to refresh, `None` once closed.
fn classify<T>(result: Result<T, RecvError>, trigger: Trigger) -> Option<Trigger> {
    match result {
        Ok(_) => Some(trigger),
        Err(RecvError::Lagged(skipped)) => {
            trace!(?trigger, skipped, "watcher lagged behind");
            Some(trigger)
        }
        Err(RecvError::Closed) => None,
    }
}

async fn bridge<B: WalletBackend>(
    session: WalletSession<B>,
    mut accounts: broadcast::Receiver<Account>,
    mut networks: broadcast::Receiver<Network>,
) {
    let mut accounts_open = true;
    let mut networks_open = true;

    while accounts_open || networks_open {
        let trigger = tokio::select! {
            result = accounts.recv(), if accounts_open => {
                let trigger = classify(result, Trigger::Account);
                accounts_open = trigger.is_some();
                trigger
            }
            result = networks.recv(), if networks_open => {
                let trigger = classify(result, Trigger::Network);
                networks_open = trigger.is_some();
                trigger
            }
        };

        let Some(trigger) = trigger else {
            continue;
        };

        debug!(?trigger, "backend notification received");
        if let Err(e) = session.refresh().await {
            warn!(?trigger, error = %e, "session refresh failed");
        }
    }

    debug!("backend streams closed, session watcher exiting");
}
