//! Runs a sync pass whenever connectivity comes back.

use std::sync::Arc;
use tokio::sync::watch;

use crate::cache::OfflineLoanCache;
use crate::connectivity::Connectivity;
use crate::identity::Session;
use crate::remote::RemoteLoanStore;

/// Follows a connectivity channel and drains the offline cache on every
/// transition to online.
pub struct AutoSync {
    cache: OfflineLoanCache,
    session: Session,
    remote: Arc<dyn RemoteLoanStore>,
}

impl AutoSync {
    pub fn new(cache: OfflineLoanCache, session: Session, remote: Arc<dyn RemoteLoanStore>) -> Self {
        Self {
            cache,
            session,
            remote,
        }
    }

    /// Runs until the sender side of `states` is dropped and returns the
    /// number of sync passes started.
    ///
    /// A channel that is already online when this starts counts as a
    /// transition, so anything cached during a previous run is drained.
    /// Failed passes are logged and left for the next transition.
    pub async fn run(&self, mut states: watch::Receiver<Connectivity>) -> usize {
        let mut passes = 0;
        let mut previous = Connectivity::Offline;

        loop {
            let current = *states.borrow_and_update();
            if current.is_online() && !previous.is_online() {
                passes += 1;
                match self
                    .cache
                    .sync_loans(&self.session, current, self.remote.as_ref())
                    .await
                {
                    Ok(report) => {
                        if report.synced > 0 {
                            tracing::info!(synced = report.synced, "auto-sync drained offline loans");
                        }
                    }
                    Err(e) => tracing::warn!(error = %e, "auto-sync failed"),
                }
            }
            previous = current;

            if states.changed().await.is_err() {
                break;
            }
        }

        passes
    }
}
