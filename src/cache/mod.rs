//! Offline loan cache and synchronization.
//!
//! Loans submitted while disconnected are appended to a single storage slot
//! with `offline: true`. A sync pass later pushes each of them to the remote
//! store, in cache order, and clears the flag only after that record's own
//! write has been accepted.
//!
//! # Guarantees
//!
//! - Reading a slot that was never written yields an empty list.
//! - `cache_loans` replaces the slot; it never merges.
//! - Records with `offline: false` are never sent or modified by a sync pass.
//! - The first remote failure stops the pass. Records accepted before the
//!   failure are marked synced; the rest stay offline for the next pass.
//! - All slot access is serialized through one writer task, and sync passes
//!   are serialized with each other.

mod error;
mod slot;
mod store;
mod writer;

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::connectivity::Connectivity;
use crate::identity::Session;
use crate::models::{LoanInput, LoanRecord};
use crate::remote::{NewLoanDocument, RemoteLoanStore};

pub use error::CacheError;
pub use slot::{LoanSlot, LOANS_CACHE_KEY};
pub use store::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use writer::{SyncedMark, WriterHandle};

/// Outcome of one sync pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Unsynced records found at the start of the pass.
    pub pending: usize,
    /// Records accepted by the remote store during the pass.
    pub synced: usize,
    /// False when the pass was skipped because the device is offline.
    pub ran: bool,
}

impl SyncReport {
    pub fn remaining(&self) -> usize {
        self.pending - self.synced
    }
}

/// Local loan cache with offline submission and remote synchronization.
#[derive(Clone)]
pub struct OfflineLoanCache {
    writer: WriterHandle,
    sync_lock: Arc<Mutex<()>>,
}

impl OfflineLoanCache {
    /// Opens the cache over `store`, spawning its writer task on the current
    /// tokio runtime.
    pub fn new<S: KeyValueStore>(store: S) -> Self {
        Self::with_slot(LoanSlot::new(store))
    }

    pub fn with_slot<S: KeyValueStore>(slot: LoanSlot<S>) -> Self {
        Self {
            writer: WriterHandle::spawn(slot),
            sync_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Overwrites the cached list with `loans`.
    pub async fn cache_loans(&self, loans: Vec<LoanRecord>) -> Result<(), CacheError> {
        self.writer.replace(loans).await
    }

    /// Returns the cached list, or an empty list if nothing was ever cached.
    pub async fn get_cached_loans(&self) -> Result<Vec<LoanRecord>, CacheError> {
        self.writer.load().await
    }

    /// Appends a pending record without contacting the remote store.
    ///
    /// The input is stored as given; callers validate it beforehand.
    pub async fn add_loan_offline(&self, input: &LoanInput) -> Result<(), CacheError> {
        let record = LoanRecord::new_offline(input);
        tracing::info!(
            local_id = ?record.local_id,
            amount = record.amount,
            "loan saved offline"
        );
        self.writer.append(record).await
    }

    /// Pushes every unsynced record to the remote store.
    ///
    /// Each record is sent as a new document owned by `session`'s user, with
    /// a server-assigned creation time. Nothing happens while `connectivity`
    /// is offline.
    pub async fn sync_loans<R>(
        &self,
        session: &Session,
        connectivity: Connectivity,
        remote: &R,
    ) -> Result<SyncReport, CacheError>
    where
        R: RemoteLoanStore + ?Sized,
    {
        if !connectivity.is_online() {
            tracing::debug!("offline, skipping loan sync");
            return Ok(SyncReport::default());
        }

        let _guard = self.sync_lock.lock().await;
        let unsynced = self.writer.claim_unsynced().await?;
        let mut report = SyncReport {
            pending: unsynced.len(),
            synced: 0,
            ran: true,
        };
        if unsynced.is_empty() {
            return Ok(report);
        }

        let mut marks = Vec::with_capacity(unsynced.len());
        let mut failure = None;

        for loan in &unsynced {
            let Some(local_id) = loan.local_id else {
                continue;
            };
            let doc = NewLoanDocument::from_record(loan, session.user_id());
            match remote.add_loan(&doc).await {
                Ok(remote_id) => marks.push(SyncedMark {
                    local_id,
                    remote_id,
                }),
                Err(e) => {
                    tracing::warn!(%local_id, error = %e, "loan sync halted");
                    failure = Some(e);
                    break;
                }
            }
        }

        if !marks.is_empty() {
            let accepted = marks.len();
            match self.writer.mark_synced(marks).await {
                Ok(changed) => report.synced = changed,
                Err(e) => {
                    match &failure {
                        Some(remote_error) => tracing::error!(
                            accepted,
                            error = %e,
                            %remote_error,
                            "loan sync halted and accepted loans could not be marked synced"
                        ),
                        None => tracing::error!(
                            accepted,
                            error = %e,
                            "accepted loans could not be marked synced"
                        ),
                    }
                    return Err(e);
                }
            }
        }

        tracing::info!(
            synced = report.synced,
            remaining = report.remaining(),
            "loan sync pass finished"
        );

        match failure {
            Some(e) => Err(CacheError::Remote(e)),
            None => Ok(report),
        }
    }
}
