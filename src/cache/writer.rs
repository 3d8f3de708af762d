//! Single-writer task that owns the loan slot.
//!
//! Every read and mutation of the slot is queued on one channel and applied
//! in order by one task, so read-modify-write sequences never interleave.
//! Sync passes report their results as [`SyncedMark`]s which are applied to
//! whatever the slot holds at that moment, not to the snapshot the pass
//! started from.

use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use super::error::CacheError;
use super::slot::LoanSlot;
use super::store::{KeyValueStore, StorageError};
use crate::models::LoanRecord;

const QUEUE_DEPTH: usize = 64;

type Reply<T> = oneshot::Sender<Result<T, StorageError>>;

enum Command {
    Load {
        reply: Reply<Vec<LoanRecord>>,
    },
    Replace {
        loans: Vec<LoanRecord>,
        reply: Reply<()>,
    },
    Append {
        loan: LoanRecord,
        reply: Reply<()>,
    },
    ClaimUnsynced {
        reply: Reply<Vec<LoanRecord>>,
    },
    MarkSynced {
        marks: Vec<SyncedMark>,
        reply: Reply<usize>,
    },
}

/// A record the remote store has accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncedMark {
    pub local_id: Uuid,
    pub remote_id: String,
}

/// Cloneable handle for sending commands to the writer task.
#[derive(Clone)]
pub struct WriterHandle {
    tx: mpsc::Sender<Command>,
}

impl WriterHandle {
    /// Spawns the writer task on the current tokio runtime.
    ///
    /// The task exits once every handle has been dropped.
    pub fn spawn<S: KeyValueStore>(slot: LoanSlot<S>) -> Self {
        let (tx, rx) = mpsc::channel(QUEUE_DEPTH);
        tokio::spawn(run(slot, rx));
        Self { tx }
    }

    pub async fn load(&self) -> Result<Vec<LoanRecord>, CacheError> {
        self.request(|reply| Command::Load { reply }).await
    }

    pub async fn replace(&self, loans: Vec<LoanRecord>) -> Result<(), CacheError> {
        self.request(|reply| Command::Replace { loans, reply }).await
    }

    pub async fn append(&self, loan: LoanRecord) -> Result<(), CacheError> {
        self.request(|reply| Command::Append { loan, reply }).await
    }

    /// Returns the unsynced records in cache order, first giving a local id
    /// to any that lack one so the results of the pass can be matched back.
    pub async fn claim_unsynced(&self) -> Result<Vec<LoanRecord>, CacheError> {
        self.request(|reply| Command::ClaimUnsynced { reply }).await
    }

    /// Clears `offline` on the marked records. Returns how many changed.
    pub async fn mark_synced(&self, marks: Vec<SyncedMark>) -> Result<usize, CacheError> {
        self.request(|reply| Command::MarkSynced { marks, reply }).await
    }

    async fn request<T>(&self, build: impl FnOnce(Reply<T>) -> Command) -> Result<T, CacheError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(build(reply))
            .await
            .map_err(|_| CacheError::WriterClosed)?;
        let result = rx.await.map_err(|_| CacheError::WriterClosed)?;
        Ok(result?)
    }
}

async fn run<S: KeyValueStore>(slot: LoanSlot<S>, mut rx: mpsc::Receiver<Command>) {
    while let Some(command) = rx.recv().await {
        match command {
            Command::Load { reply } => {
                let _ = reply.send(slot.load().await);
            }
            Command::Replace { loans, reply } => {
                let _ = reply.send(slot.save(&loans).await);
            }
            Command::Append { loan, reply } => {
                let _ = reply.send(append(&slot, loan).await);
            }
            Command::ClaimUnsynced { reply } => {
                let _ = reply.send(claim_unsynced(&slot).await);
            }
            Command::MarkSynced { marks, reply } => {
                let _ = reply.send(mark_synced(&slot, &marks).await);
            }
        }
    }
    tracing::debug!("loan cache writer stopped");
}

async fn append<S: KeyValueStore>(slot: &LoanSlot<S>, loan: LoanRecord) -> Result<(), StorageError> {
    let mut loans = slot.load().await?;
    loans.push(loan);
    slot.save(&loans).await
}

async fn claim_unsynced<S: KeyValueStore>(
    slot: &LoanSlot<S>,
) -> Result<Vec<LoanRecord>, StorageError> {
    let mut loans = slot.load().await?;
    let mut assigned = false;

    for loan in loans.iter_mut().filter(|l| l.offline && l.local_id.is_none()) {
        loan.local_id = Some(Uuid::new_v4());
        assigned = true;
    }
    if assigned {
        slot.save(&loans).await?;
    }

    Ok(loans.into_iter().filter(LoanRecord::is_unsynced).collect())
}

async fn mark_synced<S: KeyValueStore>(
    slot: &LoanSlot<S>,
    marks: &[SyncedMark],
) -> Result<usize, StorageError> {
    let mut loans = slot.load().await?;
    let mut changed = 0;

    for mark in marks {
        let target = loans
            .iter_mut()
            .find(|l| l.offline && l.local_id == Some(mark.local_id));
        if let Some(loan) = target {
            loan.offline = false;
            loan.id = Some(mark.remote_id.clone());
            changed += 1;
        }
    }
    if changed > 0 {
        slot.save(&loans).await?;
    }

    Ok(changed)
}
