#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashSet;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{Notify, Semaphore};

use loanapp::cache::{KeyValueStore, MemoryStore, StorageError};
use loanapp::models::LoanRecord;
use loanapp::remote::{NewLoanDocument, RemoteError, RemoteLoanStore};

/// In-process remote store that records accepted documents and can be told
/// to reject specific calls.
#[derive(Default)]
pub struct FakeRemote {
    accepted: Mutex<Vec<(String, NewLoanDocument)>>,
    calls: AtomicUsize,
    failing_calls: Mutex<HashSet<usize>>,
    gate: Option<Gate>,
}

struct Gate {
    entered: Arc<Notify>,
    release: Arc<Semaphore>,
}

impl FakeRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects the given zero-based `add_loan` calls.
    pub fn failing_on(calls: impl IntoIterator<Item = usize>) -> Self {
        let remote = Self::new();
        remote.fail_calls(calls);
        remote
    }

    /// Every `add_loan` call signals `entered` and then waits for a permit on
    /// `release` before answering.
    pub fn gated() -> (Self, Arc<Notify>, Arc<Semaphore>) {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Semaphore::new(0));
        let remote = Self {
            gate: Some(Gate {
                entered: entered.clone(),
                release: release.clone(),
            }),
            ..Self::default()
        };
        (remote, entered, release)
    }

    pub fn fail_calls(&self, calls: impl IntoIterator<Item = usize>) {
        self.failing_calls.lock().unwrap().extend(calls);
    }

    pub fn clear_failures(&self) {
        self.failing_calls.lock().unwrap().clear();
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn accepted(&self) -> Vec<NewLoanDocument> {
        self.accepted
            .lock()
            .unwrap()
            .iter()
            .map(|(_, doc)| doc.clone())
            .collect()
    }

    pub fn accepted_ids(&self) -> Vec<String> {
        self.accepted
            .lock()
            .unwrap()
            .iter()
            .map(|(id, _)| id.clone())
            .collect()
    }
}

#[async_trait]
impl RemoteLoanStore for FakeRemote {
    async fn add_loan(&self, doc: &NewLoanDocument) -> Result<String, RemoteError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(gate) = &self.gate {
            gate.entered.notify_one();
            gate.release
                .acquire()
                .await
                .expect("gate semaphore closed")
                .forget();
        }

        if self.failing_calls.lock().unwrap().contains(&call) {
            return Err(RemoteError::Status {
                status: 503,
                message: "unavailable".to_string(),
            });
        }

        let mut accepted = self.accepted.lock().unwrap();
        let id = format!("remote-{}", accepted.len() + 1);
        accepted.push((id.clone(), doc.clone()));
        Ok(id)
    }

    async fn loans_for_user(&self, user_id: &str) -> Result<Vec<LoanRecord>, RemoteError> {
        let now = Utc::now();
        Ok(self
            .accepted
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, doc)| doc.user_id == user_id)
            .map(|(id, doc)| LoanRecord {
                id: Some(id.clone()),
                local_id: None,
                amount: doc.amount,
                purpose: doc.purpose.clone(),
                status: doc.status,
                created_at: doc.created_at.resolve(now),
                offline: false,
                user_id: Some(doc.user_id.clone()),
            })
            .collect())
    }
}

/// Store whose writes always fail, as on a full or read-only disk.
#[derive(Default)]
pub struct ReadOnlyStore;

#[async_trait]
impl KeyValueStore for ReadOnlyStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Ok(None)
    }

    async fn set(&self, key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Io {
            path: PathBuf::from(format!("{}.json", key)),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "read-only file system"),
        })
    }
}

/// In-memory store whose writes start failing once the returned flag is set.
pub struct FlakyStore {
    inner: MemoryStore,
    fail_writes: Arc<AtomicBool>,
}

impl FlakyStore {
    pub fn new() -> (Self, Arc<AtomicBool>) {
        let fail_writes = Arc::new(AtomicBool::new(false));
        let store = Self {
            inner: MemoryStore::new(),
            fail_writes: fail_writes.clone(),
        };
        (store, fail_writes)
    }
}

#[async_trait]
impl KeyValueStore for FlakyStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Io {
                path: PathBuf::from(format!("{}.json", key)),
                source: io::Error::new(io::ErrorKind::Other, "disk full"),
            });
        }
        self.inner.set(key, value).await
    }
}
