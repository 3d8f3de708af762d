//! The single storage slot holding the ordered list of cached loans.

use super::store::{KeyValueStore, StorageError};
use crate::models::LoanRecord;

/// Well-known key under which the loan list is stored.
pub const LOANS_CACHE_KEY: &str = "LOANS_CACHE";

/// Serializes the whole loan list into one slot of a [`KeyValueStore`].
pub struct LoanSlot<S> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> LoanSlot<S> {
    pub fn new(store: S) -> Self {
        Self::with_key(store, LOANS_CACHE_KEY)
    }

    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Reads the slot.
    ///
    /// A slot that was never written reads as an empty list. Entries that no
    /// longer parse are skipped with a warning, and the raw contents are
    /// first copied to [`corrupt_key`](Self::corrupt_key) so the next write
    /// cannot lose them. Only failures of the store itself are errors.
    pub async fn load(&self) -> Result<Vec<LoanRecord>, StorageError> {
        let Some(contents) = self.store.get(&self.key).await? else {
            return Ok(Vec::new());
        };

        let entries: Vec<serde_json::Value> = match serde_json::from_str(&contents) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "loan cache is not a JSON list");
                self.quarantine(&contents).await?;
                return Ok(Vec::new());
            }
        };

        let mut loans = Vec::with_capacity(entries.len());
        let mut skipped = 0;
        for (index, entry) in entries.into_iter().enumerate() {
            match serde_json::from_value::<LoanRecord>(entry) {
                Ok(loan) => loans.push(loan),
                Err(e) => {
                    tracing::warn!(
                        key = %self.key,
                        index,
                        error = %e,
                        "skipping unreadable cached loan"
                    );
                    skipped += 1;
                }
            }
        }
        if skipped > 0 {
            self.quarantine(&contents).await?;
        }

        Ok(loans)
    }

    /// Key holding the last slot contents that failed to parse.
    pub fn corrupt_key(&self) -> String {
        format!("{}.corrupt", self.key)
    }

    async fn quarantine(&self, contents: &str) -> Result<(), StorageError> {
        let backup = self.corrupt_key();
        tracing::warn!(key = %backup, "saved unreadable loan cache contents");
        self.store.set(&backup, contents).await
    }

    /// Replaces the slot contents with `loans`.
    pub async fn save(&self, loans: &[LoanRecord]) -> Result<(), StorageError> {
        let contents = serde_json::to_string(loans)?;
        self.store.set(&self.key, &contents).await
    }
}
