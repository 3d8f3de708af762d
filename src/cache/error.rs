use super::store::StorageError;
use crate::remote::RemoteError;

/// Errors surfaced by the offline loan cache.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Local persistence failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    /// The remote store refused or never received a write.
    #[error("Remote store error: {0}")]
    Remote(#[from] RemoteError),
    #[error("Loan cache writer is no longer running")]
    WriterClosed,
}
