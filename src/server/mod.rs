//! Loan document server: the remote store the client syncs into.

pub mod auth;
pub mod routes;
pub mod storage;

pub use auth::{ApiKeyEntry, ApiKeyStore};
pub use routes::{router, AppState};
pub use storage::{init_db, LoanDocumentStore, ServerStorageError};
