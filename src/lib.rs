//! Loan application client core.
//!
//! Loans submitted while the remote store is unreachable are kept in a local
//! cache and pushed to the store once connectivity returns. See [`cache`] for
//! the guarantees around that hand-off.

pub mod auto_sync;
pub mod cache;
pub mod config;
pub mod connectivity;
pub mod feed;
pub mod identity;
pub mod logging;
pub mod models;
pub mod remote;
pub mod server;
pub mod submit;

pub use auto_sync::AutoSync;
pub use cache::{CacheError, FileStore, KeyValueStore, MemoryStore, OfflineLoanCache, SyncReport};
pub use connectivity::{check_server, Connectivity, ConnectivityMonitor};
pub use feed::{load_feed, FeedEntry, LoanFeed, LoanTag};
pub use identity::Session;
pub use models::{LoanInput, LoanRecord, LoanStatus};
pub use remote::{HttpRemoteStore, NewLoanDocument, RemoteError, RemoteLoanStore};
pub use submit::{submit_loan, Submission, SubmitError};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
