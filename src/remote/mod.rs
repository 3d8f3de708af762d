//! Remote document store collaborator.
//!
//! The remote store is the system of record for loans. The cache only needs
//! two things from it: adding a document to the loans collection and
//! querying that collection by owning user.

mod error;
mod http;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{LoanRecord, LoanStatus};

pub use error::RemoteError;
pub use http::HttpRemoteStore;

/// Name of the collection holding loan documents.
pub const LOANS_COLLECTION: &str = "loans";

/// Joins `path` onto a configured server URL, accepting bare hosts such as
/// `localhost:8080`.
pub fn endpoint_url(server_url: &str, path: &str) -> String {
    let base = server_url.trim_end_matches('/');
    if base.starts_with("http://") || base.starts_with("https://") {
        format!("{}{}", base, path)
    } else {
        format!("http://{}{}", base, path)
    }
}

/// Value for a timestamp field of a new document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type", content = "value")]
pub enum TimestampField {
    /// Resolved to the remote store's own clock when the write is accepted.
    ServerTimestamp,
    Fixed(DateTime<Utc>),
}

impl TimestampField {
    pub fn resolve(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            TimestampField::ServerTimestamp => now,
            TimestampField::Fixed(at) => *at,
        }
    }
}

/// Body of an "add document" request for the loans collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLoanDocument {
    pub user_id: String,
    pub amount: f64,
    pub purpose: String,
    pub status: LoanStatus,
    pub created_at: TimestampField,
}

impl NewLoanDocument {
    /// Builds a pending loan stamped with the server clock.
    pub fn pending(user_id: impl Into<String>, amount: f64, purpose: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            amount,
            purpose: purpose.into(),
            status: LoanStatus::Pending,
            created_at: TimestampField::ServerTimestamp,
        }
    }

    /// Builds the document for a cached record. The locally recorded
    /// `created_at` is replaced by the server timestamp.
    pub fn from_record(record: &LoanRecord, user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            amount: record.amount,
            purpose: record.purpose.clone(),
            status: record.status,
            created_at: TimestampField::ServerTimestamp,
        }
    }
}

/// Response to a successful "add document" request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddedDocument {
    pub id: String,
}

/// Asynchronous document store holding the loans collection.
#[async_trait]
pub trait RemoteLoanStore: Send + Sync {
    /// Adds a document and returns the identifier the store assigned.
    async fn add_loan(&self, doc: &NewLoanDocument) -> Result<String, RemoteError>;

    /// Returns every loan whose `userId` equals `user_id`.
    async fn loans_for_user(&self, user_id: &str) -> Result<Vec<LoanRecord>, RemoteError>;
}
