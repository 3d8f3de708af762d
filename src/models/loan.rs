use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::loan_status::LoanStatus;

/// A single loan application entry.
///
/// The same shape is used for records held in the local cache, records
/// fetched from the remote store and the illustrative sample set, so lists
/// from any of those sources can be concatenated directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanRecord {
    /// Identifier assigned by the remote store. Absent while the record only
    /// exists in the local cache.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Cache-local identifier for records created offline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_id: Option<Uuid>,
    pub amount: f64,
    pub purpose: String,
    #[serde(default)]
    pub status: LoanStatus,
    pub created_at: DateTime<Utc>,
    /// True while the record has not been accepted by the remote store.
    #[serde(default)]
    pub offline: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl LoanRecord {
    /// Creates a pending record that exists only in the local cache.
    pub fn new_offline(input: &LoanInput) -> Self {
        Self {
            id: None,
            local_id: Some(Uuid::new_v4()),
            amount: input.amount,
            purpose: input.purpose.clone(),
            status: LoanStatus::Pending,
            created_at: Utc::now(),
            offline: true,
            user_id: None,
        }
    }

    pub fn is_unsynced(&self) -> bool {
        self.offline
    }
}

impl fmt::Display for LoanRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}  {}  ({})",
            self.amount,
            self.status,
            self.purpose,
            self.created_at.format("%Y-%m-%d %H:%M")
        )
    }
}

/// User-entered loan request, before it becomes a [`LoanRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanInput {
    pub amount: f64,
    pub purpose: String,
}

impl LoanInput {
    pub fn new(amount: f64, purpose: impl Into<String>) -> Self {
        Self {
            amount,
            purpose: purpose.into(),
        }
    }

    /// Checks the shape of the request. The cache itself never re-validates,
    /// so callers run this before submitting.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(ValidationError::InvalidAmount(self.amount));
        }
        if self.purpose.trim().is_empty() {
            return Err(ValidationError::MissingPurpose);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Enter a valid amount (got {0})")]
    InvalidAmount(f64),
    #[error("Purpose is required")]
    MissingPurpose,
}
