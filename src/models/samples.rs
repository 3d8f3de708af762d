use chrono::{DateTime, Utc};

use super::{LoanRecord, LoanStatus};

/// Id prefix that marks a record as part of the illustrative sample set.
pub const SAMPLE_ID_PREFIX: &str = "mock-";

const SAMPLES: [(&str, f64, LoanStatus, &str, &str); 4] = [
    ("1", 5000.0, LoanStatus::Pending, "Car repair", "2025-07-01T10:00:00Z"),
    ("2", 12000.0, LoanStatus::Approved, "Home renovation", "2025-06-15T14:30:00Z"),
    ("3", 3000.0, LoanStatus::Rejected, "Vacation", "2025-05-20T09:15:00Z"),
    ("4", 8000.0, LoanStatus::Flagged, "Business", "2025-07-03T16:45:00Z"),
];

/// Fixed sample loans shown after cached records while offline.
pub fn sample_loans() -> Vec<LoanRecord> {
    SAMPLES
        .iter()
        .map(|(id, amount, status, purpose, created_at)| LoanRecord {
            id: Some(format!("{}{}", SAMPLE_ID_PREFIX, id)),
            local_id: None,
            amount: *amount,
            purpose: purpose.to_string(),
            status: *status,
            created_at: created_at
                .parse::<DateTime<Utc>>()
                .unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
            offline: false,
            user_id: None,
        })
        .collect()
}

pub fn is_sample_id(id: Option<&str>) -> bool {
    id.is_some_and(|id| id.starts_with(SAMPLE_ID_PREFIX))
}
