//! The loan list shown to the user.
//!
//! Offline, the list is the cached records followed by the sample set.
//! Online, it is the remote store's loans for the signed-in user.

use std::fmt;

use crate::cache::{CacheError, OfflineLoanCache};
use crate::connectivity::Connectivity;
use crate::identity::Session;
use crate::models::{is_sample_id, sample_loans, LoanRecord};
use crate::remote::RemoteLoanStore;

/// Marker shown next to an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoanTag {
    /// Held only in the local cache.
    Offline,
    /// Part of the illustrative sample set.
    Sample,
}

impl LoanTag {
    pub fn for_record(record: &LoanRecord) -> Option<Self> {
        if record.offline {
            Some(LoanTag::Offline)
        } else if is_sample_id(record.id.as_deref()) {
            Some(LoanTag::Sample)
        } else {
            None
        }
    }
}

impl fmt::Display for LoanTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoanTag::Offline => write!(f, "(Offline)"),
            LoanTag::Sample => write!(f, "(Sample)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedEntry {
    pub loan: LoanRecord,
    pub tag: Option<LoanTag>,
}

impl From<LoanRecord> for FeedEntry {
    fn from(loan: LoanRecord) -> Self {
        let tag = LoanTag::for_record(&loan);
        Self { loan, tag }
    }
}

impl fmt::Display for FeedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.loan.amount, self.loan.status)?;
        if let Some(tag) = self.tag {
            write!(f, " {}", tag)?;
        }
        write!(
            f,
            "\n    {}  ({})",
            self.loan.purpose,
            self.loan.created_at.format("%Y-%m-%d %H:%M")
        )
    }
}

/// Where a feed's entries came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedSource {
    Cache,
    Remote,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoanFeed {
    pub source: FeedSource,
    pub entries: Vec<FeedEntry>,
}

impl LoanFeed {
    /// Cached records first, then the sample set.
    pub fn offline(cached: Vec<LoanRecord>) -> Self {
        let entries = cached
            .into_iter()
            .chain(sample_loans())
            .map(FeedEntry::from)
            .collect();
        Self {
            source: FeedSource::Cache,
            entries,
        }
    }

    pub fn online(remote: Vec<LoanRecord>) -> Self {
        Self {
            source: FeedSource::Remote,
            entries: remote.into_iter().map(FeedEntry::from).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builds the feed for the given connectivity state.
///
/// When `previous` was offline and the device is now online, the offline
/// cache is drained before the remote list is fetched, so loans submitted
/// while disconnected show up with their remote ids. A failed sync is logged
/// and the remote list is still returned.
pub async fn load_feed<R>(
    cache: &OfflineLoanCache,
    session: &Session,
    previous: Connectivity,
    connectivity: Connectivity,
    remote: &R,
) -> Result<LoanFeed, CacheError>
where
    R: RemoteLoanStore + ?Sized,
{
    match connectivity {
        Connectivity::Offline => Ok(LoanFeed::offline(cache.get_cached_loans().await?)),
        Connectivity::Online => {
            if !previous.is_online() {
                if let Err(e) = cache.sync_loans(session, connectivity, remote).await {
                    tracing::warn!(error = %e, "sync before loading loans failed");
                }
            }
            let loans = remote.loans_for_user(session.user_id()).await?;
            Ok(LoanFeed::online(loans))
        }
    }
}
