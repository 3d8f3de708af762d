//! Loan submission: straight to the remote store when online, into the
//! offline cache otherwise.

use crate::cache::{CacheError, OfflineLoanCache};
use crate::connectivity::Connectivity;
use crate::identity::Session;
use crate::models::{LoanInput, ValidationError};
use crate::remote::{NewLoanDocument, RemoteError, RemoteLoanStore};

/// Where a submitted loan ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Accepted by the remote store under `id`.
    Submitted { id: String },
    /// Cached locally; will be sent on the next sync pass.
    SavedOffline,
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error("No signed-in user to submit the loan for")]
    NotSignedIn,
}

/// Validates `input` and routes it according to `connectivity`.
///
/// The session and remote store are only needed on the online path;
/// offline records are attributed to the user when they are synced.
pub async fn submit_loan<R>(
    input: &LoanInput,
    connectivity: Connectivity,
    session: Option<&Session>,
    cache: &OfflineLoanCache,
    remote: Option<&R>,
) -> Result<Submission, SubmitError>
where
    R: RemoteLoanStore + ?Sized,
{
    input.validate()?;

    match connectivity {
        Connectivity::Offline => {
            cache.add_loan_offline(input).await?;
            Ok(Submission::SavedOffline)
        }
        Connectivity::Online => {
            let session = session.ok_or(SubmitError::NotSignedIn)?;
            let remote = remote.ok_or_else(|| CacheError::Remote(RemoteError::NotConfigured))?;
            let doc = NewLoanDocument::pending(session.user_id(), input.amount, &input.purpose);
            let id = remote.add_loan(&doc).await.map_err(CacheError::from)?;
            tracing::info!(%id, amount = input.amount, "loan submitted");
            Ok(Submission::Submitted { id })
        }
    }
}
