//! Identity of the signed-in user.
//!
//! Sign-in itself happens elsewhere; this crate only needs the resulting user
//! id, and receives it as an explicit [`Session`] value.

use serde::{Deserialize, Serialize};

use crate::remote::{HttpRemoteStore, RemoteError};

/// The currently authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: String,
}

impl Session {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("No signed-in user. Set user_id in config or configure the remote store.")]
    NotSignedIn,
    #[error("Failed to fetch identity: {0}")]
    Remote(#[from] RemoteError),
}

/// Resolves the session: a configured user id wins, otherwise the remote
/// store is asked who the API key belongs to.
pub async fn resolve_session(
    configured: Option<&str>,
    remote: Option<&HttpRemoteStore>,
) -> Result<Session, IdentityError> {
    if let Some(user_id) = configured.filter(|id| !id.is_empty()) {
        return Ok(Session::new(user_id));
    }
    match remote {
        Some(remote) => Ok(remote.fetch_session().await?),
        None => Err(IdentityError::NotSignedIn),
    }
}
