use loanapp::cache::{FileStore, OfflineLoanCache};
use loanapp::config::Config;
use loanapp::connectivity::{self, Connectivity};
use loanapp::identity::{resolve_session, IdentityError, Session};
use loanapp::remote::{HttpRemoteStore, RemoteError};

/// Collaborators shared by every command.
pub struct Context {
    pub config: Config,
    pub cache: OfflineLoanCache,
    pub remote: Option<HttpRemoteStore>,
}

impl Context {
    pub fn open(config: Config) -> Result<Self, RemoteError> {
        let cache = OfflineLoanCache::new(FileStore::new(config.data_dir.value.clone()));
        let remote = if config.remote.is_configured() {
            Some(HttpRemoteStore::from_config(&config.remote)?)
        } else {
            None
        };

        Ok(Self {
            config,
            cache,
            remote,
        })
    }

    /// Probes the remote store. Without a configured server we are offline.
    pub async fn connectivity(&self) -> Connectivity {
        let url = self.remote.as_ref().map(HttpRemoteStore::server_url);
        connectivity::probe(url, self.config.remote.timeout()).await
    }

    pub async fn session(&self) -> Result<Session, IdentityError> {
        resolve_session(self.config.user_id.value.as_deref(), self.remote.as_ref()).await
    }

    pub fn remote(&self) -> Result<&HttpRemoteStore, RemoteError> {
        self.remote.as_ref().ok_or(RemoteError::NotConfigured)
    }
}
