/// Errors talking to the remote document store.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("Remote store not configured. Add remote.server_url and remote.api_key to config.")]
    NotConfigured,
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Server returned status {status}: {message}")]
    Status { status: u16, message: String },
}
