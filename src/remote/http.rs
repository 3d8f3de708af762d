//! HTTP client for the loan document server.

use async_trait::async_trait;
use std::time::Duration;

use super::{
    endpoint_url, AddedDocument, NewLoanDocument, RemoteError, RemoteLoanStore, LOANS_COLLECTION,
};
use crate::config::RemoteConfig;
use crate::identity::Session;
use crate::models::LoanRecord;

/// Remote store reached over HTTP with a bearer API key.
#[derive(Debug, Clone)]
pub struct HttpRemoteStore {
    client: reqwest::Client,
    server_url: String,
    api_key: String,
}

impl HttpRemoteStore {
    /// Creates a client with an explicit server URL, key and request timeout.
    pub fn new(
        server_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            server_url: server_url.into(),
            api_key: api_key.into(),
        })
    }

    /// Creates a client from config.
    ///
    /// Returns an error if the remote store is not configured.
    pub fn from_config(config: &RemoteConfig) -> Result<Self, RemoteError> {
        let server_url = config
            .server_url
            .clone()
            .ok_or(RemoteError::NotConfigured)?;
        let api_key = config.api_key.clone().ok_or(RemoteError::NotConfigured)?;
        Self::new(server_url, api_key, config.timeout())
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Fetches the identity bound to the API key from `/me`.
    pub async fn fetch_session(&self) -> Result<Session, RemoteError> {
        let response = self
            .client
            .get(self.build_url("/me"))
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        let response = ensure_success(response).await?;
        Ok(response.json::<Session>().await?)
    }

    fn collection_url(&self) -> String {
        self.build_url(&format!("/collections/{}", LOANS_COLLECTION))
    }

    fn build_url(&self, path: &str) -> String {
        endpoint_url(&self.server_url, path)
    }
}

#[async_trait]
impl RemoteLoanStore for HttpRemoteStore {
    async fn add_loan(&self, doc: &NewLoanDocument) -> Result<String, RemoteError> {
        let response = self
            .client
            .post(self.collection_url())
            .bearer_auth(&self.api_key)
            .json(doc)
            .send()
            .await?;
        let added: AddedDocument = ensure_success(response).await?.json().await?;

        tracing::debug!(id = %added.id, "remote store accepted loan");
        Ok(added.id)
    }

    async fn loans_for_user(&self, user_id: &str) -> Result<Vec<LoanRecord>, RemoteError> {
        let response = self
            .client
            .get(self.collection_url())
            .bearer_auth(&self.api_key)
            .query(&[("userId", user_id)])
            .send()
            .await?;
        Ok(ensure_success(response).await?.json().await?)
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(RemoteError::Status {
        status: status.as_u16(),
        message,
    })
}
