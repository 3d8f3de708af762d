//! Connectivity state and change notifications.
//!
//! Reachability is judged by the remote store's `/health` endpoint. A
//! [`ConnectivityMonitor`] polls it and publishes changes on a
//! `tokio::sync::watch` channel that any number of subscribers can follow.

use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::remote::endpoint_url;

/// Whether the remote store can currently be reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
    Online,
    Offline,
}

impl Connectivity {
    pub fn from_reachable(reachable: bool) -> Self {
        if reachable {
            Connectivity::Online
        } else {
            Connectivity::Offline
        }
    }

    pub fn is_online(self) -> bool {
        self == Connectivity::Online
    }
}

impl std::fmt::Display for Connectivity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Connectivity::Online => write!(f, "online"),
            Connectivity::Offline => write!(f, "offline"),
        }
    }
}

/// Checks whether the server answers its health endpoint in time.
pub async fn check_server(server_url: &str, timeout: Duration) -> bool {
    let url = endpoint_url(server_url, "/health");

    let client = match reqwest::Client::builder().timeout(timeout).build() {
        Ok(client) => client,
        Err(_) => return false,
    };

    match client.get(&url).send().await {
        Ok(response) => response.status().is_success(),
        Err(e) => {
            tracing::debug!(url = %url, error = %e, "health check failed");
            false
        }
    }
}

/// Probes the server at startup, treating a missing URL as offline.
pub async fn probe(server_url: Option<&str>, timeout: Duration) -> Connectivity {
    match server_url {
        Some(url) => Connectivity::from_reachable(check_server(url, timeout).await),
        None => Connectivity::Offline,
    }
}

/// Polls the server's health endpoint and publishes connectivity changes.
pub struct ConnectivityMonitor {
    server_url: String,
    interval: Duration,
    timeout: Duration,
}

impl ConnectivityMonitor {
    pub fn new(server_url: impl Into<String>, interval: Duration, timeout: Duration) -> Self {
        Self {
            server_url: server_url.into(),
            interval,
            timeout,
        }
    }

    /// Starts polling. The returned receiver only wakes when the state
    /// actually changes; the task stops once every receiver is dropped.
    pub fn spawn(self, initial: Connectivity) -> (watch::Receiver<Connectivity>, JoinHandle<()>) {
        let (tx, rx) = watch::channel(initial);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            loop {
                ticker.tick().await;
                if tx.is_closed() {
                    break;
                }
                let state =
                    Connectivity::from_reachable(check_server(&self.server_url, self.timeout).await);
                tx.send_if_modified(|current| {
                    if *current == state {
                        return false;
                    }
                    tracing::info!(from = %current, to = %state, "connectivity changed");
                    *current = state;
                    true
                });
            }
        });

        (rx, handle)
    }
}
