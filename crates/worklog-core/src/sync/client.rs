//! HTTP client for the remote session store.
//!
//! The store exposes exactly two operations: list every session, and replace
//! the whole collection. Both move the full list -- a single-user dataset is
//! expected to fit in memory -- and neither runs on the hot path: sync is an
//! explicit action, never part of `stop`.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::SyncError;
use crate::session::Session;

/// Server acknowledgement for a replace operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplaceSummary {
    pub success: bool,
    /// Number of sessions now stored.
    pub count: u64,
}

/// Body of a non-2xx response.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Client for the session store's bulk read/replace contract.
pub struct SyncClient {
    base: Url,
    client: reqwest::Client,
}

impl SyncClient {
    /// Create a client against the given base URL (e.g. from
    /// `sync.server_url` in the config).
    pub fn new(base_url: &str) -> Result<Self, SyncError> {
        let base = Url::parse(base_url).map_err(|e| SyncError::InvalidUrl(e.to_string()))?;
        Ok(Self {
            base,
            client: reqwest::Client::new(),
        })
    }

    fn sessions_url(&self) -> String {
        format!("{}/sessions", self.base.as_str().trim_end_matches('/'))
    }

    /// `GET /sessions`: every stored session, ordered by start time ascending
    /// (the server sorts; the client does not re-sort).
    pub async fn list_all(&self) -> Result<Vec<Session>, SyncError> {
        let resp = self.client.get(self.sessions_url()).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(Self::server_error(status.as_u16(), body));
        }
        serde_json::from_str(&body).map_err(|e| SyncError::InvalidResponse(e.to_string()))
    }

    /// `POST /sessions`: atomically replace the entire stored collection.
    /// An empty list is valid and clears the store.
    pub async fn replace_all(&self, sessions: &[Session]) -> Result<ReplaceSummary, SyncError> {
        let resp = self
            .client
            .post(self.sessions_url())
            .json(sessions)
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(Self::server_error(status.as_u16(), body));
        }
        serde_json::from_str(&body).map_err(|e| SyncError::InvalidResponse(e.to_string()))
    }

    fn server_error(status: u16, body: String) -> SyncError {
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.error)
            .unwrap_or(body);
        SyncError::Server { status, message }
    }
}
