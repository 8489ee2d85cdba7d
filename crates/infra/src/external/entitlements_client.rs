//! Client for the SSO entitlements API (`GET me/entitlements`).

use async_trait::async_trait;
use reqwest::{StatusCode, Url, header};
use thiserror::Error;

use entsync_auth::AccessToken;
use entsync_levels::EntitlementsResponse;

use crate::config::{ConfigError, EntitlementsConfig};

/// Successful (non-error) results of an entitlements query.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Entitlements(EntitlementsResponse),
    /// The API has no entitlements record for the caller (HTTP 404).
    NotFound,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("entitlements query resulted in {status} status code with response message: {body}")]
    Status { status: u16, body: String },

    #[error("entitlements response could not be parsed ({message}): {body}")]
    Malformed { message: String, body: String },

    #[error("entitlements request failed: {0}")]
    Transport(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// One authenticated read of the caller's entitlements. No retries.
#[async_trait]
pub trait EntitlementsApi: Send + Sync {
    async fn fetch(&self, token: &AccessToken) -> Result<FetchOutcome, FetchError>;
}

/// reqwest-backed [`EntitlementsApi`].
///
/// Non-2xx responses are not transport errors; every status is classified by
/// [`classify_response`].
#[derive(Debug, Clone)]
pub struct HttpEntitlementsClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl HttpEntitlementsClient {
    pub fn new(config: &EntitlementsConfig) -> Result<Self, FetchError> {
        let endpoint = config.entitlements_url()?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl EntitlementsApi for HttpEntitlementsClient {
    async fn fetch(&self, token: &AccessToken) -> Result<FetchOutcome, FetchError> {
        let res = self
            .http
            .get(self.endpoint.clone())
            .bearer_auth(token.as_str())
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        classify_response(status, body)
    }
}

/// Map an HTTP status and body onto the fetch outcome.
pub fn classify_response(status: StatusCode, body: String) -> Result<FetchOutcome, FetchError> {
    match status {
        StatusCode::OK => {
            tracing::debug!(%body, "received entitlements response");
            match serde_json::from_str::<EntitlementsResponse>(&body) {
                Ok(parsed) => Ok(FetchOutcome::Entitlements(parsed)),
                Err(e) => Err(FetchError::Malformed {
                    message: e.to_string(),
                    body,
                }),
            }
        }
        StatusCode::NOT_FOUND => Ok(FetchOutcome::NotFound),
        other => Err(FetchError::Status {
            status: other.as_u16(),
            body,
        }),
    }
}
