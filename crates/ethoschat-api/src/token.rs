use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use crate::error::ApiError;
use crate::models::TokenResponse;
use ethoschat_types::{APIKEY_GRANT_TYPE, TOKEN_TTL_SECS};

/// A token plus the moment it was obtained
#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    fetched_at: Instant,
}

/// Exchanges a fixed API key for short-lived bearer tokens.
///
/// The most recent token is reused for [`TOKEN_TTL_SECS`] seconds; a
/// caller inside that window gets the same token back with no network
/// call. There is no refresh-on-401: a token that dies server-side
/// mid-window surfaces as a failed chat call.
pub struct TokenProvider {
    client: reqwest::Client,
    token_url: String,
    api_key: String,
    ttl: Duration,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenProvider {
    pub fn new(client: reqwest::Client, token_url: String, api_key: String) -> Self {
        Self {
            client,
            token_url,
            api_key,
            ttl: Duration::from_secs(TOKEN_TTL_SECS),
            cached: Mutex::new(None),
        }
    }

    /// Override the reuse window (tests shrink it)
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Whether a cached token is still inside the reuse window
    pub async fn has_fresh_token(&self) -> bool {
        self.cached
            .lock()
            .await
            .as_ref()
            .map(|entry| entry.fetched_at.elapsed() < self.ttl)
            .unwrap_or(false)
    }

    /// Return a bearer token, reusing the cached one while it is fresh
    pub async fn bearer_token(&self) -> Result<String, ApiError> {
        let mut cached = self.cached.lock().await;

        if let Some(entry) = cached.as_ref() {
            if entry.fetched_at.elapsed() < self.ttl {
                return Ok(entry.token.clone());
            }
        }

        let token = self.exchange().await?;
        *cached = Some(CachedToken {
            token: token.clone(),
            fetched_at: Instant::now(),
        });

        Ok(token)
    }

    /// Drop the cached token so the next call performs a fresh exchange
    pub async fn invalidate(&self) {
        self.cached.lock().await.take();
    }

    async fn exchange(&self) -> Result<String, ApiError> {
        let response = self
            .client
            .post(&self.token_url)
            .form(&[
                ("apikey", self.api_key.as_str()),
                ("grant_type", APIKEY_GRANT_TYPE),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Auth {
                message: format!("{} - {}", status, body),
            });
        }

        let body: TokenResponse = response.json().await.map_err(|e| ApiError::Auth {
            message: format!("malformed issuer response: {}", e),
        })?;

        if body.access_token.is_empty() {
            return Err(ApiError::Auth {
                message: "issuer response carried an empty access_token".to_string(),
            });
        }

        Ok(body.access_token)
    }
}
