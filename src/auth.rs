//! OAuth2 client-credentials token lifecycle.

use std::fmt;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Deserialize;
use tracing::debug;

use crate::error::{error_message, RlError, Result};
use crate::http::json_or_text;

/// Tokens are refreshed this many seconds before they actually expire.
const REFRESH_MARGIN_SECS: u64 = 60;

/// OAuth client id/secret pair.
#[derive(Clone)]
pub(crate) struct Credentials {
    pub(crate) client_id: String,
    pub(crate) client_secret: String,
}

// Manual Debug so the secret can never end up in logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Cached bearer token with its expiry time in epoch seconds.
#[derive(Debug, Clone)]
pub(crate) struct TokenInfo {
    pub(crate) access_token: String,
    pub(crate) expires_at: u64,
}

impl TokenInfo {
    pub(crate) fn is_valid(&self, now: u64) -> bool {
        self.expires_at.saturating_sub(now) > REFRESH_MARGIN_SECS
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token_type: String,
    access_token: String,
    expires_in: u64,
}

/// Owns token acquisition and the expiry-tracked cache.
///
/// The cache is deliberately not single-flighted: two calls that both see an
/// expired token may both perform a grant, which is idempotent on the server
/// side; last write wins. Neither mutex is ever held across an `.await`.
#[derive(Debug)]
pub(crate) struct TokenManager {
    http: reqwest::Client,
    token_url: String,
    credentials: Mutex<Credentials>,
    token: Mutex<Option<TokenInfo>>,
}

impl TokenManager {
    pub(crate) fn new(http: reqwest::Client, token_url: String, credentials: Credentials) -> Self {
        Self {
            http,
            token_url,
            credentials: Mutex::new(credentials),
            token: Mutex::new(None),
        }
    }

    pub(crate) fn update_credentials(&self, client_id: String, client_secret: String) {
        *lock(&self.credentials) = Credentials {
            client_id,
            client_secret,
        };
        // cached token was issued for the old credentials
        *lock(&self.token) = None;
    }

    /// Returns the cached token while it has more than the refresh margin
    /// left, otherwise performs a client-credentials grant.
    ///
    /// No retry at this layer; retry/backoff belongs to the resource calls
    /// that use the token.
    pub(crate) async fn get_access_token(&self, force_refresh: bool) -> Result<String> {
        if !force_refresh {
            let cached = lock(&self.token)
                .as_ref()
                .filter(|token| token.is_valid(epoch_now()))
                .map(|token| token.access_token.clone());
            if let Some(token) = cached {
                return Ok(token);
            }
        }
        self.request_token().await
    }

    async fn request_token(&self) -> Result<String> {
        let credentials = lock(&self.credentials).clone();
        let request_time = epoch_now();
        debug!(token_url = %self.token_url, "requesting new access token");

        let resp = self
            .http
            .post(&self.token_url)
            .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = json_or_text(resp).await?;

        // Deliberately never `Unauthorized`, so the refresh-once wrapper
        // cannot loop through the grant endpoint.
        if status != reqwest::StatusCode::OK {
            return Err(RlError::Http {
                status,
                headers,
                message: error_message(&body),
            });
        }

        let grant: TokenResponse = serde_json::from_value(body)?;
        if grant.token_type != "bearer" {
            return Err(RlError::UnexpectedResponse(format!(
                "expected token_type \"bearer\", got {:?}",
                grant.token_type
            )));
        }

        let info = TokenInfo {
            access_token: grant.access_token,
            expires_at: request_time + grant.expires_in,
        };
        let access_token = info.access_token.clone();
        *lock(&self.token) = Some(info);
        Ok(access_token)
    }
}

pub(crate) fn epoch_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}

/// Lock that shrugs off poisoning; the guarded state is always valid.
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
