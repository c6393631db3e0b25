//! Retrying HTTP transport shared by all authenticated API calls.

use std::time::Duration;

use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::StatusCode;
use serde_json::Value;
use tokio::time::sleep;
use tracing::debug;

use crate::error::{RlError, Result};

/// Total attempts for one logical request, counting the first one.
pub(crate) const MAX_ATTEMPTS: u32 = 5;

/// Decoded response with the headers the batch planner needs to inspect.
#[derive(Debug)]
pub(crate) struct ApiResponse {
    pub(crate) headers: HeaderMap,
    pub(crate) body: Value,
}

/// Body decoded as JSON when the response declares a JSON content type,
/// otherwise kept as the raw text.
pub(crate) async fn json_or_text(resp: reqwest::Response) -> Result<Value> {
    let is_json = resp
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.contains("application/json"));
    let text = resp.text().await?;
    if is_json {
        Ok(serde_json::from_str(&text)?)
    } else {
        Ok(Value::String(text))
    }
}

/// One `reqwest::Client` worth of retry policy.
///
/// 500 and 502 are treated as transient API trouble and retried with linear
/// backoff (`1 + attempt*2` seconds) until the attempt budget runs out; any
/// other non-200 fails the call immediately. 401 is surfaced as
/// [`RlError::Unauthorized`] so the authenticated layer can refresh the
/// token and retry the logical call once.
#[derive(Debug, Clone)]
pub(crate) struct Transport {
    http: reqwest::Client,
}

impl Transport {
    pub(crate) fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    pub(crate) async fn request(
        &self,
        url: &str,
        headers: HeaderMap,
        params: &[(String, String)],
    ) -> Result<ApiResponse> {
        let mut attempt = 0;
        loop {
            let resp = self
                .http
                .get(url)
                .headers(headers.clone())
                .query(params)
                .send()
                .await?;
            let status = resp.status();
            let resp_headers = resp.headers().clone();
            let body = json_or_text(resp).await?;

            if status == StatusCode::OK {
                return Ok(ApiResponse {
                    headers: resp_headers,
                    body,
                });
            }

            if matches!(status.as_u16(), 500 | 502) && attempt + 1 < MAX_ATTEMPTS {
                let backoff = Duration::from_secs(u64::from(1 + attempt * 2));
                debug!(
                    url,
                    status = status.as_u16(),
                    attempt,
                    backoff_secs = backoff.as_secs(),
                    "transient upstream error, retrying"
                );
                sleep(backoff).await;
                attempt += 1;
                continue;
            }

            return Err(RlError::from_response(status, resp_headers, &body));
        }
    }
}
