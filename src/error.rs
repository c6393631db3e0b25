//! Error types for the Rocket League API client

use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde_json::Value;
use thiserror::Error;

use crate::enums::Platform;

pub type Result<T> = std::result::Result<T, RlError>;

#[derive(Error, Debug)]
pub enum RlError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML parsing failed: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("API request failed (status code: {status}): {message}")]
    Http {
        status: StatusCode,
        headers: HeaderMap,
        message: String,
    },

    #[error("Access token is invalid or expired (status code: 401): {message}")]
    Unauthorized { message: String },

    #[error("Username {username:?} doesn't match any identifier pattern for platform {platform}")]
    IllegalUsername { platform: Platform, username: String },

    #[error("Unknown platform: {0}")]
    UnknownPlatform(String),

    #[error("{0}")]
    PlayerNotFound(String),

    #[error("At least one player ID or name is required")]
    EmptyQuery,

    #[error("Unexpected API response: {0}")]
    UnexpectedResponse(String),
}

impl RlError {
    /// Classify a non-success upstream response, keeping 401 distinct so the
    /// authenticated layer can refresh the token and retry once.
    pub(crate) fn from_response(status: StatusCode, headers: HeaderMap, body: &Value) -> Self {
        let message = error_message(body);
        if status == StatusCode::UNAUTHORIZED {
            RlError::Unauthorized { message }
        } else {
            RlError::Http {
                status,
                headers,
                message,
            }
        }
    }

    /// Status code of the failed upstream response, if this error came from one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            RlError::Http { status, .. } => Some(*status),
            RlError::Unauthorized { .. } => Some(StatusCode::UNAUTHORIZED),
            _ => None,
        }
    }
}

/// Error detail from a decoded body: a JSON object's `detail` field wins,
/// otherwise the whole body is used.
pub(crate) fn error_message(body: &Value) -> String {
    match body {
        Value::Object(map) => match map.get("detail").and_then(Value::as_str) {
            Some(detail) => detail.to_owned(),
            None => body.to_string(),
        },
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_message_prefers_detail_field() {
        let body = json!({"detail": "Invalid platform provided.", "code": 7});
        assert_eq!(error_message(&body), "Invalid platform provided.");
    }

    #[test]
    fn test_error_message_falls_back_to_whole_object() {
        let body = json!({"code": 7});
        assert_eq!(error_message(&body), r#"{"code":7}"#);
    }

    #[test]
    fn test_error_message_uses_plain_text_body() {
        let body = Value::String("Bad Gateway".to_owned());
        assert_eq!(error_message(&body), "Bad Gateway");
    }

    #[test]
    fn test_from_response_maps_401_to_unauthorized() {
        let err = RlError::from_response(
            StatusCode::UNAUTHORIZED,
            HeaderMap::new(),
            &json!({"detail": "expired token"}),
        );
        assert!(matches!(err, RlError::Unauthorized { .. }));
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
    }

    #[test]
    fn test_from_response_keeps_other_statuses_generic() {
        let err = RlError::from_response(
            StatusCode::BAD_REQUEST,
            HeaderMap::new(),
            &json!({"detail": "too many ids"}),
        );
        match err {
            RlError::Http {
                status, message, ..
            } => {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert_eq!(message, "too many ids");
            }
            other => panic!("expected RlError::Http, got {other:?}"),
        }
    }
}
