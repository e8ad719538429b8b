use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Malformed config file {path}, line {line}: {message}")]
    ConfigParse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Authentication failed: {reason}")]
    Authentication {
        reason: String,
        #[source]
        source: Option<Box<BridgeError>>,
    },

    #[error("Request failed with status {status}: {}", truncate_body(.body))]
    Request { status: StatusCode, body: String },

    #[error("Failed to parse JSON response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    UnexpectedResponse(String),

    #[error("Server returned an empty page at offset {offset} before reaching total {total}")]
    Pagination { offset: u64, total: u64 },

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    #[error("Failed to read credentials: {0}")]
    Prompt(#[source] std::io::Error),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Truncate a response body to avoid logging excessive data
fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY_LENGTH {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY_LENGTH;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
}

impl BridgeError {
    pub fn from_status(status: StatusCode, body: String) -> Self {
        BridgeError::Request { status, body }
    }

    pub fn authentication(reason: impl Into<String>, source: Option<BridgeError>) -> Self {
        BridgeError::Authentication {
            reason: reason.into(),
            source: source.map(Box::new),
        }
    }

    /// Status code of a failed request, if this error carries one.
    /// A failed sign-in reports the status of the underlying request.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            BridgeError::Request { status, .. } => Some(*status),
            BridgeError::Authentication {
                source: Some(source),
                ..
            } => source.status(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_error_keeps_full_body() {
        let body = "x".repeat(2000);
        let err = BridgeError::from_status(StatusCode::INTERNAL_SERVER_ERROR, body.clone());

        assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
        match &err {
            BridgeError::Request { body: kept, .. } => assert_eq!(kept.len(), 2000),
            other => panic!("unexpected error: {other:?}"),
        }

        let message = err.to_string();
        assert!(message.contains("500"));
        assert!(message.contains("truncated, 2000 total bytes"));
        assert!(message.len() < 700);
    }

    #[test]
    fn test_truncate_body_respects_char_boundaries() {
        let body = "é".repeat(400); // 800 bytes, 2 bytes per char
        let truncated = truncate_body(&body);
        assert!(truncated.starts_with(&"é".repeat(250)));
        assert!(truncated.ends_with("(truncated, 800 total bytes)"));
    }

    #[test]
    fn test_authentication_keeps_cause() {
        use std::error::Error;

        let cause = BridgeError::from_status(StatusCode::UNAUTHORIZED, "bad password".into());
        let err = BridgeError::authentication("sign-in rejected", Some(cause));

        assert_eq!(err.to_string(), "Authentication failed: sign-in rejected");
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
        let source = err.source().expect("cause kept");
        assert!(source.to_string().contains("bad password"));

        let bare = BridgeError::authentication("no session token", None);
        assert!(bare.source().is_none());
        assert_eq!(bare.status(), None);
    }

    #[test]
    fn test_short_body_untouched() {
        assert_eq!(truncate_body("not found"), "not found");
        let err = BridgeError::from_status(StatusCode::NOT_FOUND, "not found".into());
        assert_eq!(err.to_string(), "Request failed with status 404 Not Found: not found");
    }
}
