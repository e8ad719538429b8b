//! Per-call request options and decoded response bodies.

use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::Url;
use serde_json::Value;

/// Transport options for one REST call.
///
/// Built fresh for each call; nothing here is shared between requests.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub(crate) headers: Option<HeaderMap>,
    pub(crate) query: Vec<(String, String)>,
    pub(crate) timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Send exactly these headers instead of the session header.
    ///
    /// Include `Bridge-Session` yourself if the call needs to be authenticated.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = Some(headers);
        self
    }

    /// Append a query string parameter
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Body of a successful response.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// Parsed because the server declared `application/json`
    Json(Value),
    Text(String),
}

impl ResponseBody {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ResponseBody::Json(value) => Some(value),
            ResponseBody::Text(_) => None,
        }
    }

    pub fn into_json(self) -> Option<Value> {
        match self {
            ResponseBody::Json(value) => Some(value),
            ResponseBody::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseBody::Text(text) => Some(text),
            ResponseBody::Json(_) => None,
        }
    }
}

/// Detect if a content-type is JSON
pub(crate) fn is_json(content_type: Option<&str>) -> bool {
    content_type
        .map(|ct| ct.trim().to_ascii_lowercase().starts_with("application/json"))
        .unwrap_or(false)
}

/// Use `uri` as-is when it names a host, otherwise append it to `base_url`.
///
/// A scheme-relative `//host/path` takes the base URL's scheme.
pub(crate) fn resolve_url(base_url: &str, uri: &str) -> String {
    if uri.starts_with("//") {
        let scheme = Url::parse(base_url)
            .map(|base| base.scheme().to_string())
            .unwrap_or_else(|_| "https".to_string());
        return format!("{}:{}", scheme, uri);
    }
    match Url::parse(uri) {
        Ok(url) if url.has_host() => uri.to_string(),
        _ => {
            let base = base_url.trim_end_matches('/');
            if uri.starts_with('/') {
                format!("{}{}", base, uri)
            } else {
                format!("{}/{}", base, uri)
            }
        }
    }
}

/// Percent-encode one path segment
pub(crate) fn encode_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://webservices.sagebridge.org";

    #[test]
    fn test_relative_uris_use_base_url() {
        for uri in ["/v3/participants", "/v3/participants?offsetBy=3", "v3/auth/signIn"] {
            let resolved = resolve_url(BASE, uri);
            assert!(resolved.starts_with("https://webservices.sagebridge.org/v3/"), "{resolved}");
        }
        assert_eq!(
            resolve_url("http://127.0.0.1:1234/", "/v3/participants"),
            "http://127.0.0.1:1234/v3/participants"
        );
    }

    #[test]
    fn test_absolute_uris_pass_through() {
        for uri in [
            "https://example.org/data.json",
            "http://127.0.0.1:8080/v3/participants?offsetBy=0",
            "HTTPS://Other.Host/Path",
        ] {
            assert_eq!(resolve_url(BASE, uri), uri);
        }
    }

    #[test]
    fn test_scheme_relative_uris_keep_their_host() {
        assert_eq!(
            resolve_url(BASE, "//cdn.example.org/file.json"),
            "https://cdn.example.org/file.json"
        );
        assert_eq!(
            resolve_url("http://127.0.0.1:1234", "//other:5678/v3/x"),
            "http://other:5678/v3/x"
        );
    }

    #[test]
    fn test_is_json() {
        for ct in [
            "application/json",
            "application/json; charset=utf-8",
            "  Application/JSON  ",
            "APPLICATION/JSON;charset=UTF-8",
        ] {
            assert!(is_json(Some(ct)), "{ct}");
        }
        for ct in ["text/plain", "text/html; charset=utf-8", "application/xml", ""] {
            assert!(!is_json(Some(ct)), "{ct}");
        }
        assert!(!is_json(None));
    }

    #[test]
    fn test_encode_segment() {
        assert_eq!(encode_segment("aBc-123_x.y~z"), "aBc-123_x.y~z");
        assert_eq!(encode_segment("a b/c"), "a%20b%2Fc");
        assert_eq!(encode_segment("é"), "%C3%A9");
        assert_eq!(encode_segment("user+1@example.org"), "user%2B1%40example.org");
    }

    #[test]
    fn test_options_are_independent() {
        let first = RequestOptions::new().query("offsetBy", "0");
        let second = RequestOptions::new();
        assert_eq!(first.query.len(), 1);
        assert!(second.query.is_empty());
        assert!(second.headers.is_none());
        assert!(second.timeout.is_none());
    }
}
