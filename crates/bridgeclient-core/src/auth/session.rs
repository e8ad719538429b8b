use std::fmt;

use serde_json::Value;

/// Signed-in Bridge session.
///
/// Lives only as long as the connector that created it; never written to disk.
#[derive(Clone)]
pub struct Session {
    token: String,
    first_name: Option<String>,
    raw: Value,
}

impl Session {
    /// Build a session from the sign-in response body.
    ///
    /// Returns `None` unless the body is an object with a string `sessionToken`.
    pub fn from_response(raw: Value) -> Option<Self> {
        let token = raw.get("sessionToken")?.as_str()?.to_string();
        let first_name = raw
            .get("firstName")
            .and_then(Value::as_str)
            .map(str::to_string);
        Some(Self {
            token,
            first_name,
            raw,
        })
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn first_name(&self) -> Option<&str> {
        self.first_name.as_deref()
    }

    /// Full sign-in response as returned by the server
    pub fn raw(&self) -> &Value {
        &self.raw
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("first_name", &self.first_name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_response() {
        let session = Session::from_response(json!({
            "sessionToken": "tok-123",
            "firstName": "Larsson",
            "consented": true
        }))
        .unwrap();

        assert_eq!(session.token(), "tok-123");
        assert_eq!(session.first_name(), Some("Larsson"));
        assert_eq!(session.raw()["consented"], json!(true));
        assert!(!format!("{session:?}").contains("tok-123"));
    }

    #[test]
    fn test_rejects_missing_token() {
        assert!(Session::from_response(json!({"firstName": "Larsson"})).is_none());
        assert!(Session::from_response(json!({"sessionToken": 5})).is_none());
        assert!(Session::from_response(json!("sessionToken")).is_none());
    }

    #[test]
    fn test_first_name_optional() {
        let session = Session::from_response(json!({"sessionToken": "t"})).unwrap();
        assert_eq!(session.first_name(), None);
    }
}
