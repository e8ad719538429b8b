use std::fmt;

use keyring::Entry;
use serde::Serialize;
use tracing::debug;

const SERVICE_NAME: &str = "bridgeclient";

/// Sign-in request body.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub study: String,
    pub email: String,
    pub password: String,
    #[serde(rename = "type")]
    pub account_type: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("study", &self.study)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("account_type", &self.account_type)
            .finish()
    }
}

/// Where "remember me" passwords are kept between runs.
pub trait PasswordStore {
    fn save(&self, email: &str, password: &str) -> keyring::Result<()>;

    /// Stored password for `email`, if there is one
    fn load(&self, email: &str) -> Option<String>;
}

/// Passwords in the OS keychain, one entry per email.
#[derive(Debug, Default, Clone, Copy)]
pub struct CredentialStore;

impl PasswordStore for CredentialStore {
    fn save(&self, email: &str, password: &str) -> keyring::Result<()> {
        Entry::new(SERVICE_NAME, email)?.set_password(password)
    }

    fn load(&self, email: &str) -> Option<String> {
        match Entry::new(SERVICE_NAME, email).and_then(|entry| entry.get_password()) {
            Ok(password) => Some(password),
            Err(keyring::Error::NoEntry) => None,
            Err(e) => {
                debug!(error = %e, "Keychain lookup failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> Credentials {
        Credentials {
            study: "parkinson".into(),
            email: "a@b.com".into(),
            password: "hunter2".into(),
            account_type: "researcher".into(),
        }
    }

    #[test]
    fn test_sign_in_body() {
        let body = serde_json::to_value(credentials()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "study": "parkinson",
                "email": "a@b.com",
                "password": "hunter2",
                "type": "researcher"
            })
        );
    }

    #[test]
    fn test_keychain_round_trip() {
        let email = format!("keychain-test-{}@example.org", std::process::id());
        let store = CredentialStore;

        // Hosts without a usable keychain refuse the save; nothing to check there
        if store.save(&email, "hunter2").is_err() {
            return;
        }
        assert_eq!(store.load(&email).as_deref(), Some("hunter2"));

        Entry::new(SERVICE_NAME, &email)
            .unwrap()
            .delete_credential()
            .unwrap();
        assert_eq!(store.load(&email), None);
    }

    #[test]
    fn test_debug_redacts_password() {
        let debug = format!("{:?}", credentials());
        assert!(debug.contains("a@b.com"));
        assert!(!debug.contains("hunter2"));
    }
}
