//! Authentication module for Bridge sign-in.
//!
//! This module provides:
//! - `Credentials`: what is sent to `/v3/auth/signIn`
//! - `Session`: the decoded sign-in response, held in memory only
//! - `CredentialPrompt`: where credentials come from when none are configured
//! - `PasswordStore`: storage for "remember me", `CredentialStore` in the OS keychain

pub mod credentials;
pub mod prompt;
pub mod session;

pub use credentials::{CredentialStore, Credentials, PasswordStore};
pub use prompt::{CredentialPrompt, TerminalPrompt};
pub use session::Session;
