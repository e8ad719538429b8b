//! Client library for the Bridge research-data platform.
//!
//! ```no_run
//! use bridgeclient_core::BridgeConnector;
//!
//! # fn main() -> Result<(), bridgeclient_core::BridgeError> {
//! let bridge = BridgeConnector::builder()
//!     .email("researcher@example.org")
//!     .password("secret")
//!     .connect()?;
//!
//! let participants = bridge.participants(None, None)?;
//! println!("{} participants", participants.len());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{BridgeConnector, BridgeConnectorBuilder, BridgeError, RequestOptions, ResponseBody};
pub use auth::{CredentialPrompt, CredentialStore, PasswordStore, Session, TerminalPrompt};
pub use config::ConfigStore;
pub use models::{Participant, ParticipantTable};
