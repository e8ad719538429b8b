//! REST client for the Bridge research platform.
//!
//! `BridgeConnector` signs in once and attaches the resulting session token
//! to every later request as the `Bridge-Session` header. Relative URIs are
//! resolved against the platform base URL; absolute ones are used as given.

pub mod client;
pub mod error;
pub mod request;

pub use client::{BridgeConnector, BridgeConnectorBuilder, BASE_URL};
pub use error::BridgeError;
pub use request::{RequestOptions, ResponseBody};
