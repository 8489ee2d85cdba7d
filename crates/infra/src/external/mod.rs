//! External service clients/adapters.

pub mod entitlements_client;

pub use entitlements_client::{EntitlementsApi, FetchError, FetchOutcome, HttpEntitlementsClient};
