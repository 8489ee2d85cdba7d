//! Infrastructure layer: configuration, the entitlements API client, in-memory
//! stores, and the sync service that ties them together.

pub mod config;
pub mod external;
pub mod store;
pub mod sync;

pub use config::{ConfigError, EntitlementsConfig};
pub use external::{EntitlementsApi, FetchError, FetchOutcome, HttpEntitlementsClient};
pub use store::{InMemoryLevelStore, InMemorySessionStore};
pub use sync::{EntitlementsSync, SyncError, SyncOutcome, UserEventHandler};
