//! In-memory implementations of the host-owned stores, for development and tests.

pub mod levels;
pub mod sessions;

pub use levels::InMemoryLevelStore;
pub use sessions::InMemorySessionStore;
