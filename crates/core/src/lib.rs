//! `entsync-core` — identifiers and error primitives shared by every crate.
//!
//! Nothing here performs IO.

pub mod error;
pub mod id;

pub use error::DomainError;
pub use id::{LevelId, ReconciliationId, UserId};
