//! `entsync-levels` — mapping entitlements onto local access levels.
//!
//! The crate is storage-agnostic: the level store is a trait supplied by the host.

pub mod entitlement;
pub mod level;
pub mod plan;
pub mod reconciler;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use entitlement::{Entitlement, EntitlementsResponse, Scope};
pub use level::{Level, LevelName};
pub use plan::{LevelPlan, UnmappedEntitlement};
pub use reconciler::{LevelMutation, LevelReconciler, MutationFailure, ReconcileReport};
pub use store::{LevelStore, LevelStoreError};
