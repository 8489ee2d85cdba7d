use std::collections::BTreeSet;
use std::sync::Arc;

use thiserror::Error;

use entsync_core::{LevelId, UserId};

use crate::level::{Level, LevelName};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LevelStoreError {
    #[error("level store unavailable: {0}")]
    Unavailable(String),

    #[error("unknown level {0}")]
    UnknownLevel(LevelId),

    #[error("level conflict: {0}")]
    Conflict(String),
}

/// Host-owned level storage.
///
/// Every mutation is independent; the store offers no transactions.
pub trait LevelStore: Send + Sync {
    fn user_levels(&self, user_id: UserId) -> Result<BTreeSet<LevelId>, LevelStoreError>;

    /// Case-insensitive lookup (`name` is already lower-cased).
    fn level_by_name(&self, name: &LevelName) -> Result<Option<Level>, LevelStoreError>;

    fn add_user_level(&self, user_id: UserId, level_id: LevelId) -> Result<(), LevelStoreError>;

    fn remove_user_level(&self, user_id: UserId, level_id: LevelId) -> Result<(), LevelStoreError>;
}

impl<S> LevelStore for Arc<S>
where
    S: LevelStore + ?Sized,
{
    fn user_levels(&self, user_id: UserId) -> Result<BTreeSet<LevelId>, LevelStoreError> {
        (**self).user_levels(user_id)
    }

    fn level_by_name(&self, name: &LevelName) -> Result<Option<Level>, LevelStoreError> {
        (**self).level_by_name(name)
    }

    fn add_user_level(&self, user_id: UserId, level_id: LevelId) -> Result<(), LevelStoreError> {
        (**self).add_user_level(user_id, level_id)
    }

    fn remove_user_level(&self, user_id: UserId, level_id: LevelId) -> Result<(), LevelStoreError> {
        (**self).remove_user_level(user_id, level_id)
    }
}

impl<S> LevelStore for &S
where
    S: LevelStore + ?Sized,
{
    fn user_levels(&self, user_id: UserId) -> Result<BTreeSet<LevelId>, LevelStoreError> {
        (**self).user_levels(user_id)
    }

    fn level_by_name(&self, name: &LevelName) -> Result<Option<Level>, LevelStoreError> {
        (**self).level_by_name(name)
    }

    fn add_user_level(&self, user_id: UserId, level_id: LevelId) -> Result<(), LevelStoreError> {
        (**self).add_user_level(user_id, level_id)
    }

    fn remove_user_level(&self, user_id: UserId, level_id: LevelId) -> Result<(), LevelStoreError> {
        (**self).remove_user_level(user_id, level_id)
    }
}
