use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::RwLock;

use entsync_core::{LevelId, UserId};
use entsync_levels::{Level, LevelName, LevelStore, LevelStoreError};

#[derive(Debug, Default)]
struct Inner {
    levels: BTreeMap<LevelId, Level>,
    assignments: HashMap<UserId, BTreeSet<LevelId>>,
}

/// Level catalog and user assignments held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryLevelStore {
    inner: RwLock<Inner>,
}

fn poisoned<T>(_: T) -> LevelStoreError {
    LevelStoreError::Unavailable("level store lock poisoned".to_string())
}

impl InMemoryLevelStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_levels(levels: impl IntoIterator<Item = Level>) -> Result<Self, LevelStoreError> {
        let store = Self::new();
        for level in levels {
            store.create_level(level)?;
        }
        Ok(store)
    }

    /// Register a level. Ids and (case-insensitive) names must be unique.
    pub fn create_level(&self, level: Level) -> Result<(), LevelStoreError> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        if inner.levels.contains_key(&level.id) {
            return Err(LevelStoreError::Conflict(format!("level id {} already exists", level.id)));
        }
        if inner.levels.values().any(|l| l.name == level.name) {
            return Err(LevelStoreError::Conflict(format!("level name {} already exists", level.name)));
        }
        inner.levels.insert(level.id, level);
        Ok(())
    }

    pub fn levels(&self) -> Vec<Level> {
        match self.inner.read() {
            Ok(inner) => inner.levels.values().cloned().collect(),
            Err(_) => vec![],
        }
    }
}

impl LevelStore for InMemoryLevelStore {
    fn user_levels(&self, user_id: UserId) -> Result<BTreeSet<LevelId>, LevelStoreError> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.assignments.get(&user_id).cloned().unwrap_or_default())
    }

    fn level_by_name(&self, name: &LevelName) -> Result<Option<Level>, LevelStoreError> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.levels.values().find(|l| &l.name == name).cloned())
    }

    fn add_user_level(&self, user_id: UserId, level_id: LevelId) -> Result<(), LevelStoreError> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        if !inner.levels.contains_key(&level_id) {
            return Err(LevelStoreError::UnknownLevel(level_id));
        }
        inner.assignments.entry(user_id).or_default().insert(level_id);
        Ok(())
    }

    fn remove_user_level(&self, user_id: UserId, level_id: LevelId) -> Result<(), LevelStoreError> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        if let Some(levels) = inner.assignments.get_mut(&user_id) {
            levels.remove(&level_id);
        }
        Ok(())
    }
}
