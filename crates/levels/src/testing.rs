//! In-crate level store fake with call counters and failure injection.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use entsync_core::{LevelId, UserId};

use crate::level::{Level, LevelName};
use crate::store::{LevelStore, LevelStoreError};

#[derive(Debug, Default)]
struct State {
    levels: Vec<Level>,
    assignments: BTreeMap<UserId, BTreeSet<LevelId>>,
    adds: Vec<(UserId, LevelId)>,
    removes: Vec<(UserId, LevelId)>,
    lookups: usize,
    fail_lookups: bool,
    fail_reads: bool,
    failing_mutations: BTreeSet<LevelId>,
}

#[derive(Debug, Default)]
pub struct RecordingStore {
    state: Mutex<State>,
}

impl RecordingStore {
    pub fn with_levels(levels: &[(u64, &str)]) -> Self {
        let store = Self::default();
        store.state.lock().unwrap().levels = levels
            .iter()
            .map(|(id, name)| Level::new(LevelId::new(*id), name))
            .collect();
        store
    }

    pub fn assign(&self, user_id: UserId, levels: &[u64]) {
        self.state
            .lock()
            .unwrap()
            .assignments
            .insert(user_id, levels.iter().copied().map(LevelId::new).collect());
    }

    pub fn levels_of(&self, user_id: UserId) -> BTreeSet<LevelId> {
        self.state
            .lock()
            .unwrap()
            .assignments
            .get(&user_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn adds(&self) -> Vec<(UserId, LevelId)> {
        self.state.lock().unwrap().adds.clone()
    }

    pub fn removes(&self) -> Vec<(UserId, LevelId)> {
        self.state.lock().unwrap().removes.clone()
    }

    pub fn lookups(&self) -> usize {
        self.state.lock().unwrap().lookups
    }

    pub fn reset_calls(&self) {
        let mut state = self.state.lock().unwrap();
        state.adds.clear();
        state.removes.clear();
        state.lookups = 0;
    }

    pub fn fail_lookups(&self) {
        self.state.lock().unwrap().fail_lookups = true;
    }

    pub fn fail_reads(&self) {
        self.state.lock().unwrap().fail_reads = true;
    }

    pub fn fail_mutations_of(&self, level_id: u64) {
        self.state
            .lock()
            .unwrap()
            .failing_mutations
            .insert(LevelId::new(level_id));
    }
}

impl LevelStore for RecordingStore {
    fn user_levels(&self, user_id: UserId) -> Result<BTreeSet<LevelId>, LevelStoreError> {
        let state = self.state.lock().unwrap();
        if state.fail_reads {
            return Err(LevelStoreError::Unavailable("reads disabled".into()));
        }
        Ok(state.assignments.get(&user_id).cloned().unwrap_or_default())
    }

    fn level_by_name(&self, name: &LevelName) -> Result<Option<Level>, LevelStoreError> {
        let mut state = self.state.lock().unwrap();
        state.lookups += 1;
        if state.fail_lookups {
            return Err(LevelStoreError::Unavailable("lookups disabled".into()));
        }
        Ok(state.levels.iter().find(|l| &l.name == name).cloned())
    }

    fn add_user_level(&self, user_id: UserId, level_id: LevelId) -> Result<(), LevelStoreError> {
        let mut state = self.state.lock().unwrap();
        state.adds.push((user_id, level_id));
        if state.failing_mutations.contains(&level_id) {
            return Err(LevelStoreError::Unavailable(format!("cannot add {level_id}")));
        }
        state.assignments.entry(user_id).or_default().insert(level_id);
        Ok(())
    }

    fn remove_user_level(&self, user_id: UserId, level_id: LevelId) -> Result<(), LevelStoreError> {
        let mut state = self.state.lock().unwrap();
        state.removes.push((user_id, level_id));
        if state.failing_mutations.contains(&level_id) {
            return Err(LevelStoreError::Unavailable(format!("cannot remove {level_id}")));
        }
        state.assignments.entry(user_id).or_default().remove(&level_id);
        Ok(())
    }
}
