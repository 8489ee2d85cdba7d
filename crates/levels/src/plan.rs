//! Desired-state computation: which levels to add and which to remove.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use serde_json::Value as JsonValue;

use entsync_core::LevelId;

use crate::entitlement::EntitlementsResponse;
use crate::level::LevelName;
use crate::store::{LevelStore, LevelStoreError};

/// An entitlement whose product code names no local level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnmappedEntitlement {
    pub product_code: String,
    pub entitlement: JsonValue,
}

/// Set difference between a user's current levels and the levels implied by
/// their entitlements.
///
/// `to_add` and `to_remove` are disjoint, so the order in which they are applied
/// does not affect the end state.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelPlan {
    pub current: BTreeSet<LevelId>,
    pub desired: BTreeSet<LevelId>,
    pub to_add: BTreeSet<LevelId>,
    pub to_remove: BTreeSet<LevelId>,
    pub unmapped: Vec<UnmappedEntitlement>,
}

impl LevelPlan {
    /// Resolve every entitlement to a level and diff against `current`.
    ///
    /// A failed lookup aborts the plan: a partially resolved desired set would
    /// revoke levels the user is still entitled to.
    pub fn build<S>(
        current: BTreeSet<LevelId>,
        response: &EntitlementsResponse,
        store: &S,
    ) -> Result<Self, LevelStoreError>
    where
        S: LevelStore + ?Sized,
    {
        let mut resolved: BTreeMap<LevelName, Option<LevelId>> = BTreeMap::new();
        let mut desired = BTreeSet::new();
        let mut unmapped = Vec::new();

        for entitlement in response.entitlements() {
            let name = entitlement.level_name();
            let level_id = match resolved.get(&name) {
                Some(cached) => *cached,
                None => {
                    let found = store.level_by_name(&name)?.map(|level| level.id);
                    resolved.insert(name.clone(), found);
                    found
                }
            };

            match level_id {
                Some(id) => {
                    desired.insert(id);
                }
                None => {
                    let json = entitlement.to_json();
                    tracing::warn!(level_name = %name, entitlement = %json, "no level found for entitlement");
                    unmapped.push(UnmappedEntitlement {
                        product_code: entitlement.product_code.clone(),
                        entitlement: json,
                    });
                }
            }
        }

        Ok(Self::diff(current, desired).with_unmapped(unmapped))
    }

    /// Pure set difference.
    pub fn diff(current: BTreeSet<LevelId>, desired: BTreeSet<LevelId>) -> Self {
        let to_add = desired.difference(&current).copied().collect();
        let to_remove = current.difference(&desired).copied().collect();
        Self {
            current,
            desired,
            to_add,
            to_remove,
            unmapped: Vec::new(),
        }
    }

    fn with_unmapped(mut self, unmapped: Vec<UnmappedEntitlement>) -> Self {
        self.unmapped = unmapped;
        self
    }

    /// Levels held now and still implied by entitlements.
    pub fn unchanged(&self) -> BTreeSet<LevelId> {
        self.current.intersection(&self.desired).copied().collect()
    }

    pub fn is_noop(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}
