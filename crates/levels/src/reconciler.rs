//! Applying a [`LevelPlan`] to the level store.
//!
//! The store has no transactions. Each add/remove is attempted independently; a
//! failing mutation is logged and recorded in the report, and its siblings still
//! run. Callers inspect [`ReconcileReport::is_complete`] to learn whether the
//! user's levels now match their entitlements.

use chrono::{DateTime, Utc};
use serde::Serialize;

use entsync_core::{LevelId, ReconciliationId, UserId};

use crate::entitlement::EntitlementsResponse;
use crate::plan::LevelPlan;
use crate::store::{LevelStore, LevelStoreError};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", content = "level_id", rename_all = "snake_case")]
pub enum LevelMutation {
    Add(LevelId),
    Remove(LevelId),
}

impl core::fmt::Display for LevelMutation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            LevelMutation::Add(id) => write!(f, "add level {id}"),
            LevelMutation::Remove(id) => write!(f, "remove level {id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MutationFailure {
    pub mutation: LevelMutation,
    pub error: String,
}

/// Outcome of one reconciliation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconcileReport {
    pub run_id: ReconciliationId,
    pub user_id: UserId,
    pub added: Vec<LevelId>,
    pub removed: Vec<LevelId>,
    pub unchanged: Vec<LevelId>,
    /// Product codes that matched no level.
    pub unmapped: Vec<String>,
    pub failures: Vec<MutationFailure>,
    pub completed_at: DateTime<Utc>,
}

impl ReconcileReport {
    /// True when every planned mutation was applied.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// True when nothing had to change.
    pub fn is_noop(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.failures.is_empty()
    }
}

/// Brings a user's assigned levels in line with their entitlements.
#[derive(Debug, Clone)]
pub struct LevelReconciler<S> {
    store: S,
}

impl<S> LevelReconciler<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S> LevelReconciler<S>
where
    S: LevelStore,
{
    /// Read current levels, plan, apply.
    ///
    /// Errors only when nothing was mutated (current levels or a level lookup
    /// could not be read). Mutation failures are reported, not returned.
    pub fn reconcile(
        &self,
        user_id: UserId,
        response: &EntitlementsResponse,
    ) -> Result<ReconcileReport, LevelStoreError> {
        let run_id = ReconciliationId::new();

        let current = self.store.user_levels(user_id).inspect_err(|e| {
            tracing::error!(%run_id, %user_id, error = %e, "failed to read current levels");
        })?;

        let plan = LevelPlan::build(current, response, &self.store).inspect_err(|e| {
            tracing::error!(%run_id, %user_id, error = %e, "failed to resolve entitlement levels");
        })?;

        Ok(self.apply(run_id, user_id, plan))
    }

    /// Apply a precomputed plan. Removals run first, then additions.
    pub fn apply(&self, run_id: ReconciliationId, user_id: UserId, plan: LevelPlan) -> ReconcileReport {
        let mut added = Vec::with_capacity(plan.to_add.len());
        let mut removed = Vec::with_capacity(plan.to_remove.len());
        let mut failures = Vec::new();

        let mutations = plan
            .to_remove
            .iter()
            .map(|id| LevelMutation::Remove(*id))
            .chain(plan.to_add.iter().map(|id| LevelMutation::Add(*id)));

        for mutation in mutations {
            let result = match mutation {
                LevelMutation::Add(level_id) => self.store.add_user_level(user_id, level_id),
                LevelMutation::Remove(level_id) => self.store.remove_user_level(user_id, level_id),
            };

            match (result, mutation) {
                (Ok(()), LevelMutation::Add(level_id)) => {
                    tracing::debug!(%run_id, %user_id, %level_id, "level added");
                    added.push(level_id);
                }
                (Ok(()), LevelMutation::Remove(level_id)) => {
                    tracing::debug!(%run_id, %user_id, %level_id, "level removed");
                    removed.push(level_id);
                }
                (Err(e), mutation) => {
                    tracing::error!(%run_id, %user_id, error = %e, "failed to {mutation}");
                    failures.push(MutationFailure {
                        mutation,
                        error: e.to_string(),
                    });
                }
            }
        }

        let report = ReconcileReport {
            run_id,
            user_id,
            added,
            removed,
            unchanged: plan.unchanged().into_iter().collect(),
            unmapped: plan.unmapped.into_iter().map(|u| u.product_code).collect(),
            failures,
            completed_at: Utc::now(),
        };

        tracing::info!(
            %run_id,
            %user_id,
            added = report.added.len(),
            removed = report.removed.len(),
            unchanged = report.unchanged.len(),
            unmapped = report.unmapped.len(),
            failed = report.failures.len(),
            "levels reconciled"
        );

        report
    }
}
