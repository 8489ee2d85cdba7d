//! Service wiring: config → stores, API client, sync service.

use std::sync::Arc;

use anyhow::Context;

use entsync_infra::{
    EntitlementsSync, HttpEntitlementsClient, InMemoryLevelStore, InMemorySessionStore,
    UserEventHandler,
};

use crate::config::ApiConfig;

pub type AppSync = EntitlementsSync<Arc<InMemorySessionStore>, HttpEntitlementsClient, Arc<InMemoryLevelStore>>;

/// Everything request handlers need, shared behind an `Arc`.
#[derive(Clone)]
pub struct AppServices {
    pub events: Arc<dyn UserEventHandler>,
    pub sessions: Arc<InMemorySessionStore>,
    pub levels: Arc<InMemoryLevelStore>,
}

impl core::fmt::Debug for AppServices {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AppServices")
            .field("sessions", &self.sessions)
            .field("levels", &self.levels)
            .finish_non_exhaustive()
    }
}

/// In-memory session and level stores, HTTP entitlements client.
pub fn build_services(config: &ApiConfig) -> anyhow::Result<AppServices> {
    let sessions = Arc::new(InMemorySessionStore::new());
    let levels = Arc::new(
        InMemoryLevelStore::with_levels(config.levels.iter().cloned())
            .context("invalid level catalog")?,
    );
    let client = HttpEntitlementsClient::new(&config.entitlements)
        .context("failed to build entitlements client")?;

    tracing::info!(
        endpoint = %client.endpoint(),
        timeout_secs = config.entitlements.timeout.as_secs(),
        levels = levels.levels().len(),
        "entitlements sync configured"
    );

    let sync: AppSync = EntitlementsSync::new(sessions.clone(), client, levels.clone());

    Ok(AppServices {
        events: Arc::new(sync),
        sessions,
        levels,
    })
}
