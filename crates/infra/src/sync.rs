//! Entitlement refresh pipeline.
//!
//! ```text
//! trigger (login / on-demand refresh)
//!   ↓
//! 1. access token from the stored token response   (absent → stop)
//!   ↓
//! 2. GET me/entitlements                            (error → stop, 404 → stop)
//!   ↓
//! 3. plan + apply level changes
//! ```
//!
//! A stop never touches the user's levels. In particular a 404 does not revoke
//! anything: a missing entitlements record is not evidence that the user lost
//! access.

use async_trait::async_trait;
use thiserror::Error;

use entsync_auth::{SessionStore, TokenAccessor, TokenError};
use entsync_core::UserId;
use entsync_levels::{LevelReconciler, LevelStore, LevelStoreError, ReconcileReport};

use crate::external::{EntitlementsApi, FetchError, FetchOutcome};

#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    Reconciled(ReconcileReport),
    /// The API has no record for the user; levels were left as they were.
    NoEntitlementsRecord,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SyncError {
    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("level store error: {0}")]
    Store(#[from] LevelStoreError),
}

/// Host-facing event interface.
///
/// Handlers never fail outward: every problem is logged and the triggering
/// request carries on.
#[async_trait]
pub trait UserEventHandler: Send + Sync {
    async fn on_user_login(&self, user_id: UserId);

    async fn on_entitlements_refresh_requested(&self, user_id: UserId);
}

/// Refreshes a user's levels from their SSO entitlements.
#[derive(Debug)]
pub struct EntitlementsSync<S, A, L> {
    tokens: TokenAccessor<S>,
    api: A,
    reconciler: LevelReconciler<L>,
}

impl<S, A, L> EntitlementsSync<S, A, L> {
    pub fn new(sessions: S, api: A, levels: L) -> Self {
        Self {
            tokens: TokenAccessor::new(sessions),
            api,
            reconciler: LevelReconciler::new(levels),
        }
    }

    pub fn sessions(&self) -> &S {
        self.tokens.sessions()
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn levels(&self) -> &L {
        self.reconciler.store()
    }
}

impl<S, A, L> EntitlementsSync<S, A, L>
where
    S: SessionStore,
    A: EntitlementsApi,
    L: LevelStore,
{
    /// Run one refresh for `user_id`: exactly one API call when a token exists,
    /// none otherwise.
    pub async fn refresh_user_entitlements(&self, user_id: UserId) -> Result<SyncOutcome, SyncError> {
        let token = self.tokens.access_token(user_id)?;

        let outcome = self.api.fetch(&token).await.inspect_err(|e| match e {
            FetchError::Status { status, body } => tracing::error!(
                %user_id,
                status,
                %body,
                "entitlements query for user {user_id} resulted in {status} status code"
            ),
            other => tracing::error!(%user_id, error = %other, "entitlements query failed"),
        })?;

        match outcome {
            FetchOutcome::NotFound => {
                tracing::info!(%user_id, "entitlements query for user {user_id} returned: not found");
                Ok(SyncOutcome::NoEntitlementsRecord)
            }
            FetchOutcome::Entitlements(response) => {
                tracing::debug!(
                    %user_id,
                    scopes = response.scopes.len(),
                    entitlements = response.entitlements().count(),
                    "received entitlements"
                );
                let report = self.reconciler.reconcile(user_id, &response)?;
                Ok(SyncOutcome::Reconciled(report))
            }
        }
    }

    async fn run_trigger(&self, trigger: &'static str, user_id: UserId) {
        match self.refresh_user_entitlements(user_id).await {
            Ok(SyncOutcome::Reconciled(report)) if !report.is_complete() => {
                tracing::warn!(
                    trigger,
                    %user_id,
                    run_id = %report.run_id,
                    failed = report.failures.len(),
                    "entitlement refresh applied partially"
                );
            }
            Ok(_) => tracing::debug!(trigger, %user_id, "entitlement refresh finished"),
            // Already logged where it was detected.
            Err(SyncError::Token(_)) | Err(SyncError::Fetch(_)) => {
                tracing::info!(trigger, %user_id, "entitlement refresh skipped");
            }
            Err(SyncError::Store(e)) => {
                tracing::error!(trigger, %user_id, error = %e, "entitlement refresh aborted");
            }
        }
    }
}

#[async_trait]
impl<S, A, L> UserEventHandler for EntitlementsSync<S, A, L>
where
    S: SessionStore,
    A: EntitlementsApi,
    L: LevelStore,
{
    async fn on_user_login(&self, user_id: UserId) {
        self.run_trigger("login", user_id).await;
    }

    async fn on_entitlements_refresh_requested(&self, user_id: UserId) {
        self.run_trigger("refresh_requested", user_id).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use serde_json::json;
    use tracing_subscriber::fmt::MakeWriter;

    use entsync_auth::{AccessToken, LAST_TOKEN_RESPONSE_KEY};
    use entsync_core::LevelId;
    use entsync_levels::{Entitlement, EntitlementsResponse, Level};

    use super::*;
    use crate::store::{InMemoryLevelStore, InMemorySessionStore};

    /// Canned API that counts calls and remembers the last bearer token.
    struct StubApi {
        reply: Result<FetchOutcome, FetchError>,
        calls: AtomicUsize,
        last_token: Mutex<Option<String>>,
    }

    impl StubApi {
        fn new(reply: Result<FetchOutcome, FetchError>) -> Self {
            Self {
                reply,
                calls: AtomicUsize::new(0),
                last_token: Mutex::new(None),
            }
        }

        fn entitled_to(codes: &[&str]) -> Self {
            let response: EntitlementsResponse = codes.iter().map(|c| Entitlement::new(*c)).collect();
            Self::new(Ok(FetchOutcome::Entitlements(response)))
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl EntitlementsApi for StubApi {
        async fn fetch(&self, token: &AccessToken) -> Result<FetchOutcome, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_token.lock().unwrap() = Some(token.as_str().to_string());
            self.reply.clone()
        }
    }

    /// Log sink for asserting on emitted diagnostics.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn lines(&self) -> Vec<String> {
            String::from_utf8_lossy(&self.0.lock().unwrap())
                .lines()
                .map(str::to_string)
                .collect()
        }
    }

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn user() -> UserId {
        UserId::new(5)
    }

    fn levels() -> InMemoryLevelStore {
        InMemoryLevelStore::with_levels([
            Level::new(LevelId::new(1), "a"),
            Level::new(LevelId::new(2), "b"),
            Level::new(LevelId::new(3), "c"),
        ])
        .unwrap()
    }

    fn sessions_with_token(token: &str) -> InMemorySessionStore {
        let sessions = InMemorySessionStore::new();
        sessions.put(user(), LAST_TOKEN_RESPONSE_KEY, json!({ "access_token": token }));
        sessions
    }

    fn assign(store: &InMemoryLevelStore, ids: &[u64]) {
        for id in ids {
            store.add_user_level(user(), LevelId::new(*id)).unwrap();
        }
    }

    fn current(sync: &EntitlementsSync<InMemorySessionStore, StubApi, InMemoryLevelStore>) -> Vec<u64> {
        sync.levels()
            .user_levels(user())
            .unwrap()
            .into_iter()
            .map(LevelId::get)
            .collect()
    }

    #[tokio::test]
    async fn reconciles_levels_from_entitlements() {
        let sync = EntitlementsSync::new(sessions_with_token("tok"), StubApi::entitled_to(&["B", "c"]), levels());
        assign(sync.levels(), &[1, 2]);

        let outcome = sync.refresh_user_entitlements(user()).await.unwrap();

        let SyncOutcome::Reconciled(report) = outcome else {
            panic!("expected reconciliation");
        };
        assert_eq!(report.added, vec![LevelId::new(3)]);
        assert_eq!(report.removed, vec![LevelId::new(1)]);
        assert_eq!(current(&sync), vec![2, 3]);
        assert_eq!(sync.api().last_token.lock().unwrap().as_deref(), Some("tok"));
    }

    #[tokio::test]
    async fn missing_token_makes_no_calls_and_no_changes() {
        let sync = EntitlementsSync::new(InMemorySessionStore::new(), StubApi::entitled_to(&["a"]), levels());
        assign(sync.levels(), &[2]);

        let err = sync.refresh_user_entitlements(user()).await.unwrap_err();

        assert_eq!(err, SyncError::Token(TokenError::MissingSession { user_id: user() }));
        assert_eq!(sync.api().calls(), 0);
        assert_eq!(current(&sync), vec![2]);
    }

    #[tokio::test]
    async fn empty_token_makes_no_calls() {
        let sync = EntitlementsSync::new(sessions_with_token(""), StubApi::entitled_to(&["a"]), levels());

        let err = sync.refresh_user_entitlements(user()).await.unwrap_err();

        assert!(matches!(err, SyncError::Token(TokenError::MissingToken { .. })));
        assert_eq!(sync.api().calls(), 0);
    }

    #[tokio::test]
    async fn not_found_preserves_levels() {
        let sync = EntitlementsSync::new(
            sessions_with_token("tok"),
            StubApi::new(Ok(FetchOutcome::NotFound)),
            levels(),
        );
        assign(sync.levels(), &[1, 3]);

        let outcome = sync.refresh_user_entitlements(user()).await.unwrap();

        assert_eq!(outcome, SyncOutcome::NoEntitlementsRecord);
        assert_eq!(sync.api().calls(), 1);
        assert_eq!(current(&sync), vec![1, 3]);
    }

    #[tokio::test]
    async fn server_error_changes_nothing_and_keeps_diagnostics() {
        let sync = EntitlementsSync::new(
            sessions_with_token("tok"),
            StubApi::new(Err(FetchError::Status {
                status: 500,
                body: "internal error".to_string(),
            })),
            levels(),
        );
        assign(sync.levels(), &[1]);

        let err = sync.refresh_user_entitlements(user()).await.unwrap_err();

        let SyncError::Fetch(FetchError::Status { status, body }) = err else {
            panic!("expected status error");
        };
        assert_eq!(status, 500);
        assert_eq!(body, "internal error");
        assert_eq!(current(&sync), vec![1]);
    }

    #[tokio::test]
    async fn server_error_is_logged_once_with_status_and_body() {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let sync = EntitlementsSync::new(
            sessions_with_token("tok"),
            StubApi::new(Err(FetchError::Status {
                status: 500,
                body: "internal error".to_string(),
            })),
            levels(),
        );
        assert!(sync.refresh_user_entitlements(user()).await.is_err());

        let errors: Vec<_> = logs.lines().into_iter().filter(|l| l.contains("ERROR")).collect();
        assert_eq!(errors.len(), 1, "{errors:?}");
        assert!(errors[0].contains("status=500"), "{}", errors[0]);
        assert!(errors[0].contains("internal error"), "{}", errors[0]);
        assert!(!errors[0].contains("tok"), "{}", errors[0]);
    }

    #[tokio::test]
    async fn malformed_response_changes_nothing() {
        let sync = EntitlementsSync::new(
            sessions_with_token("tok"),
            StubApi::new(Err(FetchError::Malformed {
                message: "expected value".into(),
                body: "oops".into(),
            })),
            levels(),
        );
        assign(sync.levels(), &[1, 2]);

        assert!(sync.refresh_user_entitlements(user()).await.is_err());
        assert_eq!(current(&sync), vec![1, 2]);
    }

    #[tokio::test]
    async fn event_handlers_run_a_refresh() {
        let sync = EntitlementsSync::new(sessions_with_token("tok"), StubApi::entitled_to(&["A"]), levels());
        let handler: &dyn UserEventHandler = &sync;

        handler.on_user_login(user()).await;
        assert_eq!(current(&sync), vec![1]);

        handler.on_entitlements_refresh_requested(user()).await;
        assert_eq!(sync.api().calls(), 2);
        assert_eq!(current(&sync), vec![1]);
    }

    #[tokio::test]
    async fn event_handlers_swallow_failures() {
        let sync = EntitlementsSync::new(InMemorySessionStore::new(), StubApi::entitled_to(&["A"]), levels());
        sync.on_user_login(user()).await;
        sync.on_entitlements_refresh_requested(user()).await;
        assert_eq!(sync.api().calls(), 0);
    }
}
