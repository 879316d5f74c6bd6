//! Session Client Orchestrator
//!
//! Ties storage, transport and the state machine together. Every
//! mutating operation snapshots the generation counter before its
//! network call and applies the result only if no newer operation ran
//! in the meantime; the counter makes logout dominate any in-flight
//! validation.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::api::{AuthApi, HttpAuthApi, Profile, SessionPayload};
use crate::error::SessionError;
use crate::state::{Freshness, SessionState, StoredSession};
use crate::storage::SessionStorage;

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the production transport for this configuration
    pub fn build_api(&self) -> Result<HttpAuthApi, SessionError> {
        HttpAuthApi::new(self.base_url.clone(), self.timeout)
    }
}

/// Client-side session manager
pub struct SessionClient<A, S>
where
    A: AuthApi + Sync,
    S: SessionStorage,
{
    api: A,
    storage: S,
    state: Mutex<SessionState>,
    generation: AtomicU64,
}

impl<A, S> SessionClient<A, S>
where
    A: AuthApi + Sync,
    S: SessionStorage,
{
    pub fn new(api: A, storage: S) -> Self {
        Self {
            api,
            storage,
            state: Mutex::new(SessionState::Unauthenticated),
            generation: AtomicU64::new(0),
        }
    }

    /// Current state snapshot
    pub fn state(&self) -> SessionState {
        self.lock_state().clone()
    }

    /// Restore the persisted session without touching the network
    ///
    /// The restored session is `Stale` until `check_auth` confirms it.
    pub fn restore(&self) -> Result<bool, SessionError> {
        match self.storage.load()? {
            Some(session) => {
                self.set_state(SessionState::Trusted {
                    session,
                    freshness: Freshness::Stale,
                });
                Ok(true)
            }
            None => {
                self.set_state(SessionState::Unauthenticated);
                Ok(false)
            }
        }
    }

    /// Sign in
    ///
    /// On failure nothing local changes: a typo must not destroy a
    /// previously persisted session. A success that lost the race to
    /// a newer operation (e.g. logout) is reported but not applied.
    pub async fn login(
        &self,
        identifier: &str,
        password: &str,
        remember_me: bool,
    ) -> Result<Profile, SessionError> {
        let generation = self.current_generation();
        let payload = self.api.login(identifier, password, remember_me).await?;
        let session = record_from(&payload);
        let profile = payload.user;

        if !self.apply_session(generation, session) {
            tracing::debug!("Discarding login result that lost a generation race");
        }
        Ok(profile)
    }

    /// Sign out
    ///
    /// Local state is cleared before the server call; the revocation
    /// request is best-effort and its failure is not the user's
    /// problem.
    pub async fn logout(&self) -> Result<(), SessionError> {
        self.generation.fetch_add(1, Ordering::SeqCst);

        let access_token = self
            .state()
            .access_token()
            .map(str::to_string)
            .or_else(|| {
                self.storage
                    .load()
                    .ok()
                    .flatten()
                    .map(|s| s.access_token)
            });

        self.set_state(SessionState::Unauthenticated);
        self.storage.clear()?;

        if let Some(token) = access_token {
            if let Err(e) = self.api.logout(&token).await {
                tracing::debug!(error = %e, "Server-side logout failed; local session already cleared");
            }
        }
        Ok(())
    }

    /// Re-validate the persisted session against the server
    ///
    /// Returns whether the client ended up authenticated. Any
    /// validation failure - bad token, disabled account, timeout -
    /// clears storage and demotes to `Unauthenticated`; a stale
    /// result that lost a generation race is dropped.
    pub async fn check_auth(&self) -> Result<bool, SessionError> {
        let Some(session) = self.storage.load()? else {
            self.set_state(SessionState::Unauthenticated);
            return Ok(false);
        };

        // Optimistic render first, then the confirmation round-trip
        self.set_state(SessionState::Trusted {
            session: session.clone(),
            freshness: Freshness::Stale,
        });
        let generation = self.current_generation();
        self.set_state(SessionState::Verifying {
            session: session.clone(),
        });

        match self.api.me(&session.access_token).await {
            Ok(profile) => {
                let mut updated = session;
                updated.profile = profile;
                Ok(self.apply_session(generation, updated))
            }
            Err(SessionError::TokenExpired) if session.refresh_token.is_some() => {
                self.refresh_after_expiry(generation, &session).await
            }
            Err(e) => {
                tracing::debug!(error = %e, "Session validation failed");
                self.clear_if_current(generation)?;
                Ok(false)
            }
        }
    }

    /// Rotate the refresh token and persist the new pair
    ///
    /// Callers that hit `TokenExpired` on a protected endpoint call
    /// this once and retry with the returned access token; if the
    /// rotation itself fails the local session is gone and the caller
    /// gives up.
    pub async fn refresh(&self) -> Result<String, SessionError> {
        let session = self
            .storage
            .load()?
            .ok_or(SessionError::Unauthenticated)?;
        let refresh_token = session
            .refresh_token
            .clone()
            .ok_or(SessionError::TokenInvalid)?;

        let generation = self.current_generation();
        match self.api.refresh(&refresh_token).await {
            Ok(payload) => {
                let new_session = record_from(&payload);
                let token = new_session.access_token.clone();
                self.apply_session(generation, new_session);
                Ok(token)
            }
            Err(e) => {
                self.clear_if_current(generation)?;
                Err(e)
            }
        }
    }

    // ========================================================================
    // Internals
    // ========================================================================

    async fn refresh_after_expiry(
        &self,
        generation: u64,
        session: &StoredSession,
    ) -> Result<bool, SessionError> {
        let refresh_token = session.refresh_token.as_deref().unwrap_or_default();
        match self.api.refresh(refresh_token).await {
            Ok(payload) => Ok(self.apply_session(generation, record_from(&payload))),
            Err(e) => {
                tracing::debug!(error = %e, "Refresh after expiry failed");
                self.clear_if_current(generation)?;
                Ok(false)
            }
        }
    }

    /// Persist and trust `session` unless a newer operation ran
    fn apply_session(&self, generation: u64, session: StoredSession) -> bool {
        if self.current_generation() != generation {
            return false;
        }
        if let Err(e) = self.storage.save(&session) {
            tracing::warn!(error = %e, "Failed to persist session record");
        }
        self.set_state(SessionState::Trusted {
            session,
            freshness: Freshness::Fresh,
        });
        true
    }

    fn clear_if_current(&self, generation: u64) -> Result<(), SessionError> {
        if self.current_generation() != generation {
            return Ok(());
        }
        self.set_state(SessionState::Unauthenticated);
        self.storage.clear()
    }

    fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn set_state(&self, state: SessionState) {
        *self.lock_state() = state;
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, SessionState> {
        // A poisoned lock only means another thread panicked mid-store;
        // the state itself is a plain value.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn record_from(payload: &SessionPayload) -> StoredSession {
    StoredSession {
        access_token: payload.tokens.access_token.clone(),
        refresh_token: Some(payload.tokens.refresh_token.clone()),
        access_expires_at: payload.tokens.access_expires_at,
        profile: payload.user.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::TokenPayload;
    use crate::storage::MemoryStorage;
    use std::collections::VecDeque;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    fn profile(name: &str) -> Profile {
        Profile {
            account_id: "7e3f".to_string(),
            user_name: name.to_string(),
            email: format!("{name}@example.com"),
            role: "author".to_string(),
        }
    }

    fn payload(name: &str, access: &str, refresh: &str) -> SessionPayload {
        SessionPayload {
            user: profile(name),
            tokens: TokenPayload {
                access_token: access.to_string(),
                refresh_token: refresh.to_string(),
                access_expires_at: None,
                refresh_expires_at: None,
            },
        }
    }

    fn stored(name: &str, access: &str) -> StoredSession {
        StoredSession {
            access_token: access.to_string(),
            refresh_token: Some("stored-refresh".to_string()),
            access_expires_at: None,
            profile: profile(name),
        }
    }

    /// Scripted transport; `gate_me` makes `me` block until released
    /// so tests can observe and interleave the in-flight window.
    #[derive(Default)]
    struct MockApi {
        login_results: Mutex<VecDeque<Result<SessionPayload, SessionError>>>,
        me_results: Mutex<VecDeque<Result<Profile, SessionError>>>,
        refresh_results: Mutex<VecDeque<Result<SessionPayload, SessionError>>>,
        logout_calls: AtomicUsize,
        me_entered: Option<Arc<Notify>>,
        me_release: Option<Arc<Notify>>,
    }

    impl MockApi {
        fn push_login(&self, r: Result<SessionPayload, SessionError>) {
            self.login_results.lock().unwrap().push_back(r);
        }
        fn push_me(&self, r: Result<Profile, SessionError>) {
            self.me_results.lock().unwrap().push_back(r);
        }
        fn push_refresh(&self, r: Result<SessionPayload, SessionError>) {
            self.refresh_results.lock().unwrap().push_back(r);
        }
    }

    impl AuthApi for MockApi {
        async fn login(
            &self,
            _identifier: &str,
            _password: &str,
            _remember_me: bool,
        ) -> Result<SessionPayload, SessionError> {
            self.login_results
                .lock()
                .unwrap()
                .pop_front()
                .expect("unscripted login call")
        }

        async fn refresh(&self, _refresh_token: &str) -> Result<SessionPayload, SessionError> {
            self.refresh_results
                .lock()
                .unwrap()
                .pop_front()
                .expect("unscripted refresh call")
        }

        async fn logout(&self, _access_token: &str) -> Result<(), SessionError> {
            self.logout_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn me(&self, _access_token: &str) -> Result<Profile, SessionError> {
            if let (Some(entered), Some(release)) = (&self.me_entered, &self.me_release) {
                entered.notify_one();
                release.notified().await;
            }
            self.me_results
                .lock()
                .unwrap()
                .pop_front()
                .expect("unscripted me call")
        }
    }

    fn client(api: MockApi) -> SessionClient<MockApi, MemoryStorage> {
        SessionClient::new(api, MemoryStorage::new())
    }

    #[tokio::test]
    async fn login_persists_and_enters_fresh() {
        let api = MockApi::default();
        api.push_login(Ok(payload("karim_h", "a1", "r1")));
        let client = client(api);

        let profile = client.login("karim_h", "pw", false).await.unwrap();
        assert_eq!(profile.user_name, "karim_h");
        assert!(client.state().is_fresh());
        assert_eq!(
            client.storage.load().unwrap().unwrap().access_token,
            "a1"
        );
    }

    #[tokio::test]
    async fn login_failure_leaves_prior_session_untouched() {
        let api = MockApi::default();
        api.push_login(Err(SessionError::InvalidCredentials {
            message: "Invalid credentials".to_string(),
        }));
        let client = client(api);
        client.storage.save(&stored("karim_h", "old")).unwrap();
        client.restore().unwrap();

        let result = client.login("karim_h", "typo", false).await;
        assert!(matches!(
            result,
            Err(SessionError::InvalidCredentials { .. })
        ));
        // Prior record and optimistic state both survive
        assert_eq!(client.storage.load().unwrap().unwrap().access_token, "old");
        assert!(client.state().is_authenticated());
    }

    #[tokio::test]
    async fn restore_enters_trusted_stale() {
        let client = client(MockApi::default());
        client.storage.save(&stored("karim_h", "a1")).unwrap();

        assert!(client.restore().unwrap());
        let state = client.state();
        assert!(state.is_authenticated());
        assert!(!state.is_fresh());
    }

    #[tokio::test]
    async fn check_auth_with_empty_storage_is_unauthenticated() {
        let client = client(MockApi::default());
        assert!(!client.check_auth().await.unwrap());
        assert_eq!(client.state(), SessionState::Unauthenticated);
    }

    #[tokio::test]
    async fn check_auth_promotes_to_fresh_with_new_profile() {
        let api = MockApi::default();
        api.push_me(Ok(profile("karim_renamed")));
        let client = client(api);
        client.storage.save(&stored("karim_h", "a1")).unwrap();

        assert!(client.check_auth().await.unwrap());
        let state = client.state();
        assert!(state.is_fresh());
        assert_eq!(state.profile().unwrap().user_name, "karim_renamed");
        // The refreshed profile is persisted too
        assert_eq!(
            client.storage.load().unwrap().unwrap().profile.user_name,
            "karim_renamed"
        );
    }

    #[tokio::test]
    async fn check_auth_failure_clears_storage() {
        let api = MockApi::default();
        api.push_me(Err(SessionError::TokenInvalid));
        let client = client(api);
        client.storage.save(&stored("karim_h", "a1")).unwrap();

        assert!(!client.check_auth().await.unwrap());
        assert_eq!(client.state(), SessionState::Unauthenticated);
        assert!(client.storage.load().unwrap().is_none());
    }

    #[tokio::test]
    async fn check_auth_timeout_also_clears() {
        let api = MockApi::default();
        api.push_me(Err(SessionError::Network("timed out".to_string())));
        let client = client(api);
        client.storage.save(&stored("karim_h", "a1")).unwrap();

        assert!(!client.check_auth().await.unwrap());
        assert_eq!(client.state(), SessionState::Unauthenticated);
        assert!(client.storage.load().unwrap().is_none());
    }

    #[tokio::test]
    async fn check_auth_refreshes_once_on_expiry() {
        let api = MockApi::default();
        api.push_me(Err(SessionError::TokenExpired));
        api.push_refresh(Ok(payload("karim_h", "a2", "r2")));
        let client = client(api);
        client.storage.save(&stored("karim_h", "a1")).unwrap();

        assert!(client.check_auth().await.unwrap());
        assert!(client.state().is_fresh());
        let record = client.storage.load().unwrap().unwrap();
        assert_eq!(record.access_token, "a2");
        assert_eq!(record.refresh_token.as_deref(), Some("r2"));
    }

    #[tokio::test]
    async fn check_auth_clears_when_refresh_also_fails() {
        let api = MockApi::default();
        api.push_me(Err(SessionError::TokenExpired));
        api.push_refresh(Err(SessionError::TokenInvalid));
        let client = client(api);
        client.storage.save(&stored("karim_h", "a1")).unwrap();

        assert!(!client.check_auth().await.unwrap());
        assert_eq!(client.state(), SessionState::Unauthenticated);
        assert!(client.storage.load().unwrap().is_none());
    }

    #[tokio::test]
    async fn logout_clears_locally_and_notifies_server() {
        let api = MockApi::default();
        api.push_login(Ok(payload("karim_h", "a1", "r1")));
        let client = client(api);
        client.login("karim_h", "pw", false).await.unwrap();

        client.logout().await.unwrap();
        assert_eq!(client.state(), SessionState::Unauthenticated);
        assert!(client.storage.load().unwrap().is_none());
        assert_eq!(client.api.logout_calls.load(Ordering::SeqCst), 1);

        // Logging out while already signed out is a no-op
        client.logout().await.unwrap();
        assert_eq!(client.state(), SessionState::Unauthenticated);
    }

    #[tokio::test]
    async fn logout_wins_over_inflight_check_auth() {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());

        let api = MockApi {
            me_entered: Some(entered.clone()),
            me_release: Some(release.clone()),
            ..MockApi::default()
        };
        api.push_me(Ok(profile("karim_h")));
        let client = Arc::new(client(api));
        client.storage.save(&stored("karim_h", "a1")).unwrap();

        let background = {
            let client = client.clone();
            tokio::spawn(async move { client.check_auth().await })
        };

        // Wait until the validation call is in flight
        entered.notified().await;
        assert!(matches!(client.state(), SessionState::Verifying { .. }));

        // Logout lands while the check is still out
        client.logout().await.unwrap();
        assert_eq!(client.state(), SessionState::Unauthenticated);

        // The stale success must be dropped, not reapplied
        release.notify_one();
        let applied = background.await.unwrap().unwrap();
        assert!(!applied);
        assert_eq!(client.state(), SessionState::Unauthenticated);
        assert!(client.storage.load().unwrap().is_none());
    }

    #[tokio::test]
    async fn manual_refresh_rotates_and_persists() {
        let api = MockApi::default();
        api.push_refresh(Ok(payload("karim_h", "a2", "r2")));
        let client = client(api);
        client.storage.save(&stored("karim_h", "a1")).unwrap();

        let token = client.refresh().await.unwrap();
        assert_eq!(token, "a2");
        assert_eq!(client.storage.load().unwrap().unwrap().access_token, "a2");
        assert!(client.state().is_fresh());
    }

    #[tokio::test]
    async fn manual_refresh_failure_forces_local_logout() {
        let api = MockApi::default();
        api.push_refresh(Err(SessionError::TokenInvalid));
        let client = client(api);
        client.storage.save(&stored("karim_h", "a1")).unwrap();
        client.restore().unwrap();

        let result = client.refresh().await;
        assert!(matches!(result, Err(SessionError::TokenInvalid)));
        assert_eq!(client.state(), SessionState::Unauthenticated);
        assert!(client.storage.load().unwrap().is_none());
    }
}
