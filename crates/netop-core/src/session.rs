// ── Session facade ──
//
// One session per process: resolve the auth mode, pick the backend once,
// and hand out the DataSource and PreferenceManager built on it.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};
use url::Url;

use netop_api::{ApiClient, TransportConfig};

use crate::auth::{AuthGate, AuthState, IdentityProvider, LogoutOutcome, SessionStore, TokenSource};
use crate::error::CoreError;
use crate::preferences::PreferenceManager;
use crate::source::{Backend, DataSource};
use crate::store::{InMemoryStore, RemoteStore};

/// Connection settings for a session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub api_url: Url,
    pub timeout: Duration,
    /// Force demo mode for this run (and persist it).
    pub demo: bool,
}

impl SessionConfig {
    pub fn new(api_url: Url) -> Self {
        Self {
            api_url,
            timeout: Duration::from_secs(30),
            demo: false,
        }
    }
}

pub struct Session {
    config: SessionConfig,
    auth: Arc<AuthGate>,
    data: Arc<DataSource>,
    state: AuthState,
}

impl Session {
    /// Resolve the auth mode and select the backend.
    ///
    /// Demo mode is served from the seeded in-memory store; every other
    /// state talks to the remote API, so an unauthenticated session fails
    /// on first use with `CoreError::Auth`.
    pub async fn connect(
        config: SessionConfig,
        provider: Option<Arc<dyn IdentityProvider>>,
        store: Arc<dyn SessionStore>,
    ) -> Result<Self, CoreError> {
        let auth = Arc::new(AuthGate::new(provider, store, config.demo));
        let state = auth.resolve_mode().await?;

        let backend = if state.is_demo() {
            Backend::Demo(InMemoryStore::seeded())
        } else {
            let transport = TransportConfig::default().with_timeout(config.timeout);
            let api = ApiClient::new(config.api_url.clone(), &transport)?;
            let tokens: Arc<dyn TokenSource> = auth.clone();
            Backend::Remote(RemoteStore::new(api, tokens))
        };
        debug!(demo = backend.is_demo(), api_url = %config.api_url, "backend selected");
        if let Some(user) = state.user() {
            info!(user = user.label(), mode = %user.auth_mode, "session ready");
        }

        Ok(Self {
            config,
            auth,
            data: Arc::new(DataSource::new(backend)),
            state,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn auth(&self) -> &Arc<AuthGate> {
        &self.auth
    }

    /// Auth state at connect time.
    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn data(&self) -> Arc<DataSource> {
        Arc::clone(&self.data)
    }

    /// Preference operations for the signed-in user.
    pub fn preferences(&self) -> Result<PreferenceManager, CoreError> {
        let user = self.auth.state().user().cloned().ok_or_else(|| CoreError::Auth {
            message: "not logged in; run `netop auth login` or use --demo".into(),
        })?;
        Ok(PreferenceManager::new(self.data(), user.id))
    }

    pub async fn logout(&self) -> Result<LogoutOutcome, CoreError> {
        self.auth.logout().await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::auth::MemorySessionStore;
    use crate::model::user::DEMO_USER_ID;

    fn config(demo: bool) -> SessionConfig {
        SessionConfig {
            demo,
            ..SessionConfig::new(Url::parse("http://127.0.0.1:9/v1").unwrap())
        }
    }

    #[tokio::test]
    async fn demo_session_uses_memory_backend() {
        let session = Session::connect(config(true), None, Arc::new(MemorySessionStore::default()))
            .await
            .unwrap();
        assert!(session.data().is_demo());
        assert!(session.state().is_demo());
        assert_eq!(session.preferences().unwrap().user_id(), DEMO_USER_ID);
    }

    #[tokio::test]
    async fn non_demo_without_provider_fails_fast() {
        let result =
            Session::connect(config(false), None, Arc::new(MemorySessionStore::default())).await;
        assert!(matches!(result, Err(CoreError::Config { .. })));
    }

    #[tokio::test]
    async fn logout_leaves_demo() {
        let store = Arc::new(MemorySessionStore::default());
        let session = Session::connect(config(true), None, store.clone()).await.unwrap();
        assert_eq!(session.logout().await.unwrap(), LogoutOutcome::DemoCleared);
        assert!(!store.demo_mode());
        assert!(session.preferences().is_err());
    }
}
