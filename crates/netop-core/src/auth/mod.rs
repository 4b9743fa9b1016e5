// ── Authentication gating ──
//
// Decides, once per session, whether the app runs against the demo
// dataset or as a signed-in user, and hands out bearer tokens for remote
// calls.

mod provider;

use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;
use futures_util::future::BoxFuture;
use secrecy::SecretString;
use serde::Serialize;
use tracing::{debug, info, warn};
use url::Url;

pub use provider::{IdentityProvider, OidcProvider};

use crate::error::CoreError;
use crate::model::User;

/// Bearer token handed out in demo mode.
pub const DEMO_TOKEN: &str = "demo-token-123";

/// Anything that can produce a bearer token for remote calls.
pub trait TokenSource: Send + Sync {
    fn access_token(&self) -> BoxFuture<'_, Result<SecretString, CoreError>>;
}

/// Durable per-user session state: the demo flag and the refresh token.
pub trait SessionStore: Send + Sync {
    fn demo_mode(&self) -> bool;
    fn set_demo_mode(&self, enabled: bool) -> Result<(), CoreError>;
    fn refresh_token(&self) -> Option<SecretString>;
    fn set_refresh_token(&self, token: Option<&SecretString>) -> Result<(), CoreError>;
}

/// Process-local `SessionStore`.
#[derive(Default)]
pub struct MemorySessionStore {
    demo: Mutex<bool>,
    refresh: Mutex<Option<SecretString>>,
}

impl SessionStore for MemorySessionStore {
    fn demo_mode(&self) -> bool {
        *self.demo.lock().expect("session lock poisoned")
    }

    fn set_demo_mode(&self, enabled: bool) -> Result<(), CoreError> {
        *self.demo.lock().expect("session lock poisoned") = enabled;
        Ok(())
    }

    fn refresh_token(&self) -> Option<SecretString> {
        self.refresh.lock().expect("session lock poisoned").clone()
    }

    fn set_refresh_token(&self, token: Option<&SecretString>) -> Result<(), CoreError> {
        *self.refresh.lock().expect("session lock poisoned") = token.cloned();
        Ok(())
    }
}

/// Outcome of mode resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum AuthState {
    Demo { user: User },
    Authenticated { user: User },
    /// Nobody is signed in. `error` carries the reason when resolution
    /// failed rather than simply finding no session.
    Unauthenticated { error: Option<String> },
}

impl AuthState {
    pub fn user(&self) -> Option<&User> {
        match self {
            Self::Demo { user } | Self::Authenticated { user } => Some(user),
            Self::Unauthenticated { .. } => None,
        }
    }

    pub fn is_demo(&self) -> bool {
        matches!(self, Self::Demo { .. })
    }

    pub fn is_authenticated(&self) -> bool {
        !matches!(self, Self::Unauthenticated { .. })
    }
}

/// Result of `AuthGate::logout`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogoutOutcome {
    /// Demo flag cleared.
    DemoCleared,
    /// Tokens dropped; the browser should visit this URL to end the
    /// provider session.
    SignedOut { logout_url: Option<Url> },
}

pub struct AuthGate {
    provider: Option<Arc<dyn IdentityProvider>>,
    store: Arc<dyn SessionStore>,
    demo_requested: bool,
    state: ArcSwap<AuthState>,
}

impl AuthGate {
    pub fn new(
        provider: Option<Arc<dyn IdentityProvider>>,
        store: Arc<dyn SessionStore>,
        demo_requested: bool,
    ) -> Self {
        Self {
            provider,
            store,
            demo_requested,
            state: ArcSwap::from_pointee(AuthState::Unauthenticated { error: None }),
        }
    }

    /// The last resolved state.
    pub fn state(&self) -> AuthState {
        AuthState::clone(&self.state.load())
    }

    fn set_state(&self, state: AuthState) -> AuthState {
        self.state.store(Arc::new(state.clone()));
        state
    }

    fn provider(&self) -> Result<&Arc<dyn IdentityProvider>, CoreError> {
        self.provider.as_ref().ok_or_else(|| CoreError::Config {
            message: "no identity provider configured; use --demo or add an [identity] section to the profile".into(),
        })
    }

    /// Decide between demo, authenticated and unauthenticated.
    ///
    /// Demo wins when requested for this run or persisted from an earlier
    /// one; requesting it persists it. Outside demo mode a missing provider
    /// is a configuration error. Provider failures leave the gate
    /// `Unauthenticated` with the error attached.
    pub async fn resolve_mode(&self) -> Result<AuthState, CoreError> {
        if self.demo_requested || self.store.demo_mode() {
            if self.demo_requested {
                if let Err(e) = self.store.set_demo_mode(true) {
                    warn!(error = %e, "could not persist demo mode");
                }
            }
            info!("running in demo mode");
            return Ok(self.set_state(AuthState::Demo { user: User::demo() }));
        }

        let provider = self.provider()?;
        if let Err(e) = provider.initialize().await {
            warn!(error = %e, "identity provider initialization failed");
            return Ok(self.set_state(AuthState::Unauthenticated {
                error: Some(e.to_string()),
            }));
        }

        let state = match provider.get_user().await {
            Ok(Some(user)) => {
                debug!(user = %user.id, "session restored");
                AuthState::Authenticated { user }
            }
            Ok(None) => AuthState::Unauthenticated { error: None },
            Err(e) => {
                warn!(error = %e, "could not load user profile");
                AuthState::Unauthenticated {
                    error: Some(e.to_string()),
                }
            }
        };
        Ok(self.set_state(state))
    }

    /// Start an interactive login; returns the URL to open.
    pub async fn login(&self) -> Result<Url, CoreError> {
        if self.state().is_demo() {
            return Err(CoreError::validation(
                "demo mode is active; run `netop auth logout` first",
            ));
        }
        self.provider()?.login_with_redirect().await
    }

    /// Finish an interactive login with the code from the redirect.
    pub async fn complete_login(&self, code: &str) -> Result<User, CoreError> {
        if self.state().is_demo() {
            return Err(CoreError::validation("demo mode is active"));
        }
        let user = self.provider()?.handle_redirect_callback(code).await?;
        self.set_state(AuthState::Authenticated { user: user.clone() });
        Ok(user)
    }

    pub async fn logout(&self) -> Result<LogoutOutcome, CoreError> {
        if self.state().is_demo() || self.store.demo_mode() {
            self.store.set_demo_mode(false)?;
            self.set_state(AuthState::Unauthenticated { error: None });
            info!("left demo mode");
            return Ok(LogoutOutcome::DemoCleared);
        }
        let logout_url = match self.provider {
            Some(ref provider) => provider.logout().await?,
            None => {
                self.store.set_refresh_token(None)?;
                None
            }
        };
        self.set_state(AuthState::Unauthenticated { error: None });
        Ok(LogoutOutcome::SignedOut { logout_url })
    }

    /// Bearer token for API calls: the fixed demo token in demo mode,
    /// otherwise a silently refreshed provider token.
    pub async fn access_token(&self) -> Result<SecretString, CoreError> {
        if self.state().is_demo() {
            return Ok(SecretString::from(DEMO_TOKEN.to_owned()));
        }
        let provider = self.provider.as_ref().ok_or_else(|| CoreError::Auth {
            message: "no identity provider configured".into(),
        })?;
        provider.get_token_silently().await
    }
}

impl TokenSource for AuthGate {
    fn access_token(&self) -> BoxFuture<'_, Result<SecretString, CoreError>> {
        Box::pin(AuthGate::access_token(self))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use secrecy::ExposeSecret;

    use super::*;
    use crate::model::AuthMode;

    /// Provider double with scripted outcomes.
    #[derive(Default)]
    struct FakeProvider {
        fail_init: bool,
        signed_in: AtomicBool,
        logged_out: AtomicBool,
    }

    fn user() -> User {
        User {
            id: "auth0|42".into(),
            email: Some("ops@netop.cloud".into()),
            display_name: None,
            role: "user".into(),
            auth_mode: AuthMode::Authenticated,
        }
    }

    impl IdentityProvider for FakeProvider {
        fn initialize(&self) -> BoxFuture<'_, Result<(), CoreError>> {
            Box::pin(async move {
                if self.fail_init {
                    Err(CoreError::Network {
                        url: "https://netop.eu.auth0.com".into(),
                        reason: "dns failure".into(),
                    })
                } else {
                    Ok(())
                }
            })
        }

        fn login_with_redirect(&self) -> BoxFuture<'_, Result<Url, CoreError>> {
            Box::pin(async { Ok(Url::parse("https://idp.test/authorize?state=s").unwrap()) })
        }

        fn handle_redirect_callback<'a>(&'a self, _code: &'a str) -> BoxFuture<'a, Result<User, CoreError>> {
            Box::pin(async move {
                self.signed_in.store(true, Ordering::SeqCst);
                Ok(user())
            })
        }

        fn get_user(&self) -> BoxFuture<'_, Result<Option<User>, CoreError>> {
            Box::pin(async move { Ok(self.signed_in.load(Ordering::SeqCst).then(user)) })
        }

        fn get_token_silently(&self) -> BoxFuture<'_, Result<SecretString, CoreError>> {
            Box::pin(async move {
                if self.signed_in.load(Ordering::SeqCst) {
                    Ok(SecretString::from("real-token".to_owned()))
                } else {
                    Err(CoreError::Auth {
                        message: "login required".into(),
                    })
                }
            })
        }

        fn logout(&self) -> BoxFuture<'_, Result<Option<Url>, CoreError>> {
            Box::pin(async move {
                self.logged_out.store(true, Ordering::SeqCst);
                self.signed_in.store(false, Ordering::SeqCst);
                Ok(Some(Url::parse("https://idp.test/v2/logout").unwrap()))
            })
        }

        fn is_authenticated(&self) -> BoxFuture<'_, bool> {
            Box::pin(async move { self.signed_in.load(Ordering::SeqCst) })
        }
    }

    fn store() -> Arc<MemorySessionStore> {
        Arc::new(MemorySessionStore::default())
    }

    #[tokio::test]
    async fn demo_request_persists_and_yields_sentinel_token() {
        let store = store();
        let gate = AuthGate::new(None, store.clone(), true);
        let state = gate.resolve_mode().await.unwrap();
        assert!(state.is_demo());
        assert!(store.demo_mode());
        let token = gate.access_token().await.unwrap();
        assert_eq!(token.expose_secret(), DEMO_TOKEN);
    }

    #[tokio::test]
    async fn persisted_demo_flag_survives_without_request() {
        let store = store();
        store.set_demo_mode(true).unwrap();
        let gate = AuthGate::new(None, store, false);
        assert!(gate.resolve_mode().await.unwrap().is_demo());
    }

    #[tokio::test]
    async fn missing_provider_outside_demo_is_config_error() {
        let gate = AuthGate::new(None, store(), false);
        let err = gate.resolve_mode().await.unwrap_err();
        assert!(matches!(err, CoreError::Config { .. }));
    }

    #[tokio::test]
    async fn provider_init_failure_is_unauthenticated_with_error() {
        let provider = Arc::new(FakeProvider {
            fail_init: true,
            ..FakeProvider::default()
        });
        let gate = AuthGate::new(Some(provider), store(), false);
        match gate.resolve_mode().await.unwrap() {
            AuthState::Unauthenticated { error: Some(e) } => assert!(e.contains("dns failure")),
            other => panic!("unexpected state: {other:?}"),
        }
    }

    #[tokio::test]
    async fn token_failure_propagates_as_auth_error() {
        let gate = AuthGate::new(Some(Arc::new(FakeProvider::default())), store(), false);
        gate.resolve_mode().await.unwrap();
        let err = gate.access_token().await.unwrap_err();
        assert!(matches!(err, CoreError::Auth { .. }));
    }

    #[tokio::test]
    async fn login_flow_authenticates() {
        let gate = AuthGate::new(Some(Arc::new(FakeProvider::default())), store(), false);
        assert!(!gate.resolve_mode().await.unwrap().is_authenticated());
        let url = gate.login().await.unwrap();
        assert_eq!(url.host_str(), Some("idp.test"));
        let user = gate.complete_login("code-1").await.unwrap();
        assert_eq!(gate.state(), AuthState::Authenticated { user });
        assert_eq!(gate.access_token().await.unwrap().expose_secret(), "real-token");
    }

    #[tokio::test]
    async fn demo_logout_clears_flag() {
        let store = store();
        let gate = AuthGate::new(None, store.clone(), true);
        gate.resolve_mode().await.unwrap();
        assert!(gate.login().await.is_err());
        assert_eq!(gate.logout().await.unwrap(), LogoutOutcome::DemoCleared);
        assert!(!store.demo_mode());
        assert_eq!(gate.state(), AuthState::Unauthenticated { error: None });
    }

    #[tokio::test]
    async fn authenticated_logout_returns_provider_url() {
        let provider = Arc::new(FakeProvider::default());
        provider.signed_in.store(true, Ordering::SeqCst);
        let gate = AuthGate::new(Some(provider.clone()), store(), false);
        assert!(gate.resolve_mode().await.unwrap().is_authenticated());
        match gate.logout().await.unwrap() {
            LogoutOutcome::SignedOut { logout_url } => assert!(logout_url.is_some()),
            LogoutOutcome::DemoCleared => panic!("not in demo mode"),
        }
        assert!(provider.logged_out.load(Ordering::SeqCst));
    }
}
