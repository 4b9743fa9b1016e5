// ── Identity provider seam ──
//
// `IdentityProvider` is what the AuthGate talks to. `OidcProvider` is the
// production implementation over `netop_api::IdentityClient`; tests plug in
// their own.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use futures_util::future::BoxFuture;
use secrecy::SecretString;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

use netop_api::{IdentityClient, TokenResponse, UserInfo};

use super::SessionStore;
use crate::error::CoreError;
use crate::model::user::DEFAULT_ROLE;
use crate::model::{AuthMode, User};

/// Tokens are refreshed this long before they expire.
const EXPIRY_SKEW_SECS: i64 = 60;

/// An external login service.
pub trait IdentityProvider: Send + Sync {
    /// Restore any persisted session. Failing here is not fatal for the
    /// caller; it simply means nobody is signed in.
    fn initialize(&self) -> BoxFuture<'_, Result<(), CoreError>>;

    /// URL the user must visit to sign in.
    fn login_with_redirect(&self) -> BoxFuture<'_, Result<Url, CoreError>>;

    /// Finish a login with the code the provider redirected back with.
    fn handle_redirect_callback<'a>(&'a self, code: &'a str) -> BoxFuture<'a, Result<User, CoreError>>;

    /// The signed-in user, or `None` when nobody is.
    fn get_user(&self) -> BoxFuture<'_, Result<Option<User>, CoreError>>;

    /// A valid access token without user interaction, refreshing if needed.
    fn get_token_silently(&self) -> BoxFuture<'_, Result<SecretString, CoreError>>;

    /// Drop local tokens; returns the provider's logout URL, if any.
    fn logout(&self) -> BoxFuture<'_, Result<Option<Url>, CoreError>>;

    fn is_authenticated(&self) -> BoxFuture<'_, bool>;
}

struct CachedToken {
    access: SecretString,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn from_response(tokens: &TokenResponse) -> Self {
        let lifetime = i64::try_from(tokens.expires_in).unwrap_or(i64::MAX);
        Self {
            access: tokens.access_token.clone(),
            expires_at: Utc::now() + Duration::seconds(lifetime.min(i64::from(u32::MAX))),
        }
    }

    fn is_fresh(&self) -> bool {
        self.expires_at - Duration::seconds(EXPIRY_SKEW_SECS) > Utc::now()
    }
}

/// Authorization-code login with refresh-token persistence.
pub struct OidcProvider {
    client: IdentityClient,
    store: Arc<dyn SessionStore>,
    cache: Mutex<Option<CachedToken>>,
    pending_state: Mutex<Option<String>>,
}

impl OidcProvider {
    pub fn new(client: IdentityClient, store: Arc<dyn SessionStore>) -> Self {
        Self {
            client,
            store,
            cache: Mutex::new(None),
            pending_state: Mutex::new(None),
        }
    }

    fn user_from_claims(info: UserInfo) -> User {
        User {
            id: info.sub,
            email: info.email,
            display_name: info.name,
            role: info
                .roles
                .into_iter()
                .next()
                .unwrap_or_else(|| DEFAULT_ROLE.to_owned()),
            auth_mode: AuthMode::Authenticated,
        }
    }

    /// Cache the access token and persist a rotated refresh token.
    async fn accept(&self, tokens: &TokenResponse) -> Result<SecretString, CoreError> {
        if let Some(ref refresh) = tokens.refresh_token {
            self.store.set_refresh_token(Some(refresh))?;
        }
        let cached = CachedToken::from_response(tokens);
        let access = cached.access.clone();
        *self.cache.lock().await = Some(cached);
        Ok(access)
    }

    async fn token(&self) -> Result<SecretString, CoreError> {
        let mut cache = self.cache.lock().await;
        if let Some(ref cached) = *cache {
            if cached.is_fresh() {
                return Ok(cached.access.clone());
            }
        }
        let refresh = self.store.refresh_token().ok_or_else(|| CoreError::Auth {
            message: "not logged in; run `netop auth login`".into(),
        })?;
        debug!("access token missing or expiring, refreshing");
        let tokens = self.client.refresh(&refresh).await.map_err(|e| {
            warn!(error = %e, "silent token refresh failed");
            CoreError::Auth {
                message: format!("session expired, log in again ({e})"),
            }
        })?;
        if let Some(ref rotated) = tokens.refresh_token {
            self.store.set_refresh_token(Some(rotated))?;
        }
        let fresh = CachedToken::from_response(&tokens);
        let access = fresh.access.clone();
        *cache = Some(fresh);
        Ok(access)
    }
}

impl IdentityProvider for OidcProvider {
    fn initialize(&self) -> BoxFuture<'_, Result<(), CoreError>> {
        Box::pin(async move {
            if self.store.refresh_token().is_none() {
                debug!("no stored session");
                return Ok(());
            }
            self.token().await.map(|_| ())
        })
    }

    fn login_with_redirect(&self) -> BoxFuture<'_, Result<Url, CoreError>> {
        Box::pin(async move {
            let state = uuid::Uuid::new_v4().simple().to_string();
            let url = self.client.authorize_url(&state)?;
            *self.pending_state.lock().await = Some(state);
            Ok(url)
        })
    }

    fn handle_redirect_callback<'a>(&'a self, code: &'a str) -> BoxFuture<'a, Result<User, CoreError>> {
        Box::pin(async move {
            let code = code.trim();
            if code.is_empty() {
                return Err(CoreError::validation("authorization code is empty"));
            }
            let tokens = self.client.exchange_code(code).await?;
            let access = self.accept(&tokens).await?;
            self.pending_state.lock().await.take();
            let user = Self::user_from_claims(self.client.user_info(&access).await?);
            info!(user = %user.id, "logged in");
            Ok(user)
        })
    }

    fn get_user(&self) -> BoxFuture<'_, Result<Option<User>, CoreError>> {
        Box::pin(async move {
            if !self.is_authenticated().await {
                return Ok(None);
            }
            let access = self.token().await?;
            let info = self.client.user_info(&access).await?;
            Ok(Some(Self::user_from_claims(info)))
        })
    }

    fn get_token_silently(&self) -> BoxFuture<'_, Result<SecretString, CoreError>> {
        Box::pin(self.token())
    }

    fn logout(&self) -> BoxFuture<'_, Result<Option<Url>, CoreError>> {
        Box::pin(async move {
            self.cache.lock().await.take();
            self.store.set_refresh_token(None)?;
            let return_to = self.client.config().redirect_uri.clone();
            Ok(Some(self.client.logout_url(&return_to)?))
        })
    }

    fn is_authenticated(&self) -> BoxFuture<'_, bool> {
        Box::pin(async move {
            let cached = self.cache.lock().await.as_ref().is_some_and(CachedToken::is_fresh);
            cached || self.store.refresh_token().is_some()
        })
    }
}
