// OIDC identity provider client
//
// Authorization-code flow against an Auth0-style tenant: build the
// `/authorize` URL, trade the returned code for tokens at `/oauth/token`,
// refresh silently with the refresh token, and read the `/userinfo` claims.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Custom claim carrying the user's roles.
pub const ROLES_CLAIM: &str = "https://netop.cloud/roles";

/// Scopes requested on login.
pub const DEFAULT_SCOPE: &str = "openid profile email offline_access read:incidents write:incidents";

/// Static identity-provider settings for one tenant.
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    /// Tenant domain, e.g. `netop.eu.auth0.com`.
    pub domain: String,
    pub client_id: String,
    /// API audience the access token is minted for.
    pub audience: String,
    pub redirect_uri: Url,
    /// Confidential clients only.
    pub client_secret: Option<SecretString>,
    pub scope: String,
}

impl IdentityConfig {
    pub fn new(
        domain: impl Into<String>,
        client_id: impl Into<String>,
        audience: impl Into<String>,
        redirect_uri: Url,
    ) -> Self {
        Self {
            domain: domain.into(),
            client_id: client_id.into(),
            audience: audience.into(),
            redirect_uri,
            client_secret: None,
            scope: DEFAULT_SCOPE.to_owned(),
        }
    }

    /// `https://{domain}/`, accepting a domain given with or without scheme.
    pub fn issuer(&self) -> Result<Url, Error> {
        let domain = self.domain.trim_end_matches('/');
        let raw = if domain.starts_with("http://") || domain.starts_with("https://") {
            format!("{domain}/")
        } else {
            format!("https://{domain}/")
        };
        Ok(Url::parse(&raw)?)
    }
}

/// Tokens returned by `/oauth/token`.
#[derive(Debug)]
pub struct TokenResponse {
    pub access_token: SecretString,
    pub refresh_token: Option<SecretString>,
    /// Lifetime of the access token in seconds.
    pub expires_in: u64,
    pub token_type: String,
}

#[derive(Deserialize)]
struct RawTokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default = "default_expiry")]
    expires_in: u64,
    #[serde(default = "default_token_type")]
    token_type: String,
}

fn default_expiry() -> u64 {
    86_400
}

fn default_token_type() -> String {
    "Bearer".to_owned()
}

impl From<RawTokenResponse> for TokenResponse {
    fn from(raw: RawTokenResponse) -> Self {
        Self {
            access_token: SecretString::from(raw.access_token),
            refresh_token: raw.refresh_token.map(SecretString::from),
            expires_in: raw.expires_in,
            token_type: raw.token_type,
        }
    }
}

/// Claims from `/userinfo`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserInfo {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default, rename = "https://netop.cloud/roles")]
    pub roles: Vec<String>,
}

#[derive(Deserialize)]
struct OAuthError {
    error: Option<String>,
    error_description: Option<String>,
}

/// HTTP client for the identity provider.
pub struct IdentityClient {
    http: reqwest::Client,
    issuer: Url,
    config: IdentityConfig,
}

impl IdentityClient {
    pub fn new(config: IdentityConfig, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        let issuer = config.issuer()?;
        Ok(Self {
            http,
            issuer,
            config,
        })
    }

    /// Point the client at an explicit issuer (mock servers, private tenants).
    pub fn with_issuer(http: reqwest::Client, issuer: Url, config: IdentityConfig) -> Self {
        Self {
            http,
            issuer,
            config,
        }
    }

    pub fn config(&self) -> &IdentityConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> Result<Url, Error> {
        Ok(self.issuer.join(path)?)
    }

    /// Browser URL that starts the authorization-code flow.
    pub fn authorize_url(&self, state: &str) -> Result<Url, Error> {
        let mut url = self.endpoint("authorize")?;
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", self.config.redirect_uri.as_str())
            .append_pair("audience", &self.config.audience)
            .append_pair("scope", &self.config.scope)
            .append_pair("state", state);
        Ok(url)
    }

    /// Where to send the browser to end the provider session.
    pub fn logout_url(&self, return_to: &Url) -> Result<Url, Error> {
        let mut url = self.endpoint("v2/logout")?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("returnTo", return_to.as_str());
        Ok(url)
    }

    /// Trade an authorization code for tokens.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse, Error> {
        debug!("exchanging authorization code");
        let mut body = self.grant_body("authorization_code");
        body["code"] = json!(code);
        body["redirect_uri"] = json!(self.config.redirect_uri.as_str());
        self.token_request(body).await
    }

    /// Mint a fresh access token from a refresh token.
    pub async fn refresh(&self, refresh_token: &SecretString) -> Result<TokenResponse, Error> {
        debug!("refreshing access token");
        let mut body = self.grant_body("refresh_token");
        body["refresh_token"] = json!(refresh_token.expose_secret());
        self.token_request(body).await
    }

    /// Claims for the bearer of `access_token`.
    pub async fn user_info(&self, access_token: &SecretString) -> Result<UserInfo, Error> {
        let url = self.endpoint("userinfo")?;
        debug!("GET {url}");
        let resp = self
            .http
            .get(url)
            .bearer_auth(access_token.expose_secret())
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(identity_error(status, &body));
        }
        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }

    fn grant_body(&self, grant_type: &str) -> Value {
        let mut body = json!({
            "grant_type": grant_type,
            "client_id": self.config.client_id,
        });
        if let Some(ref secret) = self.config.client_secret {
            body["client_secret"] = json!(secret.expose_secret());
        }
        body
    }

    async fn token_request(&self, body: Value) -> Result<TokenResponse, Error> {
        let url = self.endpoint("oauth/token")?;
        debug!("POST {url}");
        let resp = self.http.post(url).json(&body).send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(identity_error(status, &text));
        }
        serde_json::from_str::<RawTokenResponse>(&text)
            .map(TokenResponse::from)
            .map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body: String::new(),
            })
    }
}

fn identity_error(status: reqwest::StatusCode, body: &str) -> Error {
    let message = serde_json::from_str::<OAuthError>(body)
        .ok()
        .and_then(|e| e.error_description.or(e.error))
        .unwrap_or_else(|| format!("HTTP {status}"));
    Error::Identity { message }
}
