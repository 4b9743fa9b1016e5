//! Shared configuration for NetOp tools.
//!
//! TOML profiles loaded through figment, client-secret resolution
//! (env + keyring + plaintext), translation to `netop_core::SessionConfig`
//! and `netop_api::IdentityConfig`, and the file/keyring backed
//! [`FileSessionStore`].

mod session;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use netop_api::IdentityConfig;
use netop_api::client::DEFAULT_BASE_URL;
use netop_core::SessionConfig;

pub use session::FileSessionStore;

/// Keyring service name for every secret this crate stores.
pub const KEYRING_SERVICE: &str = "netop";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no identity provider configured for profile '{profile}'")]
    NoIdentity { profile: String },

    #[error("profile '{profile}' not found")]
    UnknownProfile { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// The named profile, or the built-in default when the name is the
    /// default profile and the file defines nothing for it.
    pub fn profile(&self, name: &str) -> Result<Profile, ConfigError> {
        match self.profiles.get(name) {
            Some(profile) => Ok(profile.clone()),
            None if self.profiles.is_empty() || self.default_profile.as_deref() == Some(name) => {
                Ok(Profile::default())
            }
            None => Err(ConfigError::UnknownProfile {
                profile: name.into(),
            }),
        }
    }

    pub fn default_profile_name(&self) -> &str {
        self.default_profile.as_deref().unwrap_or("default")
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named deployment: which API to talk to and how to log in.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Always run this profile against the demo dataset.
    #[serde(default)]
    pub demo: bool,

    /// Override the global timeout (seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<IdentitySection>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            demo: false,
            timeout: None,
            identity: None,
        }
    }
}

fn default_api_url() -> String {
    DEFAULT_BASE_URL.into()
}

/// OIDC settings for a profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IdentitySection {
    /// Tenant domain, e.g. `netop.eu.auth0.com`.
    pub domain: String,
    pub client_id: String,
    pub audience: String,
    pub redirect_uri: String,

    /// Plaintext client secret. Prefer keyring or env var.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,

    /// Environment variable holding the client secret.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret_env: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("cloud", "netop", "netop")
}

fn home_fallback(parts: &[&str]) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.extend(parts);
    p
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback(&[".config", "netop", "config.toml"]),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Directory holding per-profile session markers.
pub fn state_dir() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback(&[".local", "state", "netop"]),
        |dirs| {
            dirs.state_dir()
                .unwrap_or_else(|| dirs.data_local_dir())
                .to_path_buf()
        },
    )
}

// ── Loading / saving ────────────────────────────────────────────────

/// Load the full Config from the canonical file plus `NETOP_*` env vars.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file. Nested keys in env vars use a double
/// underscore: `NETOP_DEFAULTS__TIMEOUT=60`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("NETOP_").split("__"));

    Ok(figment.extract()?)
}

/// Load config, returning a default if it is missing or unreadable.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

/// Serialize config to pretty TOML at `path`, creating parent dirs.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, toml::to_string_pretty(cfg)?)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve the client secret: env var named by `client_secret_env`, then
/// keyring, then plaintext. Public clients have none.
pub fn resolve_client_secret(identity: &IdentitySection, profile_name: &str) -> Option<SecretString> {
    // 1. Env var
    if let Some(ref env_name) = identity.client_secret_env {
        if let Ok(val) = std::env::var(env_name) {
            return Some(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/client-secret")) {
        if let Ok(secret) = entry.get_password() {
            return Some(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    identity.client_secret.clone().map(SecretString::from)
}

/// Store a client secret in the system keyring.
pub fn store_client_secret(profile_name: &str, secret: &str) -> Result<(), ConfigError> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/client-secret"))
        .and_then(|entry| entry.set_password(secret))
        .map_err(|e| ConfigError::Validation {
            field: "client_secret".into(),
            reason: format!("keyring unavailable: {e}"),
        })
}

fn parse_url(field: &str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|e| ConfigError::Validation {
        field: field.into(),
        reason: format!("invalid URL {raw:?}: {e}"),
    })
}

// ── Translation ─────────────────────────────────────────────────────

/// Build a `SessionConfig` from a profile. `demo` comes from the profile;
/// callers OR in their own override.
pub fn profile_to_session_config(
    profile: &Profile,
    defaults: &Defaults,
) -> Result<SessionConfig, ConfigError> {
    Ok(SessionConfig {
        api_url: parse_url("api_url", &profile.api_url)?,
        timeout: Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)),
        demo: profile.demo,
    })
}

/// Build the identity client settings for a profile.
pub fn profile_to_identity_config(
    profile: &Profile,
    profile_name: &str,
) -> Result<IdentityConfig, ConfigError> {
    let identity = profile
        .identity
        .as_ref()
        .ok_or_else(|| ConfigError::NoIdentity {
            profile: profile_name.into(),
        })?;
    if identity.domain.trim().is_empty() || identity.client_id.trim().is_empty() {
        return Err(ConfigError::Validation {
            field: "identity".into(),
            reason: "domain and client_id are required".into(),
        });
    }

    let mut config = IdentityConfig::new(
        identity.domain.clone(),
        identity.client_id.clone(),
        identity.audience.clone(),
        parse_url("identity.redirect_uri", &identity.redirect_uri)?,
    );
    config.client_secret = resolve_client_secret(identity, profile_name);
    if let Some(ref scope) = identity.scope {
        config.scope.clone_from(scope);
    }
    Ok(config)
}
