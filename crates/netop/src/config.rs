//! CLI configuration: a thin wrapper around `netop_config`.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides (--api-url,
//! --demo, --timeout) and wires up the session's identity provider.

use std::sync::Arc;
use std::time::Duration;

use netop_api::{IdentityClient, TransportConfig};
use netop_config::FileSessionStore;
use netop_core::{IdentityProvider, OidcProvider, Session, SessionConfig, SessionStore};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use netop_config::{Config, Profile, config_path, load_config, load_config_or_default, save_config};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .unwrap_or_else(|| config.default_profile_name().to_owned())
}

/// Look up a profile, listing the alternatives when it does not exist.
pub fn find_profile(config: &Config, name: &str) -> Result<Profile, CliError> {
    config.profile(name).map_err(|_| CliError::ProfileNotFound {
        name: name.into(),
        available: if config.profiles.is_empty() {
            "(none)".into()
        } else {
            config.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
        },
    })
}

/// Translate a profile plus global flags into a `SessionConfig`.
///
/// Flags take priority over profile values.
pub fn resolve_session_config(
    profile: &Profile,
    config: &Config,
    global: &GlobalOpts,
) -> Result<SessionConfig, CliError> {
    let mut session = netop_config::profile_to_session_config(profile, &config.defaults)?;
    if let Some(ref raw) = global.api_url {
        session.api_url = raw
            .parse()
            .map_err(|e| CliError::validation("api-url", format!("invalid URL {raw:?}: {e}")))?;
    }
    if let Some(secs) = global.timeout {
        session.timeout = Duration::from_secs(secs);
    }
    session.demo |= global.demo;
    Ok(session)
}

/// Everything needed to open a session for the active profile.
pub struct SessionParts {
    pub profile_name: String,
    pub config: SessionConfig,
    pub provider: Option<Arc<dyn IdentityProvider>>,
    pub store: Arc<dyn SessionStore>,
}

pub fn session_parts(global: &GlobalOpts) -> Result<SessionParts, CliError> {
    let cfg = load_config()?;
    let profile_name = active_profile_name(global, &cfg);
    let profile = find_profile(&cfg, &profile_name)?;
    let config = resolve_session_config(&profile, &cfg, global)?;

    let store: Arc<dyn SessionStore> = Arc::new(FileSessionStore::new(profile_name.clone()));
    let provider = match profile.identity {
        Some(_) => {
            let identity = netop_config::profile_to_identity_config(&profile, &profile_name)?;
            let transport = TransportConfig::default().with_timeout(config.timeout);
            let client = IdentityClient::new(identity, &transport).map_err(netop_core::CoreError::from)?;
            let provider: Arc<dyn IdentityProvider> =
                Arc::new(OidcProvider::new(client, Arc::clone(&store)));
            Some(provider)
        }
        None => None,
    };

    Ok(SessionParts {
        profile_name,
        config,
        provider,
        store,
    })
}

/// Open a session for the active profile.
pub async fn connect(global: &GlobalOpts) -> Result<Session, CliError> {
    let parts = session_parts(global)?;
    tracing::debug!(profile = %parts.profile_name, demo = parts.config.demo, "connecting");
    Ok(Session::connect(parts.config, parts.provider, parts.store).await?)
}
