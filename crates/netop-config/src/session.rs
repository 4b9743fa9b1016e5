// ── File-backed session store ──
//
// The demo flag is a marker file per profile under the state dir; the
// refresh token lives in the system keyring.

use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

use netop_core::{CoreError, SessionStore};

use crate::{KEYRING_SERVICE, state_dir};

pub struct FileSessionStore {
    profile: String,
    dir: PathBuf,
}

impl FileSessionStore {
    /// Store for `profile` under the platform state directory.
    pub fn new(profile: impl Into<String>) -> Self {
        Self::in_dir(profile, state_dir())
    }

    pub fn in_dir(profile: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            profile: profile.into(),
            dir: dir.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn demo_marker(&self) -> PathBuf {
        self.dir.join(format!("{}.demo", self.profile))
    }

    fn keyring_entry(&self) -> Result<keyring::Entry, keyring::Error> {
        keyring::Entry::new(KEYRING_SERVICE, &format!("{}/refresh-token", self.profile))
    }
}

fn io_error(action: &str, path: &Path, err: &std::io::Error) -> CoreError {
    CoreError::Config {
        message: format!("could not {action} {}: {err}", path.display()),
    }
}

impl SessionStore for FileSessionStore {
    fn demo_mode(&self) -> bool {
        self.demo_marker().is_file()
    }

    fn set_demo_mode(&self, enabled: bool) -> Result<(), CoreError> {
        let marker = self.demo_marker();
        if enabled {
            std::fs::create_dir_all(&self.dir).map_err(|e| io_error("create", &self.dir, &e))?;
            std::fs::write(&marker, b"").map_err(|e| io_error("write", &marker, &e))?;
            debug!(path = %marker.display(), "demo mode persisted");
        } else {
            match std::fs::remove_file(&marker) {
                Ok(()) => debug!(path = %marker.display(), "demo mode cleared"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(io_error("remove", &marker, &e)),
            }
        }
        Ok(())
    }

    fn refresh_token(&self) -> Option<SecretString> {
        match self.keyring_entry().and_then(|entry| entry.get_password()) {
            Ok(token) => Some(SecretString::from(token)),
            Err(keyring::Error::NoEntry) => None,
            Err(e) => {
                warn!(error = %e, "keyring read failed");
                None
            }
        }
    }

    fn set_refresh_token(&self, token: Option<&SecretString>) -> Result<(), CoreError> {
        let entry = self.keyring_entry().map_err(|e| CoreError::Config {
            message: format!("keyring unavailable: {e}"),
        })?;
        let result = match token {
            Some(token) => entry.set_password(token.expose_secret()),
            None => match entry.delete_credential() {
                Err(keyring::Error::NoEntry) => Ok(()),
                other => other,
            },
        };
        result.map_err(|e| CoreError::Config {
            message: format!("keyring update failed: {e}"),
        })
    }
}
