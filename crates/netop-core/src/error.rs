// ── Core error types ──
//
// User-facing errors from netop-core. Consumers never see reqwest errors or
// JSON parse failures directly; the `From<netop_api::Error>` impl translates
// transport-layer errors into domain variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Auth ─────────────────────────────────────────────────────────
    /// No usable credentials; the user has to log in interactively.
    #[error("Authentication required: {message}")]
    Auth { message: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    #[error("Validation failed: {message}")]
    Validation { message: String },

    // ── Remote errors (wrapped, not exposed raw) ─────────────────────
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Cannot reach {url}: {reason}")]
    Network { url: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn not_found(entity_type: &str, identifier: impl ToString) -> Self {
        Self::NotFound {
            entity_type: entity_type.to_owned(),
            identifier: identifier.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<netop_api::Error> for CoreError {
    fn from(err: netop_api::Error) -> Self {
        match err {
            netop_api::Error::Authentication { message }
            | netop_api::Error::Identity { message } => CoreError::Auth { message },
            netop_api::Error::Transport(ref e) => match e.status() {
                Some(status) => CoreError::Api {
                    status: status.as_u16(),
                    message: e.to_string(),
                },
                None => CoreError::Network {
                    url: e
                        .url()
                        .map_or_else(|| "<unknown>".into(), ToString::to_string),
                    reason: e.to_string(),
                },
            },
            netop_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            netop_api::Error::Tls(reason) => CoreError::Network {
                url: String::new(),
                reason: format!("TLS error: {reason}"),
            },
            netop_api::Error::Api { status, message } => CoreError::Api { status, message },
            netop_api::Error::NotFound { path } => CoreError::NotFound {
                entity_type: "Resource".into(),
                identifier: path,
            },
            netop_api::Error::Deserialization { message, .. } => {
                CoreError::Internal(format!("Unexpected response shape: {message}"))
            }
        }
    }
}
