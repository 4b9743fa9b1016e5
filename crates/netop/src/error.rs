//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use netop_config::ConfigError;
use netop_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach {url}")]
    #[diagnostic(
        code(netop::connection_failed),
        help(
            "{reason}\n\
             Check the api_url of your profile, or try: netop --demo dashboard"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication required")]
    #[diagnostic(
        code(netop::auth_required),
        help(
            "{message}\n\
             Run: netop auth login    (or pass --demo to use sample data)"
        )
    )]
    AuthRequired { message: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(code(netop::not_found), help("Run: netop {list_command}"))]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error (HTTP {status}): {message}")]
    #[diagnostic(code(netop::api_error))]
    ApiError { status: u16, message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(netop::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(netop::config),
        help(
            "Create a profile with: netop config init\n\
             Or explore without an account: netop --demo dashboard"
        )
    )]
    Config { message: String },

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(netop::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: netop config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(netop::config_load))]
    ConfigLoad(Box<figment::Error>),

    // ── Internal / IO ────────────────────────────────────────────────
    #[error("Internal error: {0}")]
    #[diagnostic(code(netop::internal))]
    Internal(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthRequired { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    pub fn validation(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// The `list` command that shows records of an entity kind.
fn list_command(entity_type: &str) -> &'static str {
    match entity_type {
        "Incident" => "incidents list",
        "Site" => "sites list",
        "Device" => "devices list",
        "Notification preference" => "notifications list",
        _ => "--help",
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Auth { message } => CliError::AuthRequired { message },

            CoreError::NotFound {
                entity_type,
                identifier,
            } => CliError::NotFound {
                list_command: list_command(&entity_type).into(),
                resource_type: entity_type,
                identifier,
            },

            CoreError::Validation { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::Api { status, message } => CliError::ApiError { status, message },

            CoreError::Network { url, reason } => CliError::ConnectionFailed { url, reason },

            CoreError::Config { message } => CliError::Config { message },

            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::UnknownProfile { profile } => CliError::ProfileNotFound {
                name: profile,
                available: String::new(),
            },
            ConfigError::Figment(e) => CliError::ConfigLoad(e),
            ConfigError::Io(e) => CliError::Io(e),
            other @ (ConfigError::NoIdentity { .. } | ConfigError::Serialization(_)) => {
                CliError::Config {
                    message: other.to_string(),
                }
            }
        }
    }
}
