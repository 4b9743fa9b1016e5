// Wire types for the incident API.
//
// These mirror the JSON the API produces:
// loosely typed strings, numeric or string ids, and a couple of legacy
// field spellings accepted through serde aliases. `netop-core` converts
// them into strongly typed domain records.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier as it appears on the wire: either a JSON number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireId {
    Number(i64),
    Text(String),
}

impl fmt::Display for WireId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for WireId {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

/// Error body returned with non-2xx responses.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    pub message: Option<String>,
    pub error: Option<String>,
}

impl ErrorBody {
    pub fn into_message(self) -> Option<String> {
        self.message.or(self.error).filter(|m| !m.is_empty())
    }
}

// ── Incidents ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiIncident {
    pub id: WireId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Older payloads call this `priority`.
    #[serde(default, alias = "priority")]
    pub severity: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub site_id: Option<WireId>,
    #[serde(default)]
    pub device_id: Option<WireId>,
    /// Site display name, when the API already denormalized it.
    #[serde(default, alias = "site_name")]
    pub site: Option<String>,
    #[serde(default, alias = "device_name")]
    pub device: Option<String>,
    #[serde(default, alias = "created_at")]
    pub detected_at: Option<String>,
    #[serde(default)]
    pub resolved_at: Option<String>,
    #[serde(default)]
    pub insight: Option<String>,
    #[serde(default)]
    pub reviewed: bool,
    #[serde(default)]
    pub reviewed_at: Option<String>,
}

/// Body of `PUT /incidents/{id}`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IncidentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insight: Option<String>,
}

// ── Sites / devices ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSite {
    pub id: WireId,
    #[serde(alias = "site_name")]
    pub name: String,
    #[serde(default, alias = "region")]
    pub location: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub device_count: u32,
    #[serde(default, alias = "updated_at")]
    pub last_updated: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiDevice {
    pub id: WireId,
    pub name: String,
    #[serde(default, rename = "type")]
    pub device_type: Option<String>,
    #[serde(default)]
    pub site_id: Option<WireId>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "ip")]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub last_seen: Option<String>,
}

// ── User-scoped resources ───────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct ApiNotificationPreference {
    pub id: WireId,
    #[serde(default)]
    pub user_id: Option<String>,
    pub category: String,
    pub severity: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub push_notifications: bool,
    #[serde(default)]
    pub email_notifications: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiet_hours_start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiet_hours_end: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct ApiAppSettings {
    #[serde(default)]
    pub dark_mode: bool,
    #[serde(default = "default_true")]
    pub auto_refresh: bool,
    #[serde(default = "default_true")]
    pub notifications_enabled: bool,
    #[serde(default = "default_true")]
    pub sound_enabled: bool,
    #[serde(default = "default_true")]
    pub vibration_enabled: bool,
}

impl Default for ApiAppSettings {
    fn default() -> Self {
        Self {
            dark_mode: false,
            auto_refresh: true,
            notifications_enabled: true,
            sound_enabled: true,
            vibration_enabled: true,
        }
    }
}

fn default_true() -> bool {
    true
}
