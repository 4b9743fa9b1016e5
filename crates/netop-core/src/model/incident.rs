// ── Incident domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use super::entity_id::EntityId;
use crate::error::CoreError;

/// Urgency of an incident or the threshold of a notification preference.
///
/// Variants are declared least-urgent first so the derived `Ord` ranks
/// `Critical` highest.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Most urgent first, the order dashboards list them in.
    pub const ALL: [Severity; 4] = [Self::Critical, Self::High, Self::Medium, Self::Low];
}

/// Incident lifecycle. Moves forward only:
/// `open → investigating → resolved → closed`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum IncidentStatus {
    #[serde(alias = "active")]
    #[strum(to_string = "open", serialize = "active")]
    Open,
    #[serde(alias = "in_progress")]
    #[strum(to_string = "investigating", serialize = "in_progress")]
    Investigating,
    Resolved,
    Closed,
}

impl IncidentStatus {
    pub const ALL: [IncidentStatus; 4] = [
        Self::Open,
        Self::Investigating,
        Self::Resolved,
        Self::Closed,
    ];

    fn rank(self) -> u8 {
        match self {
            Self::Open => 0,
            Self::Investigating => 1,
            Self::Resolved => 2,
            Self::Closed => 3,
        }
    }

    /// Open or under investigation.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Open | Self::Investigating)
    }

    /// Forward moves (including skips) and same-state no-ops are allowed.
    pub fn can_transition_to(self, next: Self) -> bool {
        next.rank() >= self.rank()
    }
}

/// Incident / preference category.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Category {
    #[serde(alias = "Operational")]
    Operational,
    #[serde(alias = "Network Utilization")]
    #[strum(to_string = "network_utilization", serialize = "network utilization")]
    NetworkUtilization,
    #[serde(alias = "Network Performance")]
    #[strum(to_string = "network_performance", serialize = "network performance")]
    NetworkPerformance,
    #[serde(alias = "Service Performance", alias = "performance")]
    #[strum(
        to_string = "service_performance",
        serialize = "service performance",
        serialize = "performance"
    )]
    ServicePerformance,
    #[serde(alias = "Resource Utilization")]
    #[strum(to_string = "resource_utilization", serialize = "resource utilization")]
    ResourceUtilization,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Self::Operational,
        Self::NetworkUtilization,
        Self::NetworkPerformance,
        Self::ServicePerformance,
        Self::ResourceUtilization,
    ];

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Operational => "Operational",
            Self::NetworkUtilization => "Network Utilization",
            Self::NetworkPerformance => "Network Performance",
            Self::ServicePerformance => "Service Performance",
            Self::ResourceUtilization => "Resource Utilization",
        }
    }
}

/// A denormalized site or device name on an incident.
///
/// `Unresolved` means the referenced record could not be found; it renders
/// with a fallback label instead of leaking an empty value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum DisplayName {
    Named(String),
    #[default]
    Unresolved,
}

impl DisplayName {
    pub fn as_deref(&self) -> Option<&str> {
        match self {
            Self::Named(name) => Some(name),
            Self::Unresolved => None,
        }
    }

    pub fn label<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.as_deref().unwrap_or(fallback)
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Named(_))
    }
}

impl From<Option<String>> for DisplayName {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(name) if !name.trim().is_empty() => Self::Named(name),
            _ => Self::Unresolved,
        }
    }
}

impl From<DisplayName> for Option<String> {
    fn from(value: DisplayName) -> Self {
        match value {
            DisplayName::Named(name) => Some(name),
            DisplayName::Unresolved => None,
        }
    }
}

pub const UNKNOWN_SITE: &str = "Unknown Site";
pub const UNKNOWN_DEVICE: &str = "Unknown Device";

/// A detected operational problem at a site/device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub severity: Severity,
    pub status: IncidentStatus,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub site_id: Option<EntityId>,
    #[serde(default)]
    pub device_id: Option<EntityId>,
    #[serde(default)]
    pub site_name: DisplayName,
    #[serde(default)]
    pub device_name: DisplayName,
    pub detected_at: DateTime<Utc>,
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,
    /// Free-text analysis attached by an operator or the backend.
    #[serde(default)]
    pub insight: Option<String>,
    #[serde(default)]
    pub reviewed: bool,
    #[serde(default)]
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl Incident {
    pub fn site_label(&self) -> &str {
        self.site_name.label(UNKNOWN_SITE)
    }

    pub fn device_label(&self) -> &str {
        self.device_name.label(UNKNOWN_DEVICE)
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Merge a patch, enforcing the lifecycle and timestamp invariants.
    ///
    /// Validation runs before any field changes, so a rejected patch leaves
    /// the record untouched.
    pub fn apply_patch(&mut self, patch: &IncidentPatch, now: DateTime<Utc>) -> Result<(), CoreError> {
        if let Some(next) = patch.status {
            if !self.status.can_transition_to(next) {
                return Err(CoreError::validation(format!(
                    "cannot move incident {} from {} back to {next}",
                    self.id, self.status
                )));
            }
        }

        if let Some(next) = patch.status {
            self.status = next;
            if !next.is_active() && self.resolved_at.is_none() {
                self.resolved_at = Some(now.max(self.detected_at));
            }
        }
        if let Some(reviewed) = patch.reviewed {
            if reviewed && !self.reviewed {
                self.reviewed_at = Some(now);
            } else if !reviewed {
                self.reviewed_at = None;
            }
            self.reviewed = reviewed;
        }
        if let Some(ref insight) = patch.insight {
            self.insight = Some(insight.clone());
        }
        Ok(())
    }
}

/// Partial update for an incident.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<IncidentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insight: Option<String>,
}

impl IncidentPatch {
    pub fn status(status: IncidentStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn reviewed() -> Self {
        Self {
            reviewed: Some(true),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.reviewed.is_none() && self.insight.is_none()
    }
}
