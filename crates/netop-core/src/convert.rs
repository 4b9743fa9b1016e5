// ── API-to-domain type conversions ──
//
// Bridges raw `netop_api` wire types into canonical `netop_core::model`
// records. Each `From` impl normalizes field names, parses strings into
// strong types, and fills defaults for missing optional data. Unknown enum
// spellings are logged and mapped to the least alarming variant rather than
// dropping the record.

use chrono::{DateTime, Utc};
use tracing::warn;

use netop_api::models::{
    ApiAppSettings, ApiDevice, ApiIncident, ApiNotificationPreference, ApiSite, IncidentUpdate,
    WireId,
};

use crate::model::preference::hhmm;
use crate::model::{
    AppSettings, Category, Device, DeviceStatus, DisplayName, EntityId, Incident, IncidentPatch,
    IncidentStatus, NotificationPreference, Severity, Site, SiteStatus,
};

// ── Helpers ────────────────────────────────────────────────────────

impl From<WireId> for EntityId {
    fn from(id: WireId) -> Self {
        match id {
            WireId::Number(n) => EntityId::from(n),
            WireId::Text(s) => EntityId::from(s),
        }
    }
}

impl From<&EntityId> for WireId {
    fn from(id: &EntityId) -> Self {
        WireId::Text(id.to_string())
    }
}

/// Parse an RFC 3339 timestamp, dropping unparseable values.
fn parse_datetime(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_severity(raw: Option<&str>) -> Severity {
    match raw.map(str::trim) {
        Some("urgent") => Severity::Critical,
        Some(s) => s.parse().unwrap_or_else(|_| {
            warn!(severity = s, "unknown severity, treating as low");
            Severity::Low
        }),
        None => Severity::Low,
    }
}

fn parse_status(raw: Option<&str>) -> IncidentStatus {
    match raw {
        Some(s) => s.parse().unwrap_or_else(|_| {
            warn!(status = s, "unknown incident status, treating as open");
            IncidentStatus::Open
        }),
        None => IncidentStatus::Open,
    }
}

fn parse_category(raw: Option<&str>) -> Option<Category> {
    let raw = raw?;
    let parsed = raw.parse().ok();
    if parsed.is_none() {
        warn!(category = raw, "unknown incident category");
    }
    parsed
}

// ── Incidents ──────────────────────────────────────────────────────

impl From<ApiIncident> for Incident {
    fn from(raw: ApiIncident) -> Self {
        let detected_at = parse_datetime(raw.detected_at.as_deref()).unwrap_or(DateTime::UNIX_EPOCH);
        let resolved_at =
            parse_datetime(raw.resolved_at.as_deref()).map(|at| at.max(detected_at));
        Incident {
            id: raw.id.into(),
            title: raw.title,
            description: raw.description.unwrap_or_default(),
            severity: parse_severity(raw.severity.as_deref()),
            status: parse_status(raw.status.as_deref()),
            category: parse_category(raw.category.as_deref()),
            site_id: raw.site_id.map(EntityId::from),
            device_id: raw.device_id.map(EntityId::from),
            site_name: DisplayName::from(raw.site),
            device_name: DisplayName::from(raw.device),
            detected_at,
            resolved_at,
            insight: raw.insight.filter(|s| !s.is_empty()),
            reviewed: raw.reviewed,
            reviewed_at: parse_datetime(raw.reviewed_at.as_deref()),
        }
    }
}

impl From<&IncidentPatch> for IncidentUpdate {
    fn from(patch: &IncidentPatch) -> Self {
        IncidentUpdate {
            status: patch.status.map(|s| s.to_string()),
            reviewed: patch.reviewed,
            insight: patch.insight.clone(),
        }
    }
}

// ── Sites / devices ────────────────────────────────────────────────

impl From<ApiSite> for Site {
    fn from(raw: ApiSite) -> Self {
        let status = raw
            .status
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or(SiteStatus::Offline);
        Site {
            id: raw.id.into(),
            name: raw.name,
            location: raw.location.unwrap_or_default(),
            status,
            device_count: raw.device_count,
            last_updated: parse_datetime(raw.last_updated.as_deref()),
        }
    }
}

impl From<ApiDevice> for Device {
    fn from(raw: ApiDevice) -> Self {
        let status = raw
            .status
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DeviceStatus::Offline);
        Device {
            id: raw.id.into(),
            name: raw.name,
            device_type: raw.device_type.unwrap_or_else(|| "unknown".into()),
            site_id: raw.site_id.map(EntityId::from),
            status,
            ip_address: raw.ip_address.as_deref().and_then(|s| s.parse().ok()),
            last_seen: parse_datetime(raw.last_seen.as_deref()),
        }
    }
}

// ── Preferences / settings ─────────────────────────────────────────

/// Preference rows whose category or severity we cannot interpret are
/// skipped; `None` signals that to the caller.
pub(crate) fn preference_from_api(raw: ApiNotificationPreference) -> Option<NotificationPreference> {
    let Ok(category) = raw.category.parse::<Category>() else {
        warn!(category = %raw.category, "skipping preference with unknown category");
        return None;
    };
    let Ok(severity) = raw.severity.parse::<Severity>() else {
        warn!(severity = %raw.severity, "skipping preference with unknown severity");
        return None;
    };
    Some(NotificationPreference {
        id: raw.id.into(),
        user_id: raw.user_id.unwrap_or_default(),
        category,
        severity,
        enabled: raw.enabled,
        push: raw.push_notifications,
        email: raw.email_notifications,
        quiet_hours_start: raw.quiet_hours_start.as_deref().and_then(hhmm::parse),
        quiet_hours_end: raw.quiet_hours_end.as_deref().and_then(hhmm::parse),
    })
}

impl From<&NotificationPreference> for ApiNotificationPreference {
    fn from(pref: &NotificationPreference) -> Self {
        ApiNotificationPreference {
            id: WireId::from(&pref.id),
            user_id: Some(pref.user_id.clone()).filter(|u| !u.is_empty()),
            category: pref.category.to_string(),
            severity: pref.severity.to_string(),
            enabled: pref.enabled,
            push_notifications: pref.push,
            email_notifications: pref.email,
            quiet_hours_start: pref.quiet_hours_start.map(hhmm::format),
            quiet_hours_end: pref.quiet_hours_end.map(hhmm::format),
        }
    }
}

impl From<ApiAppSettings> for AppSettings {
    fn from(raw: ApiAppSettings) -> Self {
        AppSettings {
            dark_mode: raw.dark_mode,
            auto_refresh: raw.auto_refresh,
            notifications_enabled: raw.notifications_enabled,
            sound_enabled: raw.sound_enabled,
            vibration_enabled: raw.vibration_enabled,
        }
    }
}

impl From<&AppSettings> for ApiAppSettings {
    fn from(s: &AppSettings) -> Self {
        ApiAppSettings {
            dark_mode: s.dark_mode,
            auto_refresh: s.auto_refresh,
            notifications_enabled: s.notifications_enabled,
            sound_enabled: s.sound_enabled,
            vibration_enabled: s.vibration_enabled,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn incident_from_legacy_payload() {
        let raw: ApiIncident = serde_json::from_value(json!({
            "id": "inc-001",
            "title": "Network Connectivity Issue",
            "severity": "high",
            "status": "active",
            "category": "performance",
            "site_id": "site-001",
            "created_at": "2024-01-15T10:30:00Z"
        }))
        .unwrap();
        let inc = Incident::from(raw);
        assert_eq!(inc.status, IncidentStatus::Open);
        assert_eq!(inc.category, Some(Category::ServicePerformance));
        assert_eq!(inc.site_id, Some(EntityId::from("site-001")));
        assert_eq!(inc.site_name, DisplayName::Unresolved);
        assert_eq!(inc.detected_at.to_rfc3339(), "2024-01-15T10:30:00+00:00");
    }

    #[test]
    fn numeric_ids_and_priority() {
        let raw: ApiIncident = serde_json::from_value(json!({
            "id": 4,
            "title": "Disk full",
            "priority": "urgent",
            "device_id": 12
        }))
        .unwrap();
        let inc = Incident::from(raw);
        assert_eq!(inc.id, EntityId::from("4"));
        assert_eq!(inc.severity, Severity::Critical);
        assert_eq!(inc.device_id, Some(EntityId::from("12")));
    }

    #[test]
    fn preference_round_trip_keeps_quiet_hours() {
        let raw: ApiNotificationPreference = serde_json::from_value(json!({
            "id": "p1",
            "user_id": "u1",
            "category": "network_utilization",
            "severity": "high",
            "email_notifications": true,
            "quiet_hours_start": "22:00",
            "quiet_hours_end": "07:00"
        }))
        .unwrap();
        let pref = preference_from_api(raw.clone()).unwrap();
        assert_eq!(pref.category, Category::NetworkUtilization);
        assert!(pref.push && pref.email && pref.enabled);
        assert_eq!(ApiNotificationPreference::from(&pref), raw);
    }

    #[test]
    fn unknown_preference_category_is_skipped() {
        let raw: ApiNotificationPreference = serde_json::from_value(json!({
            "id": "p1", "category": "weather", "severity": "high"
        }))
        .unwrap();
        assert!(preference_from_api(raw).is_none());
    }

    #[test]
    fn device_ip_parsed() {
        let raw: ApiDevice = serde_json::from_value(json!({
            "id": "dev-001", "name": "Core Router - HQ", "type": "router",
            "status": "operational", "ip_address": "192.168.1.1"
        }))
        .unwrap();
        let dev = Device::from(raw);
        assert!(dev.is_online());
        assert_eq!(dev.ip_address.unwrap().to_string(), "192.168.1.1");
    }
}
