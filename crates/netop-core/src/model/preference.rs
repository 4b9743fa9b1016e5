// ── Notification preferences and app settings ──

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use super::entity_id::EntityId;
use super::incident::{Category, Severity};

/// Delivery channel for a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Channel {
    Push,
    Email,
}

/// Per-user rule: whether and how to be notified for a
/// (category, severity) pair. At most one record exists per
/// (user, category, severity).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct NotificationPreference {
    pub id: EntityId,
    pub user_id: String,
    pub category: Category,
    pub severity: Severity,
    pub enabled: bool,
    pub push: bool,
    pub email: bool,
    #[serde(default, with = "hhmm")]
    pub quiet_hours_start: Option<NaiveTime>,
    #[serde(default, with = "hhmm")]
    pub quiet_hours_end: Option<NaiveTime>,
}

impl NotificationPreference {
    /// Channels that would actually fire. A disabled rule fires nothing,
    /// whatever its channel flags say.
    pub fn effective_channels(&self) -> Vec<Channel> {
        if !self.enabled {
            return Vec::new();
        }
        let mut channels = Vec::with_capacity(2);
        if self.push {
            channels.push(Channel::Push);
        }
        if self.email {
            channels.push(Channel::Email);
        }
        channels
    }

    pub fn channel(&self, channel: Channel) -> bool {
        match channel {
            Channel::Push => self.push,
            Channel::Email => self.email,
        }
    }

    /// Whether `t` falls inside the quiet window. Windows whose end is
    /// before their start wrap midnight (22:00–07:00). The start is
    /// inclusive, the end exclusive.
    pub fn in_quiet_hours(&self, t: NaiveTime) -> bool {
        match (self.quiet_hours_start, self.quiet_hours_end) {
            (Some(start), Some(end)) if start <= end => t >= start && t < end,
            (Some(start), Some(end)) => t >= start || t < end,
            _ => false,
        }
    }

    pub fn apply_patch(&mut self, patch: &PreferencePatch) {
        if let Some(enabled) = patch.enabled {
            self.enabled = enabled;
        }
        if let Some(push) = patch.push {
            self.push = push;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(start) = patch.quiet_hours_start {
            self.quiet_hours_start = start;
        }
        if let Some(end) = patch.quiet_hours_end {
            self.quiet_hours_end = end;
        }
    }
}

/// Filter for preference listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferenceQuery {
    pub category: Option<Category>,
    pub severity: Option<Severity>,
}

impl PreferenceQuery {
    pub fn matches(&self, pref: &NotificationPreference) -> bool {
        self.category.is_none_or(|c| c == pref.category)
            && self.severity.is_none_or(|s| s == pref.severity)
    }
}

/// Partial update for a preference. Quiet hours use a nested option:
/// `Some(None)` clears the bound.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferencePatch {
    pub enabled: Option<bool>,
    pub push: Option<bool>,
    pub email: Option<bool>,
    pub quiet_hours_start: Option<Option<NaiveTime>>,
    pub quiet_hours_end: Option<Option<NaiveTime>>,
}

impl PreferencePatch {
    pub fn enabled(enabled: bool) -> Self {
        Self {
            enabled: Some(enabled),
            ..Self::default()
        }
    }

    pub fn channel(channel: Channel, enabled: bool) -> Self {
        match channel {
            Channel::Push => Self {
                push: Some(enabled),
                ..Self::default()
            },
            Channel::Email => Self {
                email: Some(enabled),
                ..Self::default()
            },
        }
    }

    /// Everything on: the bulk "enable all critical" action.
    pub fn all_on() -> Self {
        Self {
            enabled: Some(true),
            push: Some(true),
            email: Some(true),
            ..Self::default()
        }
    }
}

/// Per-user application settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct AppSettings {
    pub dark_mode: bool,
    pub auto_refresh: bool,
    pub notifications_enabled: bool,
    pub sound_enabled: bool,
    pub vibration_enabled: bool,
}

impl Default for AppSettings {
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

impl AppSettings {
    pub fn apply_patch(&mut self, patch: &AppSettingsPatch) {
        if let Some(v) = patch.dark_mode {
            self.dark_mode = v;
        }
        if let Some(v) = patch.auto_refresh {
            self.auto_refresh = v;
        }
        if let Some(v) = patch.notifications_enabled {
            self.notifications_enabled = v;
        }
        if let Some(v) = patch.sound_enabled {
            self.sound_enabled = v;
        }
        if let Some(v) = patch.vibration_enabled {
            self.vibration_enabled = v;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettingsPatch {
    pub dark_mode: Option<bool>,
    pub auto_refresh: Option<bool>,
    pub notifications_enabled: Option<bool>,
    pub sound_enabled: Option<bool>,
    pub vibration_enabled: Option<bool>,
}

/// `HH:MM` wire format for optional quiet-hour bounds. Seconds are
/// accepted on input and dropped on output.
pub(crate) mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn parse(raw: &str) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(raw, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
            .ok()
    }

    pub fn format(t: NaiveTime) -> String {
        t.format("%H:%M").to_string()
    }

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(value: &Option<NaiveTime>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(t) => s.serialize_some(&format(*t)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveTime>, D::Error> {
        let raw = Option::<String>::deserialize(d)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => parse(s)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid time {s:?}, expected HH:MM"))),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn pref() -> NotificationPreference {
        NotificationPreference {
            id: EntityId::from("pref-1"),
            user_id: "demo-user-123".into(),
            category: Category::Operational,
            severity: Severity::Critical,
            enabled: true,
            push: true,
            email: false,
            quiet_hours_start: None,
            quiet_hours_end: None,
        }
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn disabled_rule_has_no_channels() {
        let mut p = pref();
        p.email = true;
        assert_eq!(p.effective_channels(), vec![Channel::Push, Channel::Email]);
        p.enabled = false;
        assert!(p.effective_channels().is_empty());
    }

    #[test]
    fn quiet_hours_wrap_midnight() {
        let mut p = pref();
        p.quiet_hours_start = Some(t(22, 0));
        p.quiet_hours_end = Some(t(7, 0));
        assert!(p.in_quiet_hours(t(23, 30)));
        assert!(p.in_quiet_hours(t(3, 0)));
        assert!(!p.in_quiet_hours(t(7, 0)));
        assert!(!p.in_quiet_hours(t(12, 0)));
    }

    #[test]
    fn quiet_hours_same_day_window() {
        let mut p = pref();
        p.quiet_hours_start = Some(t(12, 0));
        p.quiet_hours_end = Some(t(13, 0));
        assert!(p.in_quiet_hours(t(12, 30)));
        assert!(!p.in_quiet_hours(t(13, 30)));
    }

    #[test]
    fn quiet_hours_round_trip_as_hhmm() {
        let mut p = pref();
        p.quiet_hours_start = Some(t(22, 0));
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["quiet_hours_start"], "22:00");
        assert!(json["quiet_hours_end"].is_null());
        let back: NotificationPreference = serde_json::from_value(json).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn patch_clears_quiet_hours() {
        let mut p = pref();
        p.quiet_hours_start = Some(t(22, 0));
        p.apply_patch(&PreferencePatch {
            quiet_hours_start: Some(None),
            ..PreferencePatch::default()
        });
        assert_eq!(p.quiet_hours_start, None);
    }
}
