// ── Site and device domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use strum::{AsRefStr, Display, EnumString};

use super::entity_id::EntityId;

/// Operational state of a site.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SiteStatus {
    #[serde(alias = "operational", alias = "healthy")]
    #[strum(to_string = "online", serialize = "operational", serialize = "healthy")]
    Online,
    Offline,
    Maintenance,
    Degraded,
}

/// A physical location hosting devices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub location: String,
    pub status: SiteStatus,
    #[serde(default)]
    pub device_count: u32,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl Site {
    pub fn is_online(&self) -> bool {
        self.status == SiteStatus::Online
    }
}

/// Operational state of a device.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DeviceStatus {
    #[serde(alias = "operational", alias = "healthy")]
    #[strum(to_string = "online", serialize = "operational", serialize = "healthy")]
    Online,
    Offline,
    Degraded,
}

/// A monitored network element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: EntityId,
    pub name: String,
    /// Free-form kind: `router`, `switch`, `firewall`, `server`, ...
    pub device_type: String,
    #[serde(default)]
    pub site_id: Option<EntityId>,
    pub status: DeviceStatus,
    #[serde(default)]
    pub ip_address: Option<IpAddr>,
    #[serde(default)]
    pub last_seen: Option<DateTime<Utc>>,
}

impl Device {
    pub fn is_online(&self) -> bool {
        self.status == DeviceStatus::Online
    }
}

/// Filter for device listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceQuery {
    pub site_id: Option<EntityId>,
    pub status: Option<DeviceStatus>,
}
