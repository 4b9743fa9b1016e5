// ── Dashboard summary ──

use indexmap::IndexMap;
use serde::Serialize;

use crate::aggregate::severity_breakdown;
use crate::model::{Incident, Severity};
use crate::source::Snapshot;

/// How many incidents the "recent" panel shows.
pub const RECENT_LIMIT: usize = 5;

/// Headline numbers for the home view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub active_incidents: usize,
    pub sites_online: usize,
    pub sites_total: usize,
    pub devices_online: usize,
    pub devices_total: usize,
    /// Severity breakdown of active incidents only.
    pub active_by_severity: IndexMap<Severity, usize>,
    /// Newest first.
    pub recent: Vec<Incident>,
}

impl Dashboard {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let active: Vec<&Incident> = snapshot.incidents.iter().filter(|i| i.is_active()).collect();

        let mut recent = snapshot.incidents.clone();
        recent.sort_by(|a, b| b.detected_at.cmp(&a.detected_at));
        recent.truncate(RECENT_LIMIT);

        Self {
            active_incidents: active.len(),
            sites_online: snapshot.sites.iter().filter(|s| s.is_online()).count(),
            sites_total: snapshot.sites.len(),
            devices_online: snapshot.devices.iter().filter(|d| d.is_online()).count(),
            devices_total: snapshot.devices.len(),
            active_by_severity: severity_breakdown(active),
            recent,
        }
    }
}
