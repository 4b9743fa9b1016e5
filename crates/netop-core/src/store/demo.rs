// ── Demo dataset ──
//
// Seed records for demo mode: five incidents, four sites, five devices,
// and one notification preference per (category, severity) for the demo
// user. Two incidents reference devices that are not in the dataset and
// render as "Unknown Device".

use chrono::{DateTime, TimeZone, Utc};

use crate::model::user::DEMO_USER_ID;
use crate::model::{
    Category, Device, DeviceStatus, DisplayName, EntityId, Incident, IncidentStatus,
    NotificationPreference, Severity, Site, SiteStatus,
};

/// Categories users can subscribe to.
pub(crate) const PREFERENCE_CATEGORIES: [Category; 4] = [
    Category::Operational,
    Category::NetworkUtilization,
    Category::ServicePerformance,
    Category::ResourceUtilization,
];

fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, 0)
        .single()
        .unwrap_or(DateTime::UNIX_EPOCH)
}

struct IncidentSeed {
    id: &'static str,
    title: &'static str,
    description: &'static str,
    severity: Severity,
    status: IncidentStatus,
    category: Category,
    site: &'static str,
    device: &'static str,
    detected_at: DateTime<Utc>,
    resolved_at: Option<DateTime<Utc>>,
    insight: Option<&'static str>,
}

pub(crate) fn incidents() -> Vec<Incident> {
    let seeds = [
        IncidentSeed {
            id: "inc-001",
            title: "Network Connectivity Issue",
            description: "Primary router experiencing intermittent connectivity problems",
            severity: Severity::High,
            status: IncidentStatus::Open,
            category: Category::NetworkPerformance,
            site: "site-001",
            device: "dev-001",
            detected_at: at(2024, 1, 15, 10, 30),
            resolved_at: None,
            insight: Some("Packet loss on the WAN uplink correlates with CPU spikes on the router"),
        },
        IncidentSeed {
            id: "inc-002",
            title: "Server Performance Degradation",
            description: "Application server response times increased by 300%",
            severity: Severity::Medium,
            status: IncidentStatus::Investigating,
            category: Category::ServicePerformance,
            site: "site-002",
            device: "dev-005",
            detected_at: at(2024, 1, 15, 9, 15),
            resolved_at: None,
            insight: Some("Database server memory usage at 95%"),
        },
        IncidentSeed {
            id: "inc-003",
            title: "Security Alert - Unauthorized Access",
            description: "Multiple failed login attempts detected from unknown IP",
            severity: Severity::Critical,
            status: IncidentStatus::Resolved,
            category: Category::Operational,
            site: "site-001",
            device: "dev-003",
            detected_at: at(2024, 1, 14, 16, 20),
            resolved_at: Some(at(2024, 1, 15, 8, 30)),
            insight: None,
        },
        IncidentSeed {
            id: "inc-004",
            title: "Backup System Failure",
            description: "Automated backup process failed for the third consecutive time",
            severity: Severity::Medium,
            status: IncidentStatus::Open,
            category: Category::Operational,
            site: "site-003",
            device: "dev-008",
            detected_at: at(2024, 1, 15, 2, 0),
            resolved_at: None,
            insight: None,
        },
        IncidentSeed {
            id: "inc-005",
            title: "DNS Resolution Issues",
            description: "Internal DNS server not responding to queries",
            severity: Severity::High,
            status: IncidentStatus::Investigating,
            category: Category::NetworkPerformance,
            site: "site-002",
            device: "dev-006",
            detected_at: at(2024, 1, 15, 7, 45),
            resolved_at: None,
            insight: None,
        },
    ];

    seeds
        .into_iter()
        .map(|seed| Incident {
            id: EntityId::from(seed.id),
            title: seed.title.into(),
            description: seed.description.into(),
            severity: seed.severity,
            status: seed.status,
            category: Some(seed.category),
            site_id: Some(EntityId::from(seed.site)),
            device_id: Some(EntityId::from(seed.device)),
            site_name: DisplayName::Unresolved,
            device_name: DisplayName::Unresolved,
            detected_at: seed.detected_at,
            resolved_at: seed.resolved_at,
            insight: seed.insight.map(str::to_owned),
            reviewed: false,
            reviewed_at: None,
        })
        .collect()
}

pub(crate) fn sites() -> Vec<Site> {
    [
        ("site-001", "Headquarters", "New York, NY", SiteStatus::Online, 45, at(2024, 1, 10, 14, 0)),
        ("site-002", "West Coast Office", "San Francisco, CA", SiteStatus::Online, 32, at(2024, 1, 8, 10, 0)),
        ("site-003", "European Branch", "London, UK", SiteStatus::Maintenance, 28, at(2024, 1, 15, 9, 0)),
        ("site-004", "Asia Pacific Hub", "Singapore", SiteStatus::Online, 38, at(2024, 1, 12, 16, 0)),
    ]
    .into_iter()
    .map(|(id, name, location, status, device_count, last_updated)| Site {
        id: EntityId::from(id),
        name: name.into(),
        location: location.into(),
        status,
        device_count,
        last_updated: Some(last_updated),
    })
    .collect()
}

pub(crate) fn devices() -> Vec<Device> {
    let last_seen = at(2024, 1, 15, 14, 30);
    [
        ("dev-001", "Core Router - HQ", "router", "site-001", DeviceStatus::Online, "192.168.1.1"),
        ("dev-002", "Access Switch - Floor 1", "switch", "site-001", DeviceStatus::Online, "192.168.1.10"),
        ("dev-003", "Firewall - HQ", "firewall", "site-001", DeviceStatus::Online, "192.168.1.254"),
        ("dev-004", "Application Server", "server", "site-001", DeviceStatus::Online, "192.168.1.100"),
        ("dev-005", "Database Server", "server", "site-002", DeviceStatus::Degraded, "192.168.2.50"),
    ]
    .into_iter()
    .map(|(id, name, kind, site, status, ip)| Device {
        id: EntityId::from(id),
        name: name.into(),
        device_type: kind.into(),
        site_id: Some(EntityId::from(site)),
        status,
        ip_address: ip.parse().ok(),
        last_seen: Some(last_seen),
    })
    .collect()
}

/// Critical alerts go everywhere, high ones to push only, the rest are off.
pub(crate) fn preferences() -> Vec<NotificationPreference> {
    PREFERENCE_CATEGORIES
        .iter()
        .flat_map(|category| Severity::ALL.iter().map(move |severity| (*category, *severity)))
        .map(|(category, severity)| {
            let (enabled, push, email) = match severity {
                Severity::Critical => (true, true, true),
                Severity::High => (true, true, false),
                Severity::Medium | Severity::Low => (false, false, false),
            };
            NotificationPreference {
                id: EntityId::from(format!("pref-{category}-{severity}")),
                user_id: DEMO_USER_ID.into(),
                category,
                severity,
                enabled,
                push,
                email,
                quiet_hours_start: None,
                quiet_hours_end: None,
            }
        })
        .collect()
}
