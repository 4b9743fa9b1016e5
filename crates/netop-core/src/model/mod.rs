// ── Domain model ──
//
// Canonical, strongly typed records. Wire payloads from `netop-api` are
// converted into these in `crate::convert`.

pub mod entity_id;
pub mod incident;
pub mod preference;
pub mod site;
pub mod user;

pub use entity_id::EntityId;
pub use incident::{
    Category, DisplayName, Incident, IncidentPatch, IncidentStatus, Severity, UNKNOWN_DEVICE,
    UNKNOWN_SITE,
};
pub use preference::{
    AppSettings, AppSettingsPatch, Channel, NotificationPreference, PreferencePatch,
    PreferenceQuery,
};
pub use site::{Device, DeviceQuery, DeviceStatus, Site, SiteStatus};
pub use user::{AuthMode, User};
