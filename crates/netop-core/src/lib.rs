//! Data core for the NetOp incident dashboard.
//!
//! Sits between `netop-api` and UI consumers such as the `netop` CLI:
//!
//! - **[`Session`]**: entry point. [`connect()`](Session::connect) resolves
//!   the auth mode through the [`AuthGate`] and selects the storage backend
//!   exactly once: the seeded [`InMemoryStore`] in demo mode, otherwise the
//!   [`RemoteStore`] over the HTTP API.
//!
//! - **[`DataSource`]**: uniform read/write access to incidents, sites,
//!   devices, notification preferences and app settings. Incident reads are
//!   joined with sites and devices concurrently and enriched with display
//!   names.
//!
//! - **[`filter`]** and **[`aggregate`]**: pure functions deriving filtered
//!   views and counts from loaded records.
//!
//! - **[`PreferenceManager`]**: notification preference operations for the
//!   signed-in user, including the concurrent "enable all critical" action.
//!
//! - **Domain model** ([`model`]): canonical types with lenient conversion
//!   from wire payloads in [`convert`].

pub mod aggregate;
pub mod auth;
pub mod convert;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod model;
pub mod preferences;
pub mod session;
pub mod source;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use aggregate::{Bucket, IncidentField};
pub use auth::{
    AuthGate, AuthState, IdentityProvider, LogoutOutcome, MemorySessionStore, OidcProvider,
    SessionStore, TokenSource,
};
pub use dashboard::Dashboard;
pub use error::CoreError;
pub use filter::{IncidentFilter, StatusFilter};
pub use preferences::{PreferenceManager, PreferenceSummary};
pub use session::{Session, SessionConfig};
pub use source::{Backend, DataSource, Snapshot};
pub use store::{InMemoryStore, RemoteStore};

pub use model::{
    AppSettings, AppSettingsPatch, AuthMode, Category, Channel, Device, DeviceQuery, DeviceStatus,
    DisplayName, EntityId, Incident, IncidentPatch, IncidentStatus, NotificationPreference,
    PreferencePatch, PreferenceQuery, Severity, Site, SiteStatus, User,
};
