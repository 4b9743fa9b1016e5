// ── Data access layer ──
//
// Capability traits implemented by both backends, the `Backend` enum that
// selects one of them once at session start, and the `DataSource` facade
// that joins incidents with the sites and devices they reference.

use std::collections::HashMap;
use std::future::Future;

use futures_util::future::try_join_all;
use tracing::debug;

use crate::error::CoreError;
use crate::filter::IncidentFilter;
use crate::model::{
    AppSettings, AppSettingsPatch, Device, DeviceQuery, DisplayName, EntityId, Incident,
    IncidentPatch, NotificationPreference, PreferencePatch, PreferenceQuery, Site,
};
use crate::store::{InMemoryStore, RemoteStore};

// ── Capability traits ───────────────────────────────────────────────

/// A record type addressable through a [`Repository`].
pub trait Entity: Clone + Send + Sync + 'static {
    /// Human-readable kind, used in `NotFound` errors.
    const KIND: &'static str;
    type Query: Default + Send + Sync;

    fn id(&self) -> &EntityId;
}

/// A record type that accepts partial updates.
pub trait Patchable: Entity {
    type Patch: Send + Sync;
}

pub trait Repository<E: Entity>: Send + Sync {
    fn list(&self, query: &E::Query) -> impl Future<Output = Result<Vec<E>, CoreError>> + Send;

    /// `CoreError::NotFound` when no record has this id.
    fn get(&self, id: &EntityId) -> impl Future<Output = Result<E, CoreError>> + Send;
}

pub trait MutableRepository<E: Patchable>: Repository<E> {
    /// Merge `patch` into the stored record and return the result.
    fn update(
        &self,
        id: &EntityId,
        patch: &E::Patch,
    ) -> impl Future<Output = Result<E, CoreError>> + Send;
}

/// Per-user settings, a singleton rather than a collection.
pub trait SettingsRepository: Send + Sync {
    fn app_settings(&self) -> impl Future<Output = Result<AppSettings, CoreError>> + Send;

    fn update_app_settings(
        &self,
        patch: &AppSettingsPatch,
    ) -> impl Future<Output = Result<AppSettings, CoreError>> + Send;
}

impl Entity for Incident {
    const KIND: &'static str = "Incident";
    type Query = IncidentFilter;

    fn id(&self) -> &EntityId {
        &self.id
    }
}

impl Patchable for Incident {
    type Patch = IncidentPatch;
}

impl Entity for Site {
    const KIND: &'static str = "Site";
    type Query = ();

    fn id(&self) -> &EntityId {
        &self.id
    }
}

impl Entity for Device {
    const KIND: &'static str = "Device";
    type Query = DeviceQuery;

    fn id(&self) -> &EntityId {
        &self.id
    }
}

impl Entity for NotificationPreference {
    const KIND: &'static str = "Notification preference";
    type Query = PreferenceQuery;

    fn id(&self) -> &EntityId {
        &self.id
    }
}

impl Patchable for NotificationPreference {
    type Patch = PreferencePatch;
}

// ── Enrichment ──────────────────────────────────────────────────────

/// Attach site and device display names to incidents.
///
/// A reference that resolves sets the name and one that does not resets it
/// to `Unresolved`, even if the record arrived with a name of its own. A
/// record without a reference keeps whatever name it carried. Running it
/// twice yields the same result.
pub fn enrich(incidents: Vec<Incident>, sites: &[Site], devices: &[Device]) -> Vec<Incident> {
    let site_names: HashMap<&EntityId, &str> =
        sites.iter().map(|s| (&s.id, s.name.as_str())).collect();
    let device_names: HashMap<&EntityId, &str> =
        devices.iter().map(|d| (&d.id, d.name.as_str())).collect();

    incidents
        .into_iter()
        .map(|mut incident| {
            if let Some(id) = &incident.site_id {
                incident.site_name = resolve(&site_names, id);
            }
            if let Some(id) = &incident.device_id {
                incident.device_name = resolve(&device_names, id);
            }
            incident
        })
        .collect()
}

fn resolve(names: &HashMap<&EntityId, &str>, id: &EntityId) -> DisplayName {
    names
        .get(id)
        .map_or(DisplayName::Unresolved, |name| DisplayName::Named((*name).to_owned()))
}

// ── Backend selection ───────────────────────────────────────────────

/// The store serving this session, chosen once from the auth mode.
pub enum Backend {
    Demo(InMemoryStore),
    Remote(RemoteStore),
}

impl Backend {
    pub fn is_demo(&self) -> bool {
        matches!(self, Self::Demo(_))
    }
}

impl<E: Entity> Repository<E> for Backend
where
    InMemoryStore: Repository<E>,
    RemoteStore: Repository<E>,
{
    async fn list(&self, query: &E::Query) -> Result<Vec<E>, CoreError> {
        match self {
            Self::Demo(store) => Repository::<E>::list(store, query).await,
            Self::Remote(store) => Repository::<E>::list(store, query).await,
        }
    }

    async fn get(&self, id: &EntityId) -> Result<E, CoreError> {
        match self {
            Self::Demo(store) => Repository::<E>::get(store, id).await,
            Self::Remote(store) => Repository::<E>::get(store, id).await,
        }
    }
}

impl<E: Patchable> MutableRepository<E> for Backend
where
    InMemoryStore: MutableRepository<E>,
    RemoteStore: MutableRepository<E>,
{
    async fn update(&self, id: &EntityId, patch: &E::Patch) -> Result<E, CoreError> {
        match self {
            Self::Demo(store) => MutableRepository::<E>::update(store, id, patch).await,
            Self::Remote(store) => MutableRepository::<E>::update(store, id, patch).await,
        }
    }
}

impl SettingsRepository for Backend {
    async fn app_settings(&self) -> Result<AppSettings, CoreError> {
        match self {
            Self::Demo(store) => store.app_settings().await,
            Self::Remote(store) => store.app_settings().await,
        }
    }

    async fn update_app_settings(&self, patch: &AppSettingsPatch) -> Result<AppSettings, CoreError> {
        match self {
            Self::Demo(store) => store.update_app_settings(patch).await,
            Self::Remote(store) => store.update_app_settings(patch).await,
        }
    }
}

// ── Facade ──────────────────────────────────────────────────────────

/// Incidents, sites and devices loaded together.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub incidents: Vec<Incident>,
    pub sites: Vec<Site>,
    pub devices: Vec<Device>,
}

/// Uniform read/write access to dashboard data, whichever backend serves it.
pub struct DataSource {
    backend: Backend,
}

impl DataSource {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    pub fn is_demo(&self) -> bool {
        self.backend.is_demo()
    }

    // ── Incidents ────────────────────────────────────────────────────

    /// Incidents matching `criteria`, enriched with site and device names.
    /// The three collections are fetched concurrently.
    pub async fn incidents(&self, criteria: &IncidentFilter) -> Result<Vec<Incident>, CoreError> {
        let all_devices = DeviceQuery::default();
        let (incidents, sites, devices) = tokio::try_join!(
            Repository::<Incident>::list(&self.backend, criteria),
            Repository::<Site>::list(&self.backend, &()),
            Repository::<Device>::list(&self.backend, &all_devices),
        )?;
        debug!(
            incidents = incidents.len(),
            sites = sites.len(),
            devices = devices.len(),
            "joined incident view"
        );
        let mut enriched = enrich(incidents, &sites, &devices);
        enriched.retain(|incident| criteria.matches(incident));
        Ok(enriched)
    }

    pub async fn incident(&self, id: &EntityId) -> Result<Incident, CoreError> {
        let incident = Repository::<Incident>::get(&self.backend, id).await?;
        self.enrich_one(incident).await
    }

    pub async fn update_incident(
        &self,
        id: &EntityId,
        patch: &IncidentPatch,
    ) -> Result<Incident, CoreError> {
        if patch.is_empty() {
            return Err(CoreError::validation("nothing to update"));
        }
        let updated = MutableRepository::<Incident>::update(&self.backend, id, patch).await?;
        self.enrich_one(updated).await
    }

    /// Mark an incident as reviewed by the current user.
    pub async fn mark_reviewed(&self, id: &EntityId) -> Result<Incident, CoreError> {
        let updated = match &self.backend {
            Backend::Demo(store) => {
                MutableRepository::<Incident>::update(store, id, &IncidentPatch::reviewed()).await?
            }
            Backend::Remote(store) => store.mark_reviewed(id).await?,
        };
        self.enrich_one(updated).await
    }

    async fn enrich_one(&self, incident: Incident) -> Result<Incident, CoreError> {
        let all_devices = DeviceQuery::default();
        let (sites, devices) = tokio::try_join!(
            Repository::<Site>::list(&self.backend, &()),
            Repository::<Device>::list(&self.backend, &all_devices),
        )?;
        enrich(vec![incident], &sites, &devices)
            .pop()
            .ok_or_else(|| CoreError::Internal("enrichment dropped a record".into()))
    }

    // ── Sites / devices ──────────────────────────────────────────────

    pub async fn sites(&self) -> Result<Vec<Site>, CoreError> {
        Repository::<Site>::list(&self.backend, &()).await
    }

    pub async fn site(&self, id: &EntityId) -> Result<Site, CoreError> {
        Repository::<Site>::get(&self.backend, id).await
    }

    pub async fn devices(&self, query: &DeviceQuery) -> Result<Vec<Device>, CoreError> {
        Repository::<Device>::list(&self.backend, query).await
    }

    pub async fn device(&self, id: &EntityId) -> Result<Device, CoreError> {
        Repository::<Device>::get(&self.backend, id).await
    }

    // ── Preferences / settings ───────────────────────────────────────

    pub async fn preferences(
        &self,
        query: &PreferenceQuery,
    ) -> Result<Vec<NotificationPreference>, CoreError> {
        Repository::<NotificationPreference>::list(&self.backend, query).await
    }

    pub async fn preference(&self, id: &EntityId) -> Result<NotificationPreference, CoreError> {
        Repository::<NotificationPreference>::get(&self.backend, id).await
    }

    pub async fn update_preference(
        &self,
        id: &EntityId,
        patch: &PreferencePatch,
    ) -> Result<NotificationPreference, CoreError> {
        MutableRepository::<NotificationPreference>::update(&self.backend, id, patch).await
    }

    /// Apply `patch` to every preference in `ids`.
    ///
    /// Demo updates run concurrently; the first failure is returned and
    /// updates that already landed stay applied. The remote backend merges
    /// everything into one list replacement, so it is all or nothing.
    pub async fn update_preferences(
        &self,
        ids: &[EntityId],
        patch: &PreferencePatch,
    ) -> Result<Vec<NotificationPreference>, CoreError> {
        match &self.backend {
            Backend::Demo(store) => {
                try_join_all(ids.iter().map(|id| {
                    MutableRepository::<NotificationPreference>::update(store, id, patch)
                }))
                .await
            }
            Backend::Remote(store) => store.update_preferences(ids, patch).await,
        }
    }

    pub async fn app_settings(&self) -> Result<AppSettings, CoreError> {
        self.backend.app_settings().await
    }

    pub async fn update_app_settings(
        &self,
        patch: &AppSettingsPatch,
    ) -> Result<AppSettings, CoreError> {
        self.backend.update_app_settings(patch).await
    }

    // ── Joint load ───────────────────────────────────────────────────

    /// Everything a dashboard needs, loaded concurrently. Incidents come
    /// back enriched.
    pub async fn snapshot(&self) -> Result<Snapshot, CoreError> {
        let everything = IncidentFilter::default();
        let all_devices = DeviceQuery::default();
        let (incidents, sites, devices) = tokio::try_join!(
            Repository::<Incident>::list(&self.backend, &everything),
            Repository::<Site>::list(&self.backend, &()),
            Repository::<Device>::list(&self.backend, &all_devices),
        )?;
        let incidents = enrich(incidents, &sites, &devices);
        Ok(Snapshot {
            incidents,
            sites,
            devices,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{IncidentStatus, Severity, UNKNOWN_DEVICE, UNKNOWN_SITE};

    fn demo() -> DataSource {
        DataSource::new(Backend::Demo(InMemoryStore::seeded()))
    }

    #[tokio::test]
    async fn joint_load_resolves_existing_sites() {
        let data = demo();
        let incidents = data.incidents(&IncidentFilter::default()).await.unwrap();
        let sites = data.sites().await.unwrap();
        assert_eq!(incidents.len(), 5);
        for incident in &incidents {
            let site_exists = incident
                .site_id
                .as_ref()
                .is_some_and(|id| sites.iter().any(|s| &s.id == id));
            if site_exists {
                assert_ne!(incident.site_label(), UNKNOWN_SITE);
            }
        }
    }

    #[tokio::test]
    async fn dangling_device_reference_is_unresolved() {
        let data = demo();
        let incident = data.incident(&EntityId::from("inc-004")).await.unwrap();
        assert_eq!(incident.site_label(), "European Branch");
        assert_eq!(incident.device_label(), UNKNOWN_DEVICE);
    }

    #[tokio::test]
    async fn enrichment_is_idempotent() {
        let data = demo();
        let snapshot = data.snapshot().await.unwrap();
        let once = snapshot.incidents.clone();
        let twice = enrich(once.clone(), &snapshot.sites, &snapshot.devices);
        assert_eq!(once, twice);
    }

    #[tokio::test]
    async fn dangling_reference_drops_stale_name() {
        let data = demo();
        let snapshot = data.snapshot().await.unwrap();
        let mut incident = data.incident(&EntityId::from("inc-001")).await.unwrap();
        incident.site_id = Some(EntityId::from("site-gone"));
        incident.site_name = DisplayName::Named("Closed Branch".into());
        incident.device_id = None;
        incident.device_name = DisplayName::Named("Legacy Switch".into());

        let enriched = enrich(vec![incident], &snapshot.sites, &snapshot.devices)
            .pop()
            .unwrap();
        assert_eq!(enriched.site_label(), UNKNOWN_SITE);
        assert_eq!(enriched.device_label(), "Legacy Switch");

        let again = enrich(vec![enriched.clone()], &snapshot.sites, &snapshot.devices);
        assert_eq!(again, vec![enriched]);
    }

    #[tokio::test]
    async fn site_name_criterion_applies_after_enrichment() {
        let data = demo();
        let criteria = IncidentFilter::default().with_site("West Coast Office");
        let found = data.incidents(&criteria).await.unwrap();
        let ids: Vec<String> = found.iter().map(|i| i.id.to_string()).collect();
        assert_eq!(ids, vec!["inc-002", "inc-005"]);
    }

    #[tokio::test]
    async fn read_after_write_in_demo_mode() {
        let data = demo();
        let id = EntityId::from("inc-001");
        let patch = IncidentPatch::status(IncidentStatus::Investigating);
        let updated = data.update_incident(&id, &patch).await.unwrap();
        assert_eq!(updated.status, IncidentStatus::Investigating);
        let read = data.incident(&id).await.unwrap();
        assert_eq!(read, updated);
    }

    #[tokio::test]
    async fn missing_incident_is_not_found() {
        let data = demo();
        let err = data
            .incident(&EntityId::from("missing-id"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn empty_patch_rejected() {
        let data = demo();
        let err = data
            .update_incident(&EntityId::from("inc-001"), &IncidentPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation { .. }));
    }

    #[tokio::test]
    async fn mark_reviewed_sets_flag() {
        let data = demo();
        let reviewed = data.mark_reviewed(&EntityId::from("inc-002")).await.unwrap();
        assert!(reviewed.reviewed);
        assert!(reviewed.reviewed_at.is_some());
        assert_eq!(reviewed.site_label(), "West Coast Office");
    }

    #[tokio::test]
    async fn criteria_reach_the_backend() {
        let data = demo();
        let criteria = IncidentFilter::default().with_severity(Severity::Critical);
        let found = data.incidents(&criteria).await.unwrap();
        assert!(found.iter().all(|i| i.severity == Severity::Critical));
        assert!(!found.is_empty());
    }
}
