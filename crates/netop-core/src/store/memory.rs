// ── In-memory backend ──
//
// Serves the seeded demo dataset. Writes are process-local and visible to
// subsequent reads through the same store.

use std::sync::{Arc, RwLock};

use chrono::Utc;
use tracing::debug;

use super::collection::EntityCollection;
use super::demo;
use crate::error::CoreError;
use crate::filter::IncidentFilter;
use crate::model::{
    AppSettings, AppSettingsPatch, Device, DeviceQuery, EntityId, Incident, IncidentPatch,
    NotificationPreference, PreferencePatch, PreferenceQuery, Site,
};
use crate::source::{Entity, MutableRepository, Repository, SettingsRepository, enrich};

pub struct InMemoryStore {
    incidents: EntityCollection<Incident>,
    sites: EntityCollection<Site>,
    devices: EntityCollection<Device>,
    preferences: EntityCollection<NotificationPreference>,
    settings: RwLock<AppSettings>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::empty()
    }
}

impl InMemoryStore {
    pub fn empty() -> Self {
        Self {
            incidents: EntityCollection::new(),
            sites: EntityCollection::new(),
            devices: EntityCollection::new(),
            preferences: EntityCollection::new(),
            settings: RwLock::new(AppSettings::default()),
        }
    }

    /// The demo dataset.
    pub fn seeded() -> Self {
        let store = Self::with_records(demo::incidents(), demo::sites(), demo::devices());
        for pref in demo::preferences() {
            store.preferences.upsert(pref.id.clone(), pref);
        }
        debug!(
            incidents = store.incidents.len(),
            sites = store.sites.len(),
            devices = store.devices.len(),
            preferences = store.preferences.len(),
            "seeded demo store"
        );
        store
    }

    pub fn with_records(incidents: Vec<Incident>, sites: Vec<Site>, devices: Vec<Device>) -> Self {
        Self {
            incidents: keyed(incidents),
            sites: keyed(sites),
            devices: keyed(devices),
            ..Self::empty()
        }
    }

    /// Add a preference, enforcing one record per (user, category, severity).
    pub fn insert_preference(&self, pref: NotificationPreference) -> Result<(), CoreError> {
        let clash = self.preferences.snapshot().into_iter().any(|existing| {
            existing.id != pref.id
                && existing.user_id == pref.user_id
                && existing.category == pref.category
                && existing.severity == pref.severity
        });
        if clash {
            return Err(CoreError::validation(format!(
                "a {} / {} preference already exists for {}",
                pref.category, pref.severity, pref.user_id
            )));
        }
        self.preferences.upsert(pref.id.clone(), pref);
        Ok(())
    }
}

fn keyed<E: Entity>(records: Vec<E>) -> EntityCollection<E> {
    records
        .into_iter()
        .map(|record| (record.id().clone(), record))
        .collect()
}

fn cloned<T: Clone>(values: Vec<Arc<T>>) -> impl Iterator<Item = T> {
    values.into_iter().map(|v| T::clone(&v))
}

fn lookup<E: Entity>(collection: &EntityCollection<E>, id: &EntityId) -> Result<E, CoreError> {
    collection
        .get(id)
        .map(|v| E::clone(&v))
        .ok_or_else(|| CoreError::not_found(E::KIND, id))
}

// ── Incidents ───────────────────────────────────────────────────────

impl Repository<Incident> for InMemoryStore {
    async fn list(&self, query: &IncidentFilter) -> Result<Vec<Incident>, CoreError> {
        let all: Vec<Incident> = cloned(self.incidents.snapshot()).collect();
        if query.site.is_none() {
            return Ok(all.into_iter().filter(|i| query.matches(i)).collect());
        }
        // Site criteria may name the site; resolve names before matching
        // but hand back the stored records.
        let sites: Vec<Site> = cloned(self.sites.snapshot()).collect();
        let named = enrich(all.clone(), &sites, &[]);
        Ok(all
            .into_iter()
            .zip(named)
            .filter(|(_, resolved)| query.matches(resolved))
            .map(|(stored, _)| stored)
            .collect())
    }

    async fn get(&self, id: &EntityId) -> Result<Incident, CoreError> {
        lookup(&self.incidents, id)
    }
}

impl MutableRepository<Incident> for InMemoryStore {
    async fn update(&self, id: &EntityId, patch: &IncidentPatch) -> Result<Incident, CoreError> {
        let now = Utc::now();
        let updated = self
            .incidents
            .modify(id, |incident| incident.apply_patch(patch, now))
            .ok_or_else(|| CoreError::not_found(Incident::KIND, id))??;
        debug!(%id, ?patch, "demo incident updated");
        Ok(Incident::clone(&updated))
    }
}

// ── Sites / devices ─────────────────────────────────────────────────

impl Repository<Site> for InMemoryStore {
    async fn list(&self, _query: &()) -> Result<Vec<Site>, CoreError> {
        Ok(cloned(self.sites.snapshot()).collect())
    }

    async fn get(&self, id: &EntityId) -> Result<Site, CoreError> {
        lookup(&self.sites, id)
    }
}

impl Repository<Device> for InMemoryStore {
    async fn list(&self, query: &DeviceQuery) -> Result<Vec<Device>, CoreError> {
        Ok(cloned(self.devices.snapshot())
            .filter(|d| query.site_id.as_ref().is_none_or(|s| d.site_id.as_ref() == Some(s)))
            .filter(|d| query.status.is_none_or(|s| d.status == s))
            .collect())
    }

    async fn get(&self, id: &EntityId) -> Result<Device, CoreError> {
        lookup(&self.devices, id)
    }
}

// ── Preferences / settings ──────────────────────────────────────────

impl Repository<NotificationPreference> for InMemoryStore {
    async fn list(&self, query: &PreferenceQuery) -> Result<Vec<NotificationPreference>, CoreError> {
        Ok(cloned(self.preferences.snapshot())
            .filter(|p| query.matches(p))
            .collect())
    }

    async fn get(&self, id: &EntityId) -> Result<NotificationPreference, CoreError> {
        lookup(&self.preferences, id)
    }
}

impl MutableRepository<NotificationPreference> for InMemoryStore {
    async fn update(
        &self,
        id: &EntityId,
        patch: &PreferencePatch,
    ) -> Result<NotificationPreference, CoreError> {
        let updated = self
            .preferences
            .modify(id, |pref| {
                pref.apply_patch(patch);
                Ok::<(), CoreError>(())
            })
            .ok_or_else(|| CoreError::not_found(NotificationPreference::KIND, id))??;
        Ok(NotificationPreference::clone(&updated))
    }
}

impl SettingsRepository for InMemoryStore {
    async fn app_settings(&self) -> Result<AppSettings, CoreError> {
        Ok(self.settings.read().expect("settings lock poisoned").clone())
    }

    async fn update_app_settings(&self, patch: &AppSettingsPatch) -> Result<AppSettings, CoreError> {
        let mut settings = self.settings.write().expect("settings lock poisoned");
        settings.apply_patch(patch);
        Ok(settings.clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{Category, IncidentStatus, Severity};

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let store = InMemoryStore::seeded();
        let err = Repository::<Incident>::get(&store, &EntityId::from("missing-id"))
            .await
            .unwrap_err();
        assert!(
            matches!(err, CoreError::NotFound { ref entity_type, ref identifier }
                if entity_type == "Incident" && identifier == "missing-id")
        );
    }

    #[tokio::test]
    async fn update_unknown_id_is_not_found() {
        let store = InMemoryStore::seeded();
        let err = MutableRepository::<Incident>::update(
            &store,
            &EntityId::from("nope"),
            &IncidentPatch::reviewed(),
        )
        .await
        .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn update_keeps_list_position() {
        let store = InMemoryStore::seeded();
        MutableRepository::<Incident>::update(
            &store,
            &EntityId::from("inc-003"),
            &IncidentPatch::status(IncidentStatus::Closed),
        )
        .await
        .unwrap();
        let all = Repository::<Incident>::list(&store, &IncidentFilter::default())
            .await
            .unwrap();
        let ids: Vec<String> = all.iter().map(|i| i.id.to_string()).collect();
        assert_eq!(ids, vec!["inc-001", "inc-002", "inc-003", "inc-004", "inc-005"]);
        assert_eq!(all[2].status, IncidentStatus::Closed);
    }

    #[tokio::test]
    async fn rejected_transition_is_not_persisted() {
        let store = InMemoryStore::seeded();
        let id = EntityId::from("inc-003");
        let err = MutableRepository::<Incident>::update(
            &store,
            &id,
            &IncidentPatch::status(IncidentStatus::Open),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CoreError::Validation { .. }));
        let stored = Repository::<Incident>::get(&store, &id).await.unwrap();
        assert_eq!(stored.status, IncidentStatus::Resolved);
    }

    #[tokio::test]
    async fn list_honours_site_name_and_id() {
        let store = InMemoryStore::seeded();
        let by_name = IncidentFilter::default().with_site("Headquarters");
        let by_id = IncidentFilter::default().with_site("site-001");
        let a = Repository::<Incident>::list(&store, &by_name).await.unwrap();
        let b = Repository::<Incident>::list(&store, &by_id).await.unwrap();
        assert_eq!(a.len(), 2);
        assert_eq!(a, b);
        assert!(!a[0].site_name.is_resolved());
    }

    #[tokio::test]
    async fn devices_filter_by_site() {
        let store = InMemoryStore::seeded();
        let query = DeviceQuery {
            site_id: Some(EntityId::from("site-002")),
            status: None,
        };
        let devices = Repository::<Device>::list(&store, &query).await.unwrap();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].name, "Database Server");
    }

    #[tokio::test]
    async fn preference_uniqueness_enforced() {
        let store = InMemoryStore::seeded();
        let mut dup = Repository::<NotificationPreference>::list(&store, &PreferenceQuery::default())
            .await
            .unwrap()
            .remove(0);
        dup.id = EntityId::from("pref-dup");
        assert!(store.insert_preference(dup).is_err());
    }

    #[tokio::test]
    async fn preference_query_narrows() {
        let store = InMemoryStore::seeded();
        let query = PreferenceQuery {
            category: Some(Category::Operational),
            severity: Some(Severity::Critical),
        };
        let prefs = Repository::<NotificationPreference>::list(&store, &query)
            .await
            .unwrap();
        assert_eq!(prefs.len(), 1);
        assert!(prefs[0].enabled && prefs[0].email);
    }

    #[tokio::test]
    async fn settings_patch_persists() {
        let store = InMemoryStore::seeded();
        let patch = AppSettingsPatch {
            dark_mode: Some(true),
            ..AppSettingsPatch::default()
        };
        store.update_app_settings(&patch).await.unwrap();
        assert!(store.app_settings().await.unwrap().dark_mode);
    }
}
