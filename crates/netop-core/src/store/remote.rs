// ── Remote backend ──
//
// Delegates to the incident API. Every call is authorized with a token from
// the session's `TokenSource`; a token that cannot be produced silently
// fails the call with `CoreError::Auth` rather than falling back to an
// anonymous request.

use std::sync::Arc;

use secrecy::SecretString;
use tracing::debug;

use netop_api::ApiClient;
use netop_api::models::{ApiAppSettings, ApiNotificationPreference, IncidentUpdate};

use crate::auth::TokenSource;
use crate::convert::preference_from_api;
use crate::error::CoreError;
use crate::filter::IncidentFilter;
use crate::model::{
    AppSettings, AppSettingsPatch, Device, DeviceQuery, EntityId, Incident, IncidentPatch,
    NotificationPreference, PreferencePatch, PreferenceQuery, Site,
};
use crate::source::{Entity, MutableRepository, Repository, SettingsRepository};

pub struct RemoteStore {
    api: ApiClient,
    tokens: Arc<dyn TokenSource>,
}

impl RemoteStore {
    pub fn new(api: ApiClient, tokens: Arc<dyn TokenSource>) -> Self {
        Self { api, tokens }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    async fn token(&self) -> Result<SecretString, CoreError> {
        self.tokens.access_token().await
    }

    /// `POST /incidents/{id}/review`; a 204 reply is followed by a re-read.
    pub async fn mark_reviewed(&self, id: &EntityId) -> Result<Incident, CoreError> {
        let token = self.token().await?;
        match self
            .api
            .mark_incident_reviewed(Some(&token), &id.to_string())
            .await?
        {
            Some(raw) => Ok(Incident::from(raw)),
            None => Repository::<Incident>::get(self, id).await,
        }
    }

    async fn raw_preferences(&self, token: &SecretString) -> Result<Vec<ApiNotificationPreference>, CoreError> {
        Ok(self.api.get_notification_preferences(Some(token)).await?)
    }
}

// ── Incidents ───────────────────────────────────────────────────────

impl Repository<Incident> for RemoteStore {
    async fn list(&self, query: &IncidentFilter) -> Result<Vec<Incident>, CoreError> {
        let token = self.token().await?;
        let raw = self
            .api
            .list_incidents(Some(&token), &query.to_query())
            .await?;
        Ok(raw.into_iter().map(Incident::from).collect())
    }

    async fn get(&self, id: &EntityId) -> Result<Incident, CoreError> {
        let token = self.token().await?;
        self.api
            .get_incident(Some(&token), &id.to_string())
            .await?
            .map(Incident::from)
            .ok_or_else(|| CoreError::not_found(Incident::KIND, id))
    }
}

impl MutableRepository<Incident> for RemoteStore {
    async fn update(&self, id: &EntityId, patch: &IncidentPatch) -> Result<Incident, CoreError> {
        let token = self.token().await?;
        let body = IncidentUpdate::from(patch);
        match self
            .api
            .update_incident(Some(&token), &id.to_string(), &body)
            .await?
        {
            Some(raw) => Ok(Incident::from(raw)),
            None => {
                debug!(%id, "update returned no content, re-reading");
                Repository::<Incident>::get(self, id).await
            }
        }
    }
}

// ── Sites / devices ─────────────────────────────────────────────────

impl Repository<Site> for RemoteStore {
    async fn list(&self, _query: &()) -> Result<Vec<Site>, CoreError> {
        let token = self.token().await?;
        let raw = self.api.list_sites(Some(&token)).await?;
        Ok(raw.into_iter().map(Site::from).collect())
    }

    async fn get(&self, id: &EntityId) -> Result<Site, CoreError> {
        let token = self.token().await?;
        self.api
            .get_site(Some(&token), &id.to_string())
            .await?
            .map(Site::from)
            .ok_or_else(|| CoreError::not_found(Site::KIND, id))
    }
}

impl Repository<Device> for RemoteStore {
    async fn list(&self, query: &DeviceQuery) -> Result<Vec<Device>, CoreError> {
        let token = self.token().await?;
        let raw = self.api.list_devices(Some(&token)).await?;
        Ok(raw
            .into_iter()
            .map(Device::from)
            .filter(|d| query.site_id.as_ref().is_none_or(|s| d.site_id.as_ref() == Some(s)))
            .filter(|d| query.status.is_none_or(|s| d.status == s))
            .collect())
    }

    async fn get(&self, id: &EntityId) -> Result<Device, CoreError> {
        let token = self.token().await?;
        self.api
            .get_device(Some(&token), &id.to_string())
            .await?
            .map(Device::from)
            .ok_or_else(|| CoreError::not_found(Device::KIND, id))
    }
}

// ── Preferences / settings ──────────────────────────────────────────

impl Repository<NotificationPreference> for RemoteStore {
    async fn list(&self, query: &PreferenceQuery) -> Result<Vec<NotificationPreference>, CoreError> {
        let token = self.token().await?;
        Ok(self
            .raw_preferences(&token)
            .await?
            .into_iter()
            .filter_map(preference_from_api)
            .filter(|p| query.matches(p))
            .collect())
    }

    async fn get(&self, id: &EntityId) -> Result<NotificationPreference, CoreError> {
        Repository::<NotificationPreference>::list(self, &PreferenceQuery::default())
            .await?
            .into_iter()
            .find(|p| &p.id == id)
            .ok_or_else(|| CoreError::not_found(NotificationPreference::KIND, id))
    }
}

impl MutableRepository<NotificationPreference> for RemoteStore {
    async fn update(
        &self,
        id: &EntityId,
        patch: &PreferencePatch,
    ) -> Result<NotificationPreference, CoreError> {
        self.update_preferences(std::slice::from_ref(id), patch)
            .await?
            .pop()
            .ok_or_else(|| CoreError::Internal(format!("preference {id} vanished from the update")))
    }
}

impl RemoteStore {
    /// Apply `patch` to every preference in `ids` with one list replacement.
    ///
    /// The endpoint replaces the whole list, so the rows are read once, every
    /// patch is merged into that copy, and the result is sent back in a
    /// single `PUT`. Either every row changes or none does. An unknown id
    /// fails before anything is sent.
    pub async fn update_preferences(
        &self,
        ids: &[EntityId],
        patch: &PreferencePatch,
    ) -> Result<Vec<NotificationPreference>, CoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let token = self.token().await?;
        let mut rows = self.raw_preferences(&token).await?;

        let mut merged = Vec::with_capacity(ids.len());
        for id in ids {
            let slot = rows
                .iter_mut()
                .find(|row| &EntityId::from(row.id.clone()) == id)
                .ok_or_else(|| CoreError::not_found(NotificationPreference::KIND, id))?;
            let mut pref = preference_from_api(slot.clone()).ok_or_else(|| {
                CoreError::Internal(format!(
                    "preference {id} has an unrecognised category or severity"
                ))
            })?;
            pref.apply_patch(patch);
            *slot = ApiNotificationPreference::from(&pref);
            merged.push(pref);
        }

        debug!(changed = merged.len(), rows = rows.len(), "replacing notification preferences");
        let Some(stored) = self
            .api
            .update_notification_preferences(Some(&token), &rows)
            .await?
        else {
            return Ok(merged);
        };

        let stored: Vec<NotificationPreference> =
            stored.into_iter().filter_map(preference_from_api).collect();
        Ok(merged
            .into_iter()
            .map(|pref| {
                stored
                    .iter()
                    .find(|p| p.id == pref.id)
                    .cloned()
                    .unwrap_or(pref)
            })
            .collect())
    }
}

impl SettingsRepository for RemoteStore {
    async fn app_settings(&self) -> Result<AppSettings, CoreError> {
        let token = self.token().await?;
        Ok(self.api.get_app_settings(Some(&token)).await?.into())
    }

    async fn update_app_settings(&self, patch: &AppSettingsPatch) -> Result<AppSettings, CoreError> {
        let token = self.token().await?;
        let mut settings = AppSettings::from(self.api.get_app_settings(Some(&token)).await?);
        settings.apply_patch(patch);
        let stored = self
            .api
            .update_app_settings(Some(&token), &ApiAppSettings::from(&settings))
            .await?;
        Ok(stored.into())
    }
}
