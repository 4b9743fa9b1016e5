// ── Notification preference manager ──
//
// Higher-level preference operations for one user, all routed through the
// session's DataSource.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::CoreError;
use crate::model::{
    Category, Channel, EntityId, NotificationPreference, PreferencePatch, PreferenceQuery,
    Severity,
};
use crate::source::{DataSource, Entity};

/// Counts over the user's enabled preferences.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PreferenceSummary {
    pub active: usize,
    pub push: usize,
    pub email: usize,
}

pub struct PreferenceManager {
    data: Arc<DataSource>,
    user_id: String,
}

impl PreferenceManager {
    pub fn new(data: Arc<DataSource>, user_id: impl Into<String>) -> Self {
        Self {
            data,
            user_id: user_id.into(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// This user's preferences matching `query`.
    ///
    /// Remote rows come from `/users/me`, which the server already scopes
    /// to the token holder, and may carry a backend user id that differs
    /// from the identity subject. Only the shared demo table is filtered.
    pub async fn list(&self, query: &PreferenceQuery) -> Result<Vec<NotificationPreference>, CoreError> {
        let mut prefs = self.data.preferences(query).await?;
        if self.data.is_demo() {
            prefs.retain(|p| p.user_id == self.user_id);
        }
        Ok(prefs)
    }

    pub async fn set_enabled(
        &self,
        category: Category,
        severity: Severity,
        enabled: bool,
    ) -> Result<NotificationPreference, CoreError> {
        let query = PreferenceQuery {
            category: Some(category),
            severity: Some(severity),
        };
        let pref = self.list(&query).await?.into_iter().next().ok_or_else(|| {
            CoreError::not_found(
                NotificationPreference::KIND,
                format!("{category}/{severity}"),
            )
        })?;
        debug!(%category, %severity, enabled, "toggling preference");
        self.data
            .update_preference(&pref.id, &PreferencePatch::enabled(enabled))
            .await
    }

    pub async fn set_channel(
        &self,
        id: &EntityId,
        channel: Channel,
        enabled: bool,
    ) -> Result<NotificationPreference, CoreError> {
        self.data
            .update_preference(id, &PreferencePatch::channel(channel, enabled))
            .await
    }

    /// Turn on every channel of every critical preference.
    ///
    /// See [`DataSource::update_preferences`] for how failures surface.
    pub async fn bulk_enable_critical(&self) -> Result<Vec<NotificationPreference>, CoreError> {
        let updated = self
            .patch_severity(Severity::Critical, &PreferencePatch::all_on())
            .await?;
        info!(count = updated.len(), "enabled all critical notifications");
        Ok(updated)
    }

    /// Enable or disable every preference of one severity.
    pub async fn set_severity_enabled(
        &self,
        severity: Severity,
        enabled: bool,
    ) -> Result<Vec<NotificationPreference>, CoreError> {
        self.patch_severity(severity, &PreferencePatch::enabled(enabled))
            .await
    }

    async fn patch_severity(
        &self,
        severity: Severity,
        patch: &PreferencePatch,
    ) -> Result<Vec<NotificationPreference>, CoreError> {
        let query = PreferenceQuery {
            category: None,
            severity: Some(severity),
        };
        let ids: Vec<EntityId> = self
            .list(&query)
            .await?
            .into_iter()
            .map(|pref| pref.id)
            .collect();
        self.data.update_preferences(&ids, patch).await
    }

    pub async fn summary(&self) -> Result<PreferenceSummary, CoreError> {
        let prefs = self.list(&PreferenceQuery::default()).await?;
        Ok(summarize(&prefs))
    }

    /// Whether any preference of this severity is enabled.
    pub async fn severity_enabled(&self, severity: Severity) -> Result<bool, CoreError> {
        let query = PreferenceQuery {
            category: None,
            severity: Some(severity),
        };
        Ok(self.list(&query).await?.iter().any(|p| p.enabled))
    }
}

pub fn summarize(prefs: &[NotificationPreference]) -> PreferenceSummary {
    prefs
        .iter()
        .filter(|p| p.enabled)
        .fold(PreferenceSummary::default(), |mut acc, p| {
            acc.active += 1;
            acc.push += usize::from(p.push);
            acc.email += usize::from(p.email);
            acc
        })
}
