// Incident endpoints
//
// `GET /incidents`, `GET /incidents/{id}`, `PUT /incidents/{id}` and the
// dedicated review action `POST /incidents/{id}/review`.

use secrecy::SecretString;
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{ApiIncident, IncidentUpdate};

impl ApiClient {
    /// List incidents, passing filter criteria as query parameters
    /// (e.g. `?status=open&severity=critical`).
    pub async fn list_incidents(
        &self,
        token: Option<&SecretString>,
        query: &[(&str, String)],
    ) -> Result<Vec<ApiIncident>, Error> {
        debug!(params = query.len(), "listing incidents");
        Ok(self
            .get::<Vec<ApiIncident>>(&["incidents"], token, query)
            .await?
            .unwrap_or_default())
    }

    /// Fetch a single incident. `None` when the server answers 204.
    pub async fn get_incident(
        &self,
        token: Option<&SecretString>,
        id: &str,
    ) -> Result<Option<ApiIncident>, Error> {
        self.get(&["incidents", id], token, &[]).await
    }

    /// Apply a partial update. `None` when the server answers 204.
    pub async fn update_incident(
        &self,
        token: Option<&SecretString>,
        id: &str,
        update: &IncidentUpdate,
    ) -> Result<Option<ApiIncident>, Error> {
        debug!(id, ?update, "updating incident");
        self.put(&["incidents", id], token, update).await
    }

    /// Mark an incident as reviewed by the current user.
    pub async fn mark_incident_reviewed(
        &self,
        token: Option<&SecretString>,
        id: &str,
    ) -> Result<Option<ApiIncident>, Error> {
        debug!(id, "marking incident reviewed");
        self.post(&["incidents", id, "review"], token, None::<&()>)
            .await
    }
}
