// Site and device endpoints (read-only)

use secrecy::SecretString;
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{ApiDevice, ApiSite};

impl ApiClient {
    /// `GET /sites`
    pub async fn list_sites(&self, token: Option<&SecretString>) -> Result<Vec<ApiSite>, Error> {
        debug!("listing sites");
        Ok(self.get(&["sites"], token, &[]).await?.unwrap_or_default())
    }

    /// `GET /sites/{id}`
    pub async fn get_site(
        &self,
        token: Option<&SecretString>,
        id: &str,
    ) -> Result<Option<ApiSite>, Error> {
        self.get(&["sites", id], token, &[]).await
    }

    /// `GET /devices`
    pub async fn list_devices(
        &self,
        token: Option<&SecretString>,
    ) -> Result<Vec<ApiDevice>, Error> {
        debug!("listing devices");
        Ok(self.get(&["devices"], token, &[]).await?.unwrap_or_default())
    }

    /// `GET /devices/{id}`
    pub async fn get_device(
        &self,
        token: Option<&SecretString>,
        id: &str,
    ) -> Result<Option<ApiDevice>, Error> {
        self.get(&["devices", id], token, &[]).await
    }
}
