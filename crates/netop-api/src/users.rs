// Current-user endpoints
//
// Notification preferences and app settings are scoped to the bearer of the
// token (`/users/me/...`). Both are replaced wholesale with `PUT`.

use secrecy::SecretString;
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{ApiAppSettings, ApiNotificationPreference};

impl ApiClient {
    /// `GET /users/me/notification-preferences`
    pub async fn get_notification_preferences(
        &self,
        token: Option<&SecretString>,
    ) -> Result<Vec<ApiNotificationPreference>, Error> {
        debug!("fetching notification preferences");
        Ok(self
            .get(&["users", "me", "notification-preferences"], token, &[])
            .await?
            .unwrap_or_default())
    }

    /// `PUT /users/me/notification-preferences`
    ///
    /// Returns the stored list, or `None` when the server answers 204.
    pub async fn update_notification_preferences(
        &self,
        token: Option<&SecretString>,
        preferences: &[ApiNotificationPreference],
    ) -> Result<Option<Vec<ApiNotificationPreference>>, Error> {
        debug!(count = preferences.len(), "replacing notification preferences");
        self.put(&["users", "me", "notification-preferences"], token, preferences)
            .await
    }

    /// `GET /users/me/app-settings`
    ///
    /// A 204 means the user never saved settings; defaults apply.
    pub async fn get_app_settings(
        &self,
        token: Option<&SecretString>,
    ) -> Result<ApiAppSettings, Error> {
        Ok(self
            .get(&["users", "me", "app-settings"], token, &[])
            .await?
            .unwrap_or_default())
    }

    /// `PUT /users/me/app-settings`
    pub async fn update_app_settings(
        &self,
        token: Option<&SecretString>,
        settings: &ApiAppSettings,
    ) -> Result<ApiAppSettings, Error> {
        debug!(?settings, "saving app settings");
        Ok(self
            .put(&["users", "me", "app-settings"], token, settings)
            .await?
            .unwrap_or_else(|| settings.clone()))
    }
}
