#![allow(clippy::unwrap_used)]
// Integration tests for `ApiClient` and `IdentityClient` using wiremock.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use netop_api::models::{ApiAppSettings, ApiNotificationPreference, IncidentUpdate, WireId};
use netop_api::{ApiClient, Error, IdentityClient, IdentityConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&format!("{}/v1", server.uri())).unwrap();
    let client = ApiClient::with_client(reqwest::Client::new(), base_url);
    (server, client)
}

fn token() -> SecretString {
    SecretString::from("test-token".to_owned())
}

// ── Incidents ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_incidents_sends_bearer_and_filters() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/incidents"))
        .and(header("authorization", "Bearer test-token"))
        .and(query_param("status", "open"))
        .and(query_param("severity", "critical"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 1,
            "title": "Network Connectivity Issue",
            "severity": "critical",
            "status": "open",
            "site_id": 1,
            "device_id": 1
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let query = [
        ("status", "open".to_owned()),
        ("severity", "critical".to_owned()),
    ];
    let incidents = client.list_incidents(Some(&token()), &query).await.unwrap();

    assert_eq!(incidents.len(), 1);
    assert_eq!(incidents[0].id, WireId::Number(1));
    assert_eq!(incidents[0].site_id, Some(WireId::Number(1)));
}

#[tokio::test]
async fn test_no_content_is_empty() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/incidents"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/incidents/9"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    assert!(client.list_incidents(None, &[]).await.unwrap().is_empty());
    assert!(client.get_incident(None, "9").await.unwrap().is_none());
}

#[tokio::test]
async fn test_id_stays_one_path_segment() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/incidents/7%2Freview%3Fall=1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    assert!(
        client
            .get_incident(None, "7/review?all=1")
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_update_incident_puts_partial_body() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/v1/incidents/3"))
        .and(body_json(json!({"status": "resolved"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 3,
            "title": "Firewall Rule Conflict",
            "status": "resolved"
        })))
        .mount(&server)
        .await;

    let update = IncidentUpdate {
        status: Some("resolved".into()),
        ..IncidentUpdate::default()
    };
    let updated = client
        .update_incident(Some(&token()), "3", &update)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.status.as_deref(), Some("resolved"));
}

#[tokio::test]
async fn test_error_message_is_surfaced() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/v1/incidents/3"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({"message": "invalid transition"})),
        )
        .mount(&server)
        .await;

    let result = client
        .update_incident(None, "3", &IncidentUpdate::default())
        .await;
    match result {
        Err(Error::Api { status, message }) => {
            assert_eq!(status, 422);
            assert_eq!(message, "invalid transition");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_error_without_body_uses_reason() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/sites"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = client.list_sites(None).await;
    match result {
        Err(Error::Api { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "Internal Server Error");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_status_classification() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/devices/404"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/devices"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "jwt expired"})))
        .mount(&server)
        .await;

    let missing = client.get_device(None, "404").await;
    assert!(
        matches!(missing, Err(Error::NotFound { .. })),
        "expected NotFound, got: {missing:?}"
    );

    let expired = client.list_devices(None).await.unwrap_err();
    assert!(expired.is_auth_expired());
    assert_eq!(expired.to_string(), "Authentication failed: jwt expired");
}

#[tokio::test]
async fn test_malformed_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/sites/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let result = client.get_site(None, "1").await;
    assert!(matches!(result, Err(Error::Deserialization { .. })));
}

// ── User-scoped resources ───────────────────────────────────────────

#[tokio::test]
async fn test_preferences_replaced_wholesale() {
    let (server, client) = setup().await;

    let pref = ApiNotificationPreference {
        id: WireId::from("p1"),
        user_id: Some("u1".into()),
        category: "operational".into(),
        severity: "critical".into(),
        enabled: true,
        push_notifications: true,
        email_notifications: true,
        quiet_hours_start: None,
        quiet_hours_end: None,
    };

    Mock::given(method("PUT"))
        .and(path("/v1/users/me/notification-preferences"))
        .and(body_partial_json(json!([{"id": "p1", "severity": "critical"}])))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let stored = client
        .update_notification_preferences(Some(&token()), std::slice::from_ref(&pref))
        .await
        .unwrap();
    assert!(stored.is_none());
}

#[tokio::test]
async fn test_app_settings_default_on_no_content() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/users/me/app-settings"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let settings = client.get_app_settings(None).await.unwrap();
    assert_eq!(settings, ApiAppSettings::default());
    assert!(settings.auto_refresh);
}

// ── Identity provider ───────────────────────────────────────────────

async fn identity_setup() -> (MockServer, IdentityClient) {
    let server = MockServer::start().await;
    let issuer = Url::parse(&format!("{}/", server.uri())).unwrap();
    let config = IdentityConfig::new(
        "unused.example",
        "cli-client",
        "https://api.netop.cloud",
        Url::parse("http://localhost:8765/callback").unwrap(),
    );
    let client = IdentityClient::with_issuer(reqwest::Client::new(), issuer, config);
    (server, client)
}

#[tokio::test]
async fn test_refresh_token_grant() {
    let (server, client) = identity_setup().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_partial_json(json!({
            "grant_type": "refresh_token",
            "client_id": "cli-client",
            "refresh_token": "r-1"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "a-2",
            "refresh_token": "r-2",
            "expires_in": 3600,
            "token_type": "Bearer"
        })))
        .mount(&server)
        .await;

    let tokens = client
        .refresh(&SecretString::from("r-1".to_owned()))
        .await
        .unwrap();
    assert_eq!(tokens.access_token.expose_secret(), "a-2");
    assert_eq!(
        tokens.refresh_token.as_ref().map(|t| t.expose_secret()),
        Some("r-2")
    );
    assert_eq!(tokens.expires_in, 3600);
}

#[tokio::test]
async fn test_code_exchange_rejected() {
    let (server, client) = identity_setup().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid authorization code"
        })))
        .mount(&server)
        .await;

    let result = client.exchange_code("bad").await;
    match result {
        Err(Error::Identity { message }) => assert_eq!(message, "Invalid authorization code"),
        other => panic!("expected Identity error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_user_info_claims() {
    let (server, client) = identity_setup().await;

    Mock::given(method("GET"))
        .and(path("/userinfo"))
        .and(header("authorization", "Bearer a-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sub": "auth0|42",
            "email": "ops@netop.cloud",
            "name": "Ops Lead",
            "https://netop.cloud/roles": ["admin"]
        })))
        .mount(&server)
        .await;

    let info = client
        .user_info(&SecretString::from("a-1".to_owned()))
        .await
        .unwrap();
    assert_eq!(info.sub, "auth0|42");
    assert_eq!(info.email.as_deref(), Some("ops@netop.cloud"));
    assert_eq!(info.roles, vec!["admin".to_owned()]);
}
