#![allow(clippy::unwrap_used)]
// Integration tests for the remote backend behind `DataSource`, using wiremock.

use std::sync::Arc;

use futures_util::future::BoxFuture;
use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use netop_api::{ApiClient, TransportConfig};
use netop_core::{
    Backend, Category, Channel, CoreError, DataSource, EntityId, IncidentFilter, IncidentPatch,
    IncidentStatus, PreferenceManager, PreferencePatch, RemoteStore, Severity, TokenSource,
};

// ── Helpers ─────────────────────────────────────────────────────────

struct StaticToken;

impl TokenSource for StaticToken {
    fn access_token(&self) -> BoxFuture<'_, Result<SecretString, CoreError>> {
        Box::pin(async { Ok(SecretString::from("remote-token".to_owned())) })
    }
}

struct NoToken;

impl TokenSource for NoToken {
    fn access_token(&self) -> BoxFuture<'_, Result<SecretString, CoreError>> {
        Box::pin(async {
            Err(CoreError::Auth {
                message: "login required".into(),
            })
        })
    }
}

fn data_source(server: &MockServer, tokens: Arc<dyn TokenSource>) -> DataSource {
    let base_url = Url::parse(&format!("{}/v1", server.uri())).unwrap();
    let api = ApiClient::new(base_url, &TransportConfig::default()).unwrap();
    DataSource::new(Backend::Remote(RemoteStore::new(api, tokens)))
}

async fn setup() -> (MockServer, DataSource) {
    let server = MockServer::start().await;
    let data = data_source(&server, Arc::new(StaticToken));
    (server, data)
}

async fn mount_sites_and_devices(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/sites"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "name": "Headquarters", "location": "New York, NY", "status": "operational"}
        ])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "name": "Core Router - HQ", "type": "router", "site_id": 1, "status": "online"}
        ])))
        .mount(server)
        .await;
}

fn incident_json(status: &str) -> serde_json::Value {
    json!({
        "id": 7,
        "title": "Network Connectivity Issue",
        "severity": "high",
        "status": status,
        "site_id": 1,
        "device_id": 42,
        "detected_at": "2024-01-15T10:30:00Z"
    })
}

// ── Incidents ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_incidents_are_joined_and_authorized() {
    let (server, data) = setup().await;
    mount_sites_and_devices(&server).await;
    Mock::given(method("GET"))
        .and(path("/v1/incidents"))
        .and(header("authorization", "Bearer remote-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([incident_json("open")])))
        .expect(1)
        .mount(&server)
        .await;

    let incidents = data.incidents(&IncidentFilter::default()).await.unwrap();

    assert_eq!(incidents.len(), 1);
    assert_eq!(incidents[0].site_label(), "Headquarters");
    assert_eq!(incidents[0].device_label(), "Unknown Device");
    assert_eq!(incidents[0].severity, Severity::High);
}

#[tokio::test]
async fn test_get_with_no_content_is_not_found() {
    let (server, data) = setup().await;
    Mock::given(method("GET"))
        .and(path("/v1/incidents/99"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let err = data.incident(&EntityId::from("99")).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_update_no_content_rereads_record() {
    let (server, data) = setup().await;
    mount_sites_and_devices(&server).await;
    Mock::given(method("PUT"))
        .and(path("/v1/incidents/7"))
        .and(body_partial_json(json!({"status": "resolved"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/incidents/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(incident_json("resolved")))
        .mount(&server)
        .await;

    let updated = data
        .update_incident(&EntityId::from("7"), &IncidentPatch::status(IncidentStatus::Resolved))
        .await
        .unwrap();
    assert_eq!(updated.status, IncidentStatus::Resolved);
    assert_eq!(updated.site_label(), "Headquarters");
}

#[tokio::test]
async fn test_mark_reviewed_posts_review() {
    let (server, data) = setup().await;
    mount_sites_and_devices(&server).await;
    let mut reviewed = incident_json("investigating");
    reviewed["reviewed"] = json!(true);
    Mock::given(method("POST"))
        .and(path("/v1/incidents/7/review"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reviewed))
        .expect(1)
        .mount(&server)
        .await;

    let incident = data.mark_reviewed(&EntityId::from("7")).await.unwrap();
    assert!(incident.reviewed);
}

#[tokio::test]
async fn test_api_error_message_surfaces() {
    let (server, data) = setup().await;
    Mock::given(method("GET"))
        .and(path("/v1/sites"))
        .respond_with(
            ResponseTemplate::new(503).set_body_json(json!({"message": "maintenance window"})),
        )
        .mount(&server)
        .await;

    match data.sites().await.unwrap_err() {
        CoreError::Api { status, message } => {
            assert_eq!(status, 503);
            assert_eq!(message, "maintenance window");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    let server = MockServer::start().await;
    let data = data_source(&server, Arc::new(StaticToken));
    drop(server);

    match data.sites().await.unwrap_err() {
        CoreError::Network { url, .. } => assert!(url.contains("/v1/sites"), "url: {url}"),
        other => panic!("expected a network error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_token_fails_without_request() {
    let server = MockServer::start().await;
    let data = data_source(&server, Arc::new(NoToken));
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let err = data.sites().await.unwrap_err();
    assert!(matches!(err, CoreError::Auth { .. }));
}

// ── Preferences ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_preference_update_puts_full_list() {
    let (server, data) = setup().await;
    let rows = json!([
        {"id": 1, "category": "operational", "severity": "critical",
         "enabled": true, "push_notifications": true, "email_notifications": false},
        {"id": 2, "category": "operational", "severity": "low",
         "enabled": false, "push_notifications": false, "email_notifications": false}
    ]);
    Mock::given(method("GET"))
        .and(path("/v1/users/me/notification-preferences"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rows))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/v1/users/me/notification-preferences"))
        .and(body_partial_json(json!([
            {"category": "operational", "severity": "critical", "email_notifications": true},
            {"category": "operational", "severity": "low", "enabled": false}
        ])))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let updated = data
        .update_preference(&EntityId::from("1"), &PreferencePatch::channel(Channel::Email, true))
        .await
        .unwrap();
    assert!(updated.email);
    assert!(updated.push);
}

#[tokio::test]
async fn test_preference_update_unknown_id_is_not_found() {
    let (server, data) = setup().await;
    Mock::given(method("GET"))
        .and(path("/v1/users/me/notification-preferences"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let err = data
        .update_preference(&EntityId::from("9"), &PreferencePatch::enabled(true))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

// ── Preference manager (remote) ─────────────────────────────────────

/// Rows as `/users/me` returns them: no `user_id`, two disabled critical rows.
fn user_rows() -> serde_json::Value {
    json!([
        {"id": 1, "category": "operational", "severity": "critical",
         "enabled": false, "push_notifications": false, "email_notifications": false},
        {"id": 2, "category": "network_performance", "severity": "critical",
         "enabled": false, "push_notifications": true, "email_notifications": false},
        {"id": 3, "category": "operational", "severity": "low",
         "enabled": false, "push_notifications": false, "email_notifications": false}
    ])
}

async fn remote_manager(server: &MockServer) -> PreferenceManager {
    Mock::given(method("GET"))
        .and(path("/v1/users/me/notification-preferences"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_rows()))
        .mount(server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/v1/users/me/notification-preferences"))
        .respond_with(ResponseTemplate::new(204))
        .mount(server)
        .await;
    let data = Arc::new(data_source(server, Arc::new(StaticToken)));
    PreferenceManager::new(data, "auth0|42")
}

async fn put_bodies(server: &MockServer) -> Vec<serde_json::Value> {
    server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.method == wiremock::http::Method::PUT)
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect()
}

#[tokio::test]
async fn test_bulk_enable_critical_sends_one_complete_list() {
    let server = MockServer::start().await;
    let prefs = remote_manager(&server).await;

    let updated = prefs.bulk_enable_critical().await.unwrap();
    assert_eq!(updated.len(), 2);
    assert!(updated.iter().all(|p| p.enabled && p.push && p.email));

    let puts = put_bodies(&server).await;
    assert_eq!(puts.len(), 1, "expected a single list replacement");
    let enabled: Vec<bool> = puts[0]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["enabled"].as_bool().unwrap())
        .collect();
    assert_eq!(enabled, vec![true, true, false]);
    assert_eq!(puts[0][1]["email_notifications"], true);
}

#[tokio::test]
async fn test_set_enabled_finds_rows_without_user_id() {
    let server = MockServer::start().await;
    let prefs = remote_manager(&server).await;

    let pref = prefs
        .set_enabled(Category::Operational, Severity::Low, true)
        .await
        .unwrap();
    assert_eq!(pref.id, EntityId::from("3"));
    assert!(pref.enabled);

    let puts = put_bodies(&server).await;
    assert_eq!(puts.len(), 1);
    assert_eq!(puts[0][2]["enabled"], true);
    assert_eq!(puts[0][0]["enabled"], false);
}

#[tokio::test]
async fn test_remote_summary_counts_user_rows() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/users/me/notification-preferences"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "user_id": "17", "category": "operational", "severity": "critical",
             "enabled": true, "push_notifications": true, "email_notifications": true},
            {"id": 2, "category": "operational", "severity": "high",
             "enabled": true, "push_notifications": true, "email_notifications": false}
        ])))
        .mount(&server)
        .await;
    let data = Arc::new(data_source(&server, Arc::new(StaticToken)));
    let prefs = PreferenceManager::new(data, "auth0|42");

    let summary = prefs.summary().await.unwrap();
    assert_eq!((summary.active, summary.push, summary.email), (2, 2, 1));
    assert!(prefs.severity_enabled(Severity::High).await.unwrap());
}
