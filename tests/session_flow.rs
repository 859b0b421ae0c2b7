//! End-to-end session tests
//!
//! Drives a full [`CompanionApp`] against a wiremock backend: splash, login,
//! authenticated requests, token expiry and logout.

use maternal_companion::{
    ApiError, AppConfig, ClientConfig, CompanionApp, MemoryStore, Screen, SessionStore,
    SplashConfig, StorageKey,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(server: &MockServer) -> AppConfig {
    AppConfig {
        client: ClientConfig::new(server.uri()),
        splash: SplashConfig::new(Duration::from_millis(20)),
        ..Default::default()
    }
    .in_memory()
}

fn app_with(server: &MockServer, values: &[(StorageKey, &str)]) -> (CompanionApp, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::with_values(values.iter().copied()));
    let app = CompanionApp::with_store(config(server), store.clone()).unwrap();
    (app, store)
}

async fn mount_login(server: &MockServer, role: &str) {
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "tok1",
            "refreshToken": "r1",
            "user": {"_id": "u1", "name": "Ama", "email": "ama@example.com", "role": role}
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_login_then_requests_carry_token() {
    let server = MockServer::start().await;
    mount_login(&server, "mother").await;

    Mock::given(method("GET"))
        .and(path("/appointments"))
        .and(header("Authorization", "Bearer tok1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "a1"}])))
        .expect(2)
        .mount(&server)
        .await;

    let (app, _) = app_with(&server, &[]);
    app.navigator().reset(Screen::Auth);

    let screen = app.auth().login("ama@example.com", "pw").await.unwrap();
    assert_eq!(screen, Screen::Onboarding);

    let first: serde_json::Value = app.client().get("/appointments").await.unwrap();
    let second: serde_json::Value = app.client().get("/appointments").await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first[0]["id"], "a1");
}

#[tokio::test]
async fn test_splash_advances_to_welcome_then_login() {
    let server = MockServer::start().await;
    mount_login(&server, "chw").await;

    let (app, _) = app_with(&server, &[]);
    assert_eq!(app.navigator().current(), Screen::Splash);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(app.navigator().current(), Screen::Welcome);

    app.navigator().navigate(Screen::Auth).unwrap();
    assert_eq!(app.navigator().back(), Screen::Welcome);
    app.navigator().navigate(Screen::Auth).unwrap();

    let screen = app.auth().login("ama@example.com", "pw").await.unwrap();
    assert_eq!(screen, Screen::ChwDashboard);
    assert_eq!(app.navigator().history(), vec![Screen::Welcome]);
}

#[tokio::test]
async fn test_restored_session_skips_to_dashboard() {
    let server = MockServer::start().await;
    let (app, _) = app_with(
        &server,
        &[
            (StorageKey::AccessToken, "saved"),
            (StorageKey::UserType, "mother"),
            (StorageKey::OnboardingComplete, "true"),
            (StorageKey::User, r#"{"id":"u1","name":"Ama","role":"mother"}"#),
        ],
    );

    assert_eq!(app.auth().user().map(|u| u.name), Some("Ama".to_string()));
    assert_eq!(app.client().auth_header(), Some("Bearer saved".to_string()));

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(app.navigator().current(), Screen::Dashboard);
}

#[tokio::test]
async fn test_expired_session_redirects_to_login() {
    let server = MockServer::start().await;

    Mock::given(path("/kicks"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"error": "revoked"})))
        .expect(1)
        .mount(&server)
        .await;

    let (app, store) = app_with(
        &server,
        &[
            (StorageKey::AccessToken, "stale"),
            (StorageKey::RefreshToken, "r1"),
            (StorageKey::OnboardingComplete, "true"),
            (StorageKey::User, r#"{"id":"u1"}"#),
        ],
    );
    app.navigator().reset(Screen::Dashboard);
    app.navigator().navigate(Screen::KickCounter).unwrap();

    let err = app.client().get::<serde_json::Value>("/kicks").await.unwrap_err();

    match err {
        ApiError::SessionExpired(reason) => assert_eq!(reason.status(), Some(403)),
        other => panic!("expected session expiry, got {other:?}"),
    }
    assert_eq!(app.navigator().current(), Screen::Auth);
    assert!(app.auth().user().is_none());
    assert!(!app.auth().is_authenticated());
    assert_eq!(store.get(StorageKey::RefreshToken).unwrap(), None);
    assert_eq!(store.get(StorageKey::User).unwrap(), None);
    assert!(store.flag(StorageKey::OnboardingComplete).unwrap());
}

#[tokio::test]
async fn test_logout_survives_backend_outage() {
    let server = MockServer::start().await;
    mount_login(&server, "provider").await;

    Mock::given(path("/auth/logout"))
        .and(header("Authorization", "Bearer tok1"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let (app, store) = app_with(&server, &[]);
    app.navigator().reset(Screen::Auth);
    app.auth().login("ama@example.com", "pw").await.unwrap();
    app.auth().complete_provider_onboarding().unwrap();
    assert_eq!(app.navigator().current(), Screen::ProviderDashboard);

    app.auth().logout().await.unwrap();

    assert_eq!(app.navigator().current(), Screen::Auth);
    assert_eq!(store.get(StorageKey::AccessToken).unwrap(), None);
    assert_eq!(store.get(StorageKey::User).unwrap(), None);
    assert!(store.flag(StorageKey::ProviderOnboardingComplete).unwrap());
    assert_eq!(app.navigator().launch_screen(), Screen::Welcome);
}
