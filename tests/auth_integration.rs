use std::net::TcpListener;
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use guid_auth::configuration::JwtSettings;
use guid_auth::startup::run;
use guid_auth::store::MemoryStore;
use serde_json::{json, Value};

pub struct TestApp {
    pub address: String,
    pub store: Arc<MemoryStore>,
}

fn test_jwt() -> JwtSettings {
    JwtSettings {
        secret: "integration-test-secret-key-at-least-32-chars".to_string(),
        access_token_expiry: 900,
        refresh_token_expiry: 3600,
    }
}

async fn spawn_app() -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let store = Arc::new(MemoryStore::new());
    store.add_user("u-1");

    let server = run(listener, store.clone(), test_jwt()).expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp { address, store }
}

async fn sign_in(client: &reqwest::Client, app: &TestApp, guid: &str) -> reqwest::Response {
    client
        .post(&format!("{}/auth/sign-in", &app.address))
        .json(&json!({ "guid": guid }))
        .send()
        .await
        .expect("Failed to execute request.")
}

async fn refresh(
    client: &reqwest::Client,
    app: &TestApp,
    access_token: &str,
    refresh_token: &str,
) -> reqwest::Response {
    client
        .post(&format!("{}/auth/refresh", &app.address))
        .json(&json!({
            "access_token": access_token,
            "refresh_token": refresh_token,
        }))
        .send()
        .await
        .expect("Failed to execute request.")
}

#[tokio::test]
async fn health_check_works() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(&format!("{}/health_check", &app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());
}

// --- Sign-in Tests ---

#[tokio::test]
async fn sign_in_returns_200_for_known_guid() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = sign_in(&client, &app, "u-1").await;

    assert_eq!(200, response.status().as_u16());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body.get("access_token").is_some());
    assert!(body.get("refresh_token").is_some());
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], 900);

    // The refresh secret crosses the wire base64-encoded.
    let refresh_token = body["refresh_token"].as_str().unwrap();
    assert!(BASE64.decode(refresh_token).is_ok());

    assert_eq!(app.store.session_count("u-1"), 1);
}

#[tokio::test]
async fn sign_in_returns_404_for_unknown_guid() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = sign_in(&client, &app, "nobody").await;

    assert_eq!(404, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn sign_in_returns_400_for_missing_guid() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(&format!("{}/auth/sign-in", &app.address))
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(400, response.status().as_u16());
}

// --- Refresh Tests ---

#[tokio::test]
async fn refresh_rotates_the_credential_pair() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let issued: Value = sign_in(&client, &app, "u-1")
        .await
        .json()
        .await
        .expect("Failed to parse response");
    let old_access = issued["access_token"].as_str().unwrap();
    let old_refresh = issued["refresh_token"].as_str().unwrap();

    let response = refresh(&client, &app, old_access, old_refresh).await;
    assert_eq!(200, response.status().as_u16());

    let rotated: Value = response.json().await.expect("Failed to parse response");
    assert_ne!(rotated["access_token"].as_str().unwrap(), old_access);
    assert_ne!(rotated["refresh_token"].as_str().unwrap(), old_refresh);

    // Rotation replaces the consumed session, it does not accumulate.
    assert_eq!(app.store.session_count("u-1"), 1);
}

#[tokio::test]
async fn replaying_a_consumed_pair_returns_400() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let issued: Value = sign_in(&client, &app, "u-1")
        .await
        .json()
        .await
        .expect("Failed to parse response");
    let old_access = issued["access_token"].as_str().unwrap();
    let old_refresh = issued["refresh_token"].as_str().unwrap();

    let first = refresh(&client, &app, old_access, old_refresh).await;
    assert_eq!(200, first.status().as_u16());

    let replay = refresh(&client, &app, old_access, old_refresh).await;
    assert_eq!(400, replay.status().as_u16());

    let body: Value = replay.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn tampered_refresh_secret_returns_400() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let issued: Value = sign_in(&client, &app, "u-1")
        .await
        .json()
        .await
        .expect("Failed to parse response");
    let access = issued["access_token"].as_str().unwrap();
    let refresh_token = issued["refresh_token"].as_str().unwrap();

    // Re-encode a flipped byte so the base64 framing stays valid.
    let mut secret = BASE64.decode(refresh_token).expect("Invalid base64");
    secret[0] ^= 0x01;
    let tampered = BASE64.encode(&secret);

    let response = refresh(&client, &app, access, &tampered).await;

    assert_eq!(400, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn undecodable_refresh_secret_returns_400() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let issued: Value = sign_in(&client, &app, "u-1")
        .await
        .json()
        .await
        .expect("Failed to parse response");
    let access = issued["access_token"].as_str().unwrap();

    let response = refresh(&client, &app, access, "!!!not-base64!!!").await;

    assert_eq!(400, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn invalid_access_token_returns_401() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let issued: Value = sign_in(&client, &app, "u-1")
        .await
        .json()
        .await
        .expect("Failed to parse response");
    let refresh_token = issued["refresh_token"].as_str().unwrap();

    let response = refresh(&client, &app, "invalid.token.here", refresh_token).await;

    assert_eq!(401, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], "TOKEN_INVALID");
}

#[tokio::test]
async fn refresh_returns_400_for_missing_fields() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let test_cases = vec![
        (json!({"access_token": "a.b.c"}), "missing refresh_token"),
        (json!({"refresh_token": "abcd"}), "missing access_token"),
        (json!({}), "missing all fields"),
    ];

    for (body, reason) in test_cases {
        let response = client
            .post(&format!("{}/auth/refresh", &app.address))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request.");

        assert_eq!(400, response.status().as_u16(), "Should reject request: {}", reason);
    }
}

// --- End-to-end rotation scenario ---

#[tokio::test]
async fn sign_in_then_two_refreshes_all_succeed() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let first: Value = sign_in(&client, &app, "u-1")
        .await
        .json()
        .await
        .expect("Failed to parse response");

    let second_response = refresh(
        &client,
        &app,
        first["access_token"].as_str().unwrap(),
        first["refresh_token"].as_str().unwrap(),
    )
    .await;
    assert_eq!(200, second_response.status().as_u16());
    let second: Value = second_response.json().await.expect("Failed to parse response");

    let third_response = refresh(
        &client,
        &app,
        second["access_token"].as_str().unwrap(),
        second["refresh_token"].as_str().unwrap(),
    )
    .await;
    assert_eq!(200, third_response.status().as_u16());
    let third: Value = third_response.json().await.expect("Failed to parse response");

    let pairs = [&first, &second, &third];
    for (i, a) in pairs.iter().enumerate() {
        for b in pairs.iter().skip(i + 1) {
            assert_ne!(a["access_token"], b["access_token"]);
            assert_ne!(a["refresh_token"], b["refresh_token"]);
        }
    }

    assert_eq!(app.store.session_count("u-1"), 1);
}
