use std::sync::Arc;

use chaban_sync::{
    models::AuthConfig,
    services::{AuthorizedUser, AuthorizedUserToken, TokenProvider},
    storage::{BlobStore, LocalStorage},
};
use chrono::{Duration, Utc};
use reqwest::Client;
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_string_contains, method, path},
};

async fn token_file(storage: &LocalStorage, server: &MockServer, expiry: chrono::DateTime<Utc>) {
    let user = json!({
        "token": "stale",
        "refresh_token": "refresh-me",
        "token_uri": format!("{}/token", server.uri()),
        "client_id": "client",
        "client_secret": "secret",
        "scopes": ["https://www.googleapis.com/auth/calendar"],
        "expiry": expiry.to_rfc3339(),
    });
    storage
        .write_bytes(".env/token.json", &serde_json::to_vec(&user).unwrap())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_expired_token_is_refreshed_and_saved() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let storage = LocalStorage::new(dir.path());
    token_file(&storage, &server, Utc::now() - Duration::hours(1)).await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=refresh-me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "fresh",
            "expires_in": 3600,
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = AuthorizedUserToken::new(
        Arc::new(storage.clone()),
        &AuthConfig::default(),
        Client::new(),
    );

    assert_eq!(provider.access_token().await.unwrap(), "fresh");
    // Second call is served from the cache.
    assert_eq!(provider.access_token().await.unwrap(), "fresh");

    let saved = storage
        .read_bytes_optional(".env/token.json")
        .await
        .unwrap()
        .unwrap();
    let saved: AuthorizedUser = serde_json::from_slice(&saved).unwrap();
    assert_eq!(saved.token.as_deref(), Some("fresh"));
    assert!(saved.extra.contains_key("scopes"));
}

#[tokio::test]
async fn test_valid_token_is_used_without_refresh() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let storage = LocalStorage::new(dir.path());
    token_file(&storage, &server, Utc::now() + Duration::hours(1)).await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let provider =
        AuthorizedUserToken::new(Arc::new(storage), &AuthConfig::default(), Client::new());
    assert_eq!(provider.access_token().await.unwrap(), "stale");
}

#[tokio::test]
async fn test_refresh_error_is_reported() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let storage = LocalStorage::new(dir.path());
    token_file(&storage, &server, Utc::now() - Duration::hours(1)).await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant"
        })))
        .mount(&server)
        .await;

    let provider =
        AuthorizedUserToken::new(Arc::new(storage), &AuthConfig::default(), Client::new());
    let err = provider.access_token().await.unwrap_err();
    assert!(err.to_string().contains("invalid_grant"));
}

#[tokio::test]
async fn test_missing_token_file_is_an_auth_error() {
    let dir = tempfile::tempdir().unwrap();
    let provider = AuthorizedUserToken::new(
        Arc::new(LocalStorage::new(dir.path())),
        &AuthConfig::default(),
        Client::new(),
    );
    assert!(provider.access_token().await.is_err());
}
