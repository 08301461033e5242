//! Access tokens for the calendar API.
//!
//! Tokens are obtained out of band. The authorized-user file is the JSON
//! written by Google's client libraries after consent; when the access token in
//! it has expired it is refreshed with the stored refresh token and the file is
//! rewritten.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use crate::error::{AppError, Result};
use crate::models::AuthConfig;
use crate::storage::BlobStore;

/// Environment variable holding a ready-to-use access token.
pub const ACCESS_TOKEN_ENV: &str = "CHABAN_ACCESS_TOKEN";

/// Tokens are refreshed this long before their stated expiry.
const EXPIRY_SKEW_SECS: i64 = 60;

/// Supplies bearer tokens for calendar requests.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String>;
}

/// A fixed token, e.g. from the environment.
#[derive(Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn access_token(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// Authorized-user credentials file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizedUser {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_uri: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub expiry: Option<DateTime<Utc>>,

    /// Fields this crate does not use (scopes, account, ...), kept on rewrite
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AuthorizedUser {
    /// The stored access token if it is still usable at `now`.
    pub fn valid_token(&self, now: DateTime<Utc>) -> Option<&str> {
        let token = self.token.as_deref().filter(|t| !t.is_empty())?;
        match self.expiry {
            Some(expiry) if now > expiry - Duration::seconds(EXPIRY_SKEW_SECS) => None,
            _ => Some(token),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Token provider backed by an authorized-user file in blob storage.
pub struct AuthorizedUserToken {
    store: Arc<dyn BlobStore>,
    key: String,
    default_token_url: String,
    client: Client,
    cached: Mutex<Option<AuthorizedUser>>,
}

impl AuthorizedUserToken {
    pub fn new(store: Arc<dyn BlobStore>, config: &AuthConfig, client: Client) -> Self {
        Self {
            store,
            key: config.token_key.clone(),
            default_token_url: config.token_url.clone(),
            client,
            cached: Mutex::new(None),
        }
    }

    async fn load(&self) -> Result<AuthorizedUser> {
        let bytes = self
            .store
            .read_bytes_optional(&self.key)
            .await?
            .ok_or_else(|| {
                AppError::auth(format!(
                    "no token file at {}; authorize the calendar account first",
                    self.store.location(&self.key)
                ))
            })?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn refresh(&self, mut user: AuthorizedUser) -> Result<AuthorizedUser> {
        let refresh_token = user
            .refresh_token
            .clone()
            .ok_or_else(|| AppError::auth("access token expired and no refresh token is stored"))?;
        let client_id = user.client_id.clone().unwrap_or_default();
        let client_secret = user.client_secret.clone().unwrap_or_default();
        let token_url = user
            .token_uri
            .clone()
            .unwrap_or_else(|| self.default_token_url.clone());

        log::info!("Refreshing calendar access token");
        let params = [
            ("client_id", client_id.as_str()),
            ("client_secret", client_secret.as_str()),
            ("refresh_token", refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];
        let response = self.client.post(&token_url).form(&params).send().await?;
        let status = response.status();
        let body: Value = response.json().await?;

        if !status.is_success() || body.get("error").is_some() {
            let error = body.get("error").cloned().unwrap_or(Value::Null);
            return Err(AppError::auth(format!(
                "token refresh failed ({status}): {error}"
            )));
        }

        let refreshed: RefreshResponse = serde_json::from_value(body)?;
        user.token = Some(refreshed.access_token);
        user.expiry = refreshed
            .expires_in
            .map(|secs| Utc::now() + Duration::seconds(secs));
        if let Some(rotated) = refreshed.refresh_token {
            user.refresh_token = Some(rotated);
        }
        Ok(user)
    }

    async fn persist(&self, user: &AuthorizedUser) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(user)?;
        self.store.write_bytes(&self.key, &bytes).await?;
        log::debug!("Saved refreshed token to {}", self.store.location(&self.key));
        Ok(())
    }
}

#[async_trait]
impl TokenProvider for AuthorizedUserToken {
    async fn access_token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;

        let user = match cached.take() {
            Some(user) => user,
            None => self.load().await?,
        };

        if let Some(token) = user.valid_token(Utc::now()) {
            let token = token.to_string();
            *cached = Some(user);
            return Ok(token);
        }

        let user = self.refresh(user).await?;
        self.persist(&user).await?;
        let token = user
            .token
            .clone()
            .ok_or_else(|| AppError::auth("refresh returned no access token"))?;
        *cached = Some(user);
        Ok(token)
    }
}

/// Pick the token provider: `CHABAN_ACCESS_TOKEN` if set, else the token file.
pub fn token_provider(
    store: Arc<dyn BlobStore>,
    config: &AuthConfig,
    client: Client,
) -> Arc<dyn TokenProvider> {
    match std::env::var(ACCESS_TOKEN_ENV) {
        Ok(token) if !token.trim().is_empty() => {
            log::info!("Using access token from {}", ACCESS_TOKEN_ENV);
            Arc::new(StaticToken::new(token.trim()))
        }
        _ => Arc::new(AuthorizedUserToken::new(store, config, client)),
    }
}
