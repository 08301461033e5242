// src/config.rs

//! Configuration loading utilities.
//!
//! The CLI reads `config.toml` from disk through [`Config::load_or_default`];
//! the Lambda reads it from blob storage with [`load_from_store`].

use crate::error::{AppError, Result};
use crate::models::Config;
use crate::storage::BlobStore;

/// Default key of the configuration file in blob storage.
pub const CONFIG_KEY: &str = "config.toml";

/// Load configuration from blob storage, or None if the key does not exist.
pub async fn load_from_store(store: &dyn BlobStore, key: &str) -> Result<Option<Config>> {
    log::info!("Loading config file from {}", store.location(key));
    let Some(bytes) = store.read_bytes_optional(key).await? else {
        return Ok(None);
    };

    let content = String::from_utf8(bytes).map_err(|e| {
        AppError::config(format!(
            "Config file {} is not valid UTF-8: {}",
            store.location(key),
            e
        ))
    })?;
    Config::from_toml(&content).map(Some)
}

/// Load configuration from blob storage, falling back to defaults when absent,
/// then apply environment overrides and validate.
pub async fn load_effective(store: &dyn BlobStore, key: &str) -> Result<Config> {
    let mut config = match load_from_store(store, key).await? {
        Some(config) => config,
        None => {
            log::warn!("No config at {}. Using defaults.", store.location(key));
            Config::default()
        }
    };
    config.apply_env_overrides();
    config.validate()?;
    Ok(config)
}
