// src/lambda/mod.rs

//! AWS Lambda handler for the calendar sync.
//!
//! Each invocation:
//! 1. Loads `config.toml` and the token file from S3
//! 2. Fetches the current closure records
//! 3. Replaces the calendar contents with the transformed events

use std::sync::Arc;

use lambda_runtime::{Error as LambdaError, LambdaEvent};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::config::{CONFIG_KEY, load_effective};
use crate::error::Result;
use crate::pipeline::{SyncReport, run_sync};
use crate::services::{DryRunCalendar, GoogleCalendar, OpenDataClient, token_provider};
use crate::storage::BlobStore;
use crate::storage::s3::S3Storage;
use crate::utils::http;

/// Lambda invocation payload.
#[derive(Debug, Default, Deserialize)]
pub struct SyncRequest {
    /// Log the events instead of touching the calendar
    #[serde(default)]
    pub dry_run: bool,
}

/// Lambda response payload.
#[derive(Debug, Default, Serialize)]
pub struct SyncResponse {
    /// Whether the sync was successful
    pub success: bool,

    /// Number of records fetched from the feed
    pub records: usize,

    /// Number of events deleted from the calendar
    pub deleted: usize,

    /// Number of events published
    pub published: usize,

    /// Error message if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Execution time in milliseconds
    pub execution_time_ms: u64,
}

impl From<SyncReport> for SyncResponse {
    fn from(report: SyncReport) -> Self {
        Self {
            success: true,
            records: report.records,
            deleted: report.deleted,
            published: report.published,
            ..Default::default()
        }
    }
}

/// Main Lambda handler function.
#[instrument(skip(event))]
pub async fn handler(
    event: LambdaEvent<SyncRequest>,
) -> std::result::Result<SyncResponse, LambdaError> {
    let start = std::time::Instant::now();
    let (request, _context) = event.into_parts();

    info!("Starting sync: dry_run={}", request.dry_run);

    match run(&request).await {
        Ok(report) => {
            let mut response = SyncResponse::from(report);
            response.execution_time_ms = start.elapsed().as_millis() as u64;
            info!(
                "Sync completed: {} records, {} deleted, {} published in {}ms",
                response.records, response.deleted, response.published, response.execution_time_ms
            );
            Ok(response)
        }
        Err(e) => {
            error!("Sync failed: {}", e);
            Ok(SyncResponse {
                success: false,
                error: Some(e.to_string()),
                execution_time_ms: start.elapsed().as_millis() as u64,
                ..Default::default()
            })
        }
    }
}

async fn run(request: &SyncRequest) -> Result<SyncReport> {
    let storage: Arc<dyn BlobStore> = Arc::new(S3Storage::from_env().await?);
    let config = load_effective(storage.as_ref(), CONFIG_KEY).await?;

    let client = http::create_client(&config.http)?;
    let source = OpenDataClient::new(client.clone(), config.feed.clone());

    if request.dry_run {
        let calendar = DryRunCalendar::new();
        return run_sync(&config, &source, &calendar).await;
    }

    let tokens = token_provider(Arc::clone(&storage), &config.auth, client.clone());
    let calendar = GoogleCalendar::new(client, &config.calendar, tokens)?;
    let report = run_sync(&config, &source, &calendar).await?;

    if !report.in_transit.is_empty() {
        info!("Vessels still in transit: {}", report.in_transit.join(", "));
    }
    Ok(report)
}
