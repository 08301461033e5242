// src/pipeline/sync.rs

//! Full-refresh synchronisation of the closure feed into a calendar.
//!
//! Every run deletes everything previously published and republishes the
//! current batch. Two orderings are supported:
//!
//! - streaming (default): clear, fetch, then transform and publish record by
//!   record. A malformed record stops the run with the calendar only partly
//!   republished.
//! - buffered (`sync.transform_before_clear`): fetch and transform the whole
//!   batch first, check it with the [`RefreshGuard`], then clear and publish.

use std::time::Duration;

use chrono::Utc;
use futures::stream::{self, TryStreamExt};

use crate::error::{AppError, Result};
use crate::models::{Config, EventDescriptor, PublishedEvent};
use crate::services::{CalendarBackend, RecordSource};

use super::guard::RefreshGuard;
use super::passage::VesselPassageState;
use super::transform::transform;

/// Summary of a sync run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Records fetched from the feed
    pub records: usize,
    /// Events removed from the calendar
    pub deleted: usize,
    /// Events inserted into the calendar
    pub published: usize,
    /// Vessels with an arrival and no departure in this batch
    pub in_transit: Vec<String>,
}

/// Run one full refresh.
pub async fn run_sync(
    config: &Config,
    source: &dyn RecordSource,
    calendar: &dyn CalendarBackend,
) -> Result<SyncReport> {
    let start_time = Utc::now();

    let report = if config.sync.transform_before_clear {
        run_buffered(config, source, calendar).await?
    } else {
        run_streaming(config, source, calendar).await?
    };

    let elapsed = Utc::now() - start_time;
    log::info!(
        "Sync complete: {} record(s), {} deleted, {} published in {}ms",
        report.records,
        report.deleted,
        report.published,
        elapsed.num_milliseconds()
    );
    Ok(report)
}

async fn run_streaming(
    config: &Config,
    source: &dyn RecordSource,
    calendar: &dyn CalendarBackend,
) -> Result<SyncReport> {
    log::info!("[STEP 1/2] Clearing calendar {}", config.calendar.calendar_id);
    let deleted = clear_calendar(calendar, config.calendar.max_concurrent_deletes).await?;

    log::info!("[STEP 2/2] Publishing closures");
    let records = source.fetch_records().await?;
    let mut state = VesselPassageState::new();
    let published = publish_events(
        calendar,
        transform(&records, &mut state),
        Duration::from_millis(config.calendar.request_delay_ms),
    )
    .await?;

    Ok(SyncReport {
        records: records.len(),
        deleted,
        published,
        in_transit: owned_names(&state),
    })
}

async fn run_buffered(
    config: &Config,
    source: &dyn RecordSource,
    calendar: &dyn CalendarBackend,
) -> Result<SyncReport> {
    log::info!("[STEP 1/3] Fetching and transforming closures");
    let records = source.fetch_records().await?;
    let mut state = VesselPassageState::new();
    let events: Vec<EventDescriptor> = transform(&records, &mut state).collect::<Result<_>>()?;

    log::info!("[STEP 2/3] Clearing calendar {}", config.calendar.calendar_id);
    let existing = calendar.list_events().await?;
    RefreshGuard::with_config((&config.sync).into()).validate(events.len(), existing.len())?;
    let deleted = delete_events(calendar, existing, config.calendar.max_concurrent_deletes).await?;

    log::info!("[STEP 3/3] Publishing {} event(s)", events.len());
    let published = publish_events(
        calendar,
        events.into_iter().map(Ok),
        Duration::from_millis(config.calendar.request_delay_ms),
    )
    .await?;

    Ok(SyncReport {
        records: records.len(),
        deleted,
        published,
        in_transit: owned_names(&state),
    })
}

/// Delete every event in the calendar. Returns the number deleted.
pub async fn clear_calendar(
    calendar: &dyn CalendarBackend,
    max_concurrent: usize,
) -> Result<usize> {
    let existing = calendar.list_events().await?;
    delete_events(calendar, existing, max_concurrent).await
}

async fn delete_events(
    calendar: &dyn CalendarBackend,
    events: Vec<PublishedEvent>,
    max_concurrent: usize,
) -> Result<usize> {
    let count = events.len();
    if count == 0 {
        log::info!("Calendar is already empty");
        return Ok(0);
    }

    log::info!("Deleting {} event(s)", count);
    stream::iter(events.into_iter().map(Ok::<_, AppError>))
        .try_for_each_concurrent(max_concurrent.max(1), move |event| async move {
            calendar.delete_event(&event.id).await
        })
        .await?;

    Ok(count)
}

/// Insert events one at a time, in order. Stops at the first error.
pub async fn publish_events<I>(
    calendar: &dyn CalendarBackend,
    events: I,
    delay: Duration,
) -> Result<usize>
where
    I: Iterator<Item = Result<EventDescriptor>> + Send,
{
    let mut published = 0;

    for event in events {
        calendar.insert_event(&event?).await?;
        published += 1;

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    Ok(published)
}

fn owned_names(state: &VesselPassageState) -> Vec<String> {
    state.in_transit().into_iter().map(str::to_string).collect()
}
