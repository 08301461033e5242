//! Service layer for the bridge calendar sync.
//!
//! This module contains the collaborators around the record transformer:
//! - Closure feed access (`OpenDataClient`)
//! - Calendar access (`GoogleCalendar`, `DryRunCalendar`)
//! - Access tokens (`StaticToken`, `AuthorizedUserToken`)

mod auth;
mod calendar;
mod dry_run;
mod opendata;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{EventDescriptor, PublishedEvent, RawRecord};

pub use auth::{
    ACCESS_TOKEN_ENV, AuthorizedUser, AuthorizedUserToken, StaticToken, TokenProvider,
    token_provider,
};
pub use calendar::GoogleCalendar;
pub use dry_run::DryRunCalendar;
pub use opendata::{OpenDataClient, SearchPage};

/// Source of the current batch of closure records.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch every current record, in feed order.
    async fn fetch_records(&self) -> Result<Vec<RawRecord>>;
}

/// The calendar events are published to.
#[async_trait]
pub trait CalendarBackend: Send + Sync {
    /// List every event currently in the calendar.
    async fn list_events(&self) -> Result<Vec<PublishedEvent>>;

    /// Delete one event. Deleting an event that is already gone succeeds.
    async fn delete_event(&self, event_id: &str) -> Result<()>;

    /// Insert one event.
    async fn insert_event(&self, event: &EventDescriptor) -> Result<PublishedEvent>;
}
