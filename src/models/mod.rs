// src/models/mod.rs

//! Domain models for the bridge calendar sync.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod event;
mod record;

// Re-export all public types
pub use config::{AuthConfig, CalendarConfig, Config, FeedConfig, HttpConfig, SyncConfig};
pub use event::{BRIDGE_TIME_ZONE, EventDateTime, EventDescriptor, PublishedEvent};
pub use record::{
    ClosureRecord, IntoClosureRecord, MAINTENANCE_MARKER, RawRecord, VESSEL_SEPARATOR, fields,
};
