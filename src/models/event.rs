//! Calendar event shapes.

use serde::{Deserialize, Serialize};

/// Time zone of the bridge; every published event is expressed in it.
pub const BRIDGE_TIME_ZONE: &str = "Europe/Paris";

/// A local timestamp qualified with its time zone, as the calendar API expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    /// `YYYY-MM-DDTHH:MM:SS`, local to `time_zone`
    pub date_time: String,
    pub time_zone: String,
}

impl EventDateTime {
    /// Build a bridge-local timestamp from a feed date and an `HH:MM` time.
    pub fn local(date: &str, time: &str) -> Self {
        Self {
            date_time: format!("{date}T{time}:00"),
            time_zone: BRIDGE_TIME_ZONE.to_string(),
        }
    }
}

/// An event ready to be inserted into the calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDescriptor {
    /// Event title
    pub summary: String,
    pub start: EventDateTime,
    pub end: EventDateTime,
}

impl EventDescriptor {
    /// The date part of the end timestamp.
    pub fn end_date(&self) -> &str {
        self.end
            .date_time
            .split_once('T')
            .map_or(self.end.date_time.as_str(), |(date, _)| date)
    }

    /// The date part of the start timestamp.
    pub fn start_date(&self) -> &str {
        self.start
            .date_time
            .split_once('T')
            .map_or(self.start.date_time.as_str(), |(date, _)| date)
    }
}

/// An event already present in the target calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedEvent {
    pub id: String,

    #[serde(default)]
    pub summary: Option<String>,
}
