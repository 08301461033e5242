//! Closure records as published by the open-data feed.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{AppError, Result};

/// Reason value used by the feed for maintenance closures.
pub const MAINTENANCE_MARKER: &str = "MAINTENANCE";

/// Separator between vessel names in the reason field.
pub const VESSEL_SEPARATOR: &str = " / ";

/// Feed field names.
pub mod fields {
    pub const DATE: &str = "date_passage";
    pub const CLOSURE_KIND: &str = "type_de_fermeture";
    pub const REASON: &str = "bateau";
    pub const START_TIME: &str = "fermeture_a_la_circulation";
    pub const END_TIME: &str = "re_ouverture_a_la_circulation";
}

/// One entry of the feed's `records` array, kept untyped until transformation.
///
/// Field extraction is deferred so that a single bad entry surfaces as an error
/// at its own position in the batch instead of failing the whole page.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recordid: Option<String>,

    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl RawRecord {
    /// Build a raw record from `(field, value)` pairs.
    pub fn from_fields<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            recordid: None,
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
                .collect(),
        }
    }

    fn string_field(&self, position: usize, field: &'static str) -> Result<String> {
        match self.fields.get(field) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(other) => Err(AppError::malformed(
                position,
                field,
                format!("has unexpected type: {other}"),
            )),
            None => Err(AppError::malformed(position, field, "is missing")),
        }
    }
}

/// A single scheduled bridge closure.
///
/// Dates and times keep their feed spelling (`YYYY-MM-DD`, `HH:MM`) because the
/// event window is derived from them textually.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosureRecord {
    pub date: String,
    pub closure_kind: String,
    pub reason: String,
    pub start_time: String,
    pub end_time: String,
}

impl ClosureRecord {
    /// Create a record, checking the shape of the date and time fields.
    pub fn new(
        date: impl Into<String>,
        closure_kind: impl Into<String>,
        reason: impl Into<String>,
        start_time: impl Into<String>,
        end_time: impl Into<String>,
    ) -> Result<Self> {
        Self::checked(
            0,
            Self {
                date: date.into(),
                closure_kind: closure_kind.into(),
                reason: reason.into(),
                start_time: start_time.into(),
                end_time: end_time.into(),
            },
        )
    }

    /// Extract a record from a raw feed entry at `position` in the batch.
    pub fn from_raw(raw: &RawRecord, position: usize) -> Result<Self> {
        let record = Self {
            date: raw.string_field(position, fields::DATE)?,
            closure_kind: raw.string_field(position, fields::CLOSURE_KIND)?,
            reason: raw.string_field(position, fields::REASON)?,
            start_time: raw.string_field(position, fields::START_TIME)?,
            end_time: raw.string_field(position, fields::END_TIME)?,
        };
        Self::checked(position, record)
    }

    fn checked(position: usize, record: Self) -> Result<Self> {
        if record.date.len() != 10 || NaiveDate::parse_from_str(&record.date, "%Y-%m-%d").is_err()
        {
            return Err(AppError::malformed(
                position,
                fields::DATE,
                format!("is not a YYYY-MM-DD date: {:?}", record.date),
            ));
        }
        for (field, value) in [
            (fields::START_TIME, &record.start_time),
            (fields::END_TIME, &record.end_time),
        ] {
            if value.len() != 5 || NaiveTime::parse_from_str(value, "%H:%M").is_err() {
                return Err(AppError::malformed(
                    position,
                    field,
                    format!("is not an HH:MM time: {value:?}"),
                ));
            }
        }
        Ok(record)
    }

    /// Whether this closure is for bridge maintenance rather than vessels.
    pub fn is_maintenance(&self) -> bool {
        self.reason == MAINTENANCE_MARKER
    }

    /// Vessel names listed in the reason field, in feed order.
    pub fn vessels(&self) -> impl Iterator<Item = &str> {
        self.reason
            .split(VESSEL_SEPARATOR)
            .filter(|name| *name != MAINTENANCE_MARKER)
    }

    /// The calendar date of the closure start.
    pub fn start_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()
    }
}

/// Conversion into a [`ClosureRecord`] given its position in the batch.
pub trait IntoClosureRecord {
    fn into_closure_record(self, position: usize) -> Result<ClosureRecord>;
}

impl IntoClosureRecord for ClosureRecord {
    fn into_closure_record(self, _position: usize) -> Result<ClosureRecord> {
        Ok(self)
    }
}

impl IntoClosureRecord for RawRecord {
    fn into_closure_record(self, position: usize) -> Result<ClosureRecord> {
        ClosureRecord::from_raw(&self, position)
    }
}

impl IntoClosureRecord for &RawRecord {
    fn into_closure_record(self, position: usize) -> Result<ClosureRecord> {
        ClosureRecord::from_raw(self, position)
    }
}
