//! Closure record to calendar event transformation.
//!
//! Records are consumed one at a time, in feed order. Each one yields exactly
//! one [`EventDescriptor`]; vessel labels depend on every record seen before it
//! in the same batch, so the input must not be reordered or filtered.

use std::iter::Enumerate;

use crate::error::Result;
use crate::models::{
    ClosureRecord, EventDescriptor, IntoClosureRecord, MAINTENANCE_MARKER, VESSEL_SEPARATOR,
};

use super::passage::VesselPassageState;
use super::window::event_window;

/// Lazy sequence of events for one batch of closure records.
///
/// Stops after the first malformed record: later labels would be computed from
/// an incomplete passage state.
pub struct ClosureEvents<'s, I> {
    records: Enumerate<I>,
    state: &'s mut VesselPassageState,
    done: bool,
}

/// Transform `records` into calendar events, updating `state` as vessels pass.
pub fn transform<I>(records: I, state: &mut VesselPassageState) -> ClosureEvents<'_, I::IntoIter>
where
    I: IntoIterator,
    I::Item: IntoClosureRecord,
{
    ClosureEvents {
        records: records.into_iter().enumerate(),
        state,
        done: false,
    }
}

impl<I> Iterator for ClosureEvents<'_, I>
where
    I: Iterator,
    I::Item: IntoClosureRecord,
{
    type Item = Result<EventDescriptor>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let Some((position, item)) = self.records.next() else {
            self.done = true;
            if !self.state.is_empty() {
                log::debug!(
                    "Batch ended with {} vessel(s) still in transit: {}",
                    self.state.len(),
                    self.state.in_transit().join(", ")
                );
            }
            return None;
        };

        let result = item
            .into_closure_record(position)
            .and_then(|record| transform_record(&record, position, self.state));

        match &result {
            Ok(event) => log::debug!("Record #{}: {}", position, event.summary),
            Err(e) => {
                log::error!("Aborting batch at record #{}: {}", position, e);
                self.done = true;
            }
        }
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            (0, Some(0))
        } else {
            (0, self.records.size_hint().1)
        }
    }
}

/// Build the event for a single record.
pub fn transform_record(
    record: &ClosureRecord,
    position: usize,
    state: &mut VesselPassageState,
) -> Result<EventDescriptor> {
    let (start, end) = event_window(record, position)?;
    let reason = passage_reason(record, state);

    Ok(EventDescriptor {
        summary: format!("{reason}. Closure {}", record.closure_kind),
        start,
        end,
    })
}

/// The reason part of an event title.
///
/// Maintenance closures leave `state` untouched; otherwise each listed vessel
/// is toggled and labeled with its direction.
pub fn passage_reason(record: &ClosureRecord, state: &mut VesselPassageState) -> String {
    if record.is_maintenance() {
        return MAINTENANCE_MARKER.to_string();
    }

    record
        .vessels()
        .map(|vessel| format!("{vessel} {}", state.toggle(vessel)))
        .collect::<Vec<_>>()
        .join(VESSEL_SEPARATOR)
}
