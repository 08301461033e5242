//! In-memory calendar that only logs what would be published.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{EventDescriptor, PublishedEvent};
use crate::services::CalendarBackend;
use crate::utils::truncate;

#[derive(Debug, Default)]
struct DryRunState {
    events: Vec<(PublishedEvent, Option<EventDescriptor>)>,
    next_id: usize,
    deleted: usize,
}

/// A calendar that keeps events in memory.
#[derive(Debug, Default)]
pub struct DryRunCalendar {
    state: Mutex<DryRunState>,
}

impl DryRunCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with events already "published".
    pub fn with_events(events: impl IntoIterator<Item = PublishedEvent>) -> Self {
        let state = DryRunState {
            events: events.into_iter().map(|e| (e, None)).collect(),
            ..DryRunState::default()
        };
        Self {
            state: Mutex::new(state),
        }
    }

    /// Events inserted through this calendar and still present, in insertion order.
    pub fn inserted(&self) -> Vec<EventDescriptor> {
        self.lock()
            .events
            .iter()
            .filter_map(|(_, descriptor)| descriptor.clone())
            .collect()
    }

    /// Number of events currently held.
    pub fn len(&self) -> usize {
        self.lock().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of successful deletions so far.
    pub fn deleted_count(&self) -> usize {
        self.lock().deleted
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DryRunState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl CalendarBackend for DryRunCalendar {
    async fn list_events(&self) -> Result<Vec<PublishedEvent>> {
        Ok(self.lock().events.iter().map(|(e, _)| e.clone()).collect())
    }

    async fn delete_event(&self, event_id: &str) -> Result<()> {
        let mut state = self.lock();
        let before = state.events.len();
        state.events.retain(|(e, _)| e.id != event_id);
        if state.events.len() < before {
            state.deleted += 1;
            log::info!("[dry-run] delete {}", event_id);
        }
        Ok(())
    }

    async fn insert_event(&self, event: &EventDescriptor) -> Result<PublishedEvent> {
        let mut state = self.lock();
        state.next_id += 1;
        let published = PublishedEvent {
            id: format!("dry-run-{}", state.next_id),
            summary: Some(event.summary.clone()),
        };
        log::info!(
            "[dry-run] insert {} -> {} {}",
            event.start.date_time,
            event.end.date_time,
            truncate(&event.summary, 80)
        );
        state.events.push((published.clone(), Some(event.clone())));
        Ok(published)
    }
}
