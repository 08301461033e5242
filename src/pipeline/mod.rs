//! Record transformation and sync entry points.
//!
//! - `transform`: Turn closure records into calendar events
//! - `run_sync`: Replace the calendar contents with the current feed

pub mod guard;
pub mod passage;
pub mod sync;
pub mod transform;
pub mod window;

pub use guard::{GuardVerdict, RefreshGuard, RefreshGuardConfig};
pub use passage::{Direction, VesselPassageState};
pub use sync::{SyncReport, clear_calendar, publish_events, run_sync};
pub use transform::{ClosureEvents, passage_reason, transform, transform_record};
