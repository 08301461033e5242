//! Arrival/departure tracking for vessels crossing the bridge.
//!
//! A vessel passes the bridge once on its way up the river and once on its way
//! out, so consecutive mentions of the same name alternate between arrival and
//! departure.

use std::collections::HashSet;
use std::fmt;

/// Direction of a vessel passage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Arrival,
    Departure,
}

impl Direction {
    pub fn label(self) -> &'static str {
        match self {
            Direction::Arrival => "(ARRIVAL)",
            Direction::Departure => "(DEPARTURE)",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Vessels with a recorded arrival and no departure yet.
///
/// Scoped to one batch: build a fresh (empty) state for every run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VesselPassageState {
    in_transit: HashSet<String>,
}

impl VesselPassageState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one mention of `vessel` and return which direction it stands for.
    pub fn toggle(&mut self, vessel: &str) -> Direction {
        if self.in_transit.remove(vessel) {
            Direction::Departure
        } else {
            self.in_transit.insert(vessel.to_string());
            Direction::Arrival
        }
    }

    pub fn contains(&self, vessel: &str) -> bool {
        self.in_transit.contains(vessel)
    }

    pub fn len(&self) -> usize {
        self.in_transit.len()
    }

    pub fn is_empty(&self) -> bool {
        self.in_transit.is_empty()
    }

    /// Vessels currently in transit, sorted by name.
    pub fn in_transit(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.in_transit.iter().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl<S: Into<String>> FromIterator<S> for VesselPassageState {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            in_transit: iter.into_iter().map(Into::into).collect(),
        }
    }
}
