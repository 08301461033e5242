//! Refresh guard.
//!
//! Refuses to replace the published calendar when the incoming batch is empty
//! or much smaller than what is currently published, which usually means the
//! feed answered with a truncated or empty page.
//!
//! Only applies when the batch is transformed before the calendar is cleared.

use crate::error::{AppError, Result};
use crate::models::SyncConfig;

/// Guard configuration.
#[derive(Debug, Clone)]
pub struct RefreshGuardConfig {
    /// Maximum allowed drop percentage (0-100).
    pub max_drop_percent: u8,
    /// Below this many published events the drop check is skipped.
    pub min_baseline: usize,
}

impl Default for RefreshGuardConfig {
    fn default() -> Self {
        Self {
            max_drop_percent: 80,
            min_baseline: 10,
        }
    }
}

impl From<&SyncConfig> for RefreshGuardConfig {
    fn from(config: &SyncConfig) -> Self {
        Self {
            max_drop_percent: config.max_drop_percent,
            min_baseline: config.min_baseline,
        }
    }
}

/// Outcome of a guard check.
#[derive(Debug, Clone, PartialEq)]
pub enum GuardVerdict {
    /// Safe to proceed with the refresh
    Safe { incoming: usize, published: usize },
    /// Nothing (or too little) published yet to compare against
    ColdStart { incoming: usize },
    /// Event count drops by more than the threshold
    Triggered {
        incoming: usize,
        published: usize,
        drop_percent: f64,
    },
    /// Empty batch while events are published
    EmptyBatch { published: usize },
}

/// Guard against wiping the calendar with a bad batch.
#[derive(Debug, Clone, Default)]
pub struct RefreshGuard {
    config: RefreshGuardConfig,
}

impl RefreshGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RefreshGuardConfig) -> Self {
        Self { config }
    }

    /// Compare the incoming event count with the published one.
    pub fn check(&self, incoming: usize, published: usize) -> GuardVerdict {
        if incoming == 0 {
            return if published == 0 {
                GuardVerdict::ColdStart { incoming }
            } else {
                GuardVerdict::EmptyBatch { published }
            };
        }

        if published < self.config.min_baseline {
            return GuardVerdict::ColdStart { incoming };
        }

        if incoming < published {
            let drop_percent = ((published - incoming) as f64 / published as f64) * 100.0;
            if drop_percent > self.config.max_drop_percent as f64 {
                return GuardVerdict::Triggered {
                    incoming,
                    published,
                    drop_percent,
                };
            }
        }

        GuardVerdict::Safe {
            incoming,
            published,
        }
    }

    /// Return Ok if the refresh may proceed.
    pub fn validate(&self, incoming: usize, published: usize) -> Result<()> {
        match self.check(incoming, published) {
            GuardVerdict::Safe {
                incoming,
                published,
            } => {
                log::info!(
                    "Refresh guard: SAFE ({} events, {} published)",
                    incoming,
                    published
                );
                Ok(())
            }
            GuardVerdict::ColdStart { incoming } => {
                log::info!(
                    "Refresh guard: COLD START ({} events, below baseline)",
                    incoming
                );
                Ok(())
            }
            GuardVerdict::Triggered {
                incoming,
                published,
                drop_percent,
            } => {
                log::error!(
                    "Refresh guard: TRIGGERED! {} -> {} events ({:.1}% drop > {}% threshold)",
                    published,
                    incoming,
                    drop_percent,
                    self.config.max_drop_percent
                );
                Err(AppError::RefreshAborted {
                    published,
                    incoming,
                    reason: format!(
                        "{drop_percent:.1}% drop exceeds {}%",
                        self.config.max_drop_percent
                    ),
                })
            }
            GuardVerdict::EmptyBatch { published } => {
                log::error!("Refresh guard: EMPTY BATCH - keeping {published} published events");
                Err(AppError::RefreshAborted {
                    published,
                    incoming: 0,
                    reason: "feed returned no records".to_string(),
                })
            }
        }
    }
}
