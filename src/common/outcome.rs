//! Results for protocol operations that can finish with advisory failures.
//!
//! A fatal failure is an `Err(AppError)`. An advisory failure is a sub-step
//! that went wrong without invalidating the operation as a whole; it rides
//! along in [`Completed::advisories`] so the caller can surface or log it.

use derive_more::Display;
use serde::Serialize;
use uuid::Uuid;

use crate::backend::BackendError;

#[derive(Debug, Clone, PartialEq, Eq, Display, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Advisory {
    /// The event row exists but its venues were not persisted.
    #[display("venues for event {event_id} were not saved: {message}")]
    VenuesNotSaved { event_id: Uuid, message: String },
    /// Removing an event's venues failed; the enclosing operation went on.
    #[display("venue cleanup for event {event_id} failed: {message}")]
    VenueCleanupFailed { event_id: Uuid, message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Completed<T> {
    pub value: T,
    pub advisories: Vec<Advisory>,
}

impl<T> Completed<T> {
    pub fn new(value: T) -> Self {
        Completed {
            value,
            advisories: Vec::new(),
        }
    }

    pub fn with_advisory(mut self, advisory: Option<Advisory>) -> Self {
        self.advisories.extend(advisory);
        self
    }

    pub fn venues_not_saved(&self) -> bool {
        self.advisories
            .iter()
            .any(|advisory| matches!(advisory, Advisory::VenuesNotSaved { .. }))
    }

    pub fn is_clean(&self) -> bool {
        self.advisories.is_empty()
    }
}

/// Downgrades the failure of a best-effort step to a logged advisory.
pub fn best_effort<T>(
    result: Result<T, BackendError>,
    advisory: impl FnOnce(String) -> Advisory,
) -> Option<Advisory> {
    match result {
        Ok(_) => None,
        Err(error) => {
            let advisory = advisory(error.message);
            log::warn!("{advisory}, proceeding");
            Some(advisory)
        }
    }
}
