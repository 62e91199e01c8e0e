//! Free-slot computation for a single trainer day.
//!
//! The engine is a pure grid scan: candidate start times are generated at a
//! fixed step from the start of the working window and every candidate is
//! checked against the booked intervals with half-open overlap semantics.
//! All timestamps are wall-clock values in one zone; converting to and from
//! the trainer's zone is the caller's job.

use chrono::{Duration, NaiveDate};
use thiserror::Error;

use crate::models::{AvailableSlot, BookedInterval, SlotRequest, WorkingWindow};

pub const DEFAULT_GRID_STEP_MINUTES: i64 = 30;

/// Longest session the engine will scan for.
pub const MAX_SESSION_MINUTES: i64 = 24 * 60;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AvailabilityError {
    #[error("Invalid working window configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Invalid slot request: {0}")]
    InvalidRequest(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvailabilityEngine {
    grid_step_minutes: i64,
}

impl Default for AvailabilityEngine {
    fn default() -> Self {
        Self {
            grid_step_minutes: DEFAULT_GRID_STEP_MINUTES,
        }
    }
}

impl AvailabilityEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_grid_step(grid_step_minutes: i64) -> Result<Self, AvailabilityError> {
        if grid_step_minutes <= 0 {
            return Err(AvailabilityError::InvalidConfiguration(format!(
                "grid step must be positive, got {} minutes",
                grid_step_minutes
            )));
        }
        Ok(Self { grid_step_minutes })
    }

    pub fn grid_step_minutes(&self) -> i64 {
        self.grid_step_minutes
    }

    pub fn slots_for(
        &self,
        window: &WorkingWindow,
        booked: &[BookedInterval],
        request: &SlotRequest,
    ) -> Result<Vec<AvailableSlot>, AvailabilityError> {
        self.compute_available_slots(window, booked, request.date, request.duration_minutes)
    }

    /// Validates a working window and a requested duration without
    /// scanning anything.
    pub fn check(
        &self,
        window: &WorkingWindow,
        duration_minutes: i64,
    ) -> Result<(), AvailabilityError> {
        if !window.is_well_formed() {
            return Err(AvailabilityError::InvalidConfiguration(format!(
                "working hours start {} must be before end {}",
                window.start_time.format("%H:%M"),
                window.end_time.format("%H:%M")
            )));
        }

        if duration_minutes <= 0 {
            return Err(AvailabilityError::InvalidRequest(format!(
                "duration must be positive, got {} minutes",
                duration_minutes
            )));
        }

        if duration_minutes > MAX_SESSION_MINUTES {
            return Err(AvailabilityError::InvalidRequest(format!(
                "duration of {} minutes exceeds one day",
                duration_minutes
            )));
        }

        Ok(())
    }

    /// Bookable `[start, end)` windows on `date`, in chronological order.
    ///
    /// A candidate ending exactly when a booking starts (or starting exactly
    /// when one ends) is not a conflict. The last candidate may end exactly
    /// at the window end.
    pub fn compute_available_slots(
        &self,
        window: &WorkingWindow,
        booked: &[BookedInterval],
        date: NaiveDate,
        duration_minutes: i64,
    ) -> Result<Vec<AvailableSlot>, AvailabilityError> {
        self.check(window, duration_minutes)?;

        let duration = Duration::minutes(duration_minutes);
        let step = Duration::minutes(self.grid_step_minutes);
        let window_end = date.and_time(window.end_time);

        let mut cursor = date.and_time(window.start_time);
        let mut slots = Vec::new();

        while cursor + duration <= window_end {
            let candidate_end = cursor + duration;

            let taken = booked
                .iter()
                .any(|interval| cursor < interval.end() && candidate_end > interval.start);

            if !taken {
                slots.push(AvailableSlot {
                    start: cursor,
                    end: candidate_end,
                    duration: duration_minutes,
                });
            }

            cursor += step;
        }

        Ok(slots)
    }
}

/// Runs the engine with the default 30-minute grid.
pub fn compute_available_slots(
    window: &WorkingWindow,
    booked: &[BookedInterval],
    date: NaiveDate,
    duration_minutes: i64,
) -> Result<Vec<AvailableSlot>, AvailabilityError> {
    AvailabilityEngine::default().compute_available_slots(window, booked, date, duration_minutes)
}
