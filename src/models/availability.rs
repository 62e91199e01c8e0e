use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::DEFAULT_SESSION_MINUTES;

/// A trainer's bookable hours for one day, as local wall-clock times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingWindow {
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl WorkingWindow {
    pub fn new(start_time: NaiveTime, end_time: NaiveTime) -> Self {
        Self { start_time, end_time }
    }

    pub fn is_well_formed(&self) -> bool {
        self.start_time < self.end_time
    }
}

/// An already scheduled session occupying time on the target date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookedInterval {
    pub start: NaiveDateTime,
    /// Falls back to the default session length when unset.
    pub duration_minutes: Option<i64>,
}

impl BookedInterval {
    pub fn new(start: NaiveDateTime, duration_minutes: i64) -> Self {
        Self {
            start,
            duration_minutes: Some(duration_minutes),
        }
    }

    pub fn effective_duration(&self) -> i64 {
        self.duration_minutes
            .unwrap_or(i64::from(DEFAULT_SESSION_MINUTES))
    }

    pub fn end(&self) -> NaiveDateTime {
        self.start + Duration::minutes(self.effective_duration())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRequest {
    pub date: NaiveDate,
    pub duration_minutes: i64,
}

impl SlotRequest {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            duration_minutes: i64::from(DEFAULT_SESSION_MINUTES),
        }
    }

    pub fn with_duration(mut self, duration_minutes: i64) -> Self {
        self.duration_minutes = duration_minutes;
        self
    }
}

/// A candidate session `[start, end)` that fits the window and collides
/// with nothing already booked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableSlot {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Minutes.
    pub duration: i64,
}

impl AvailableSlot {
    pub fn label(&self) -> String {
        format!("{}-{}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }

    pub fn token(&self) -> SlotToken {
        SlotToken {
            date: self.start.date(),
            start_time: self.start.time(),
        }
    }
}

/// Slot as handed to callers: absolute instants plus the chat label and
/// callback token computed in the trainer's zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookableSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub duration: i64,
    pub label: String,
    pub token: String,
}

const TOKEN_PREFIX: &str = "slot:";

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid slot token '{0}'")]
pub struct InvalidSlotToken(pub String);

/// Opaque callback payload naming a slot by date and local start time,
/// e.g. `slot:2024-01-15:09:30`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotToken {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
}

impl fmt::Display for SlotToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}:{}",
            TOKEN_PREFIX,
            self.date.format("%Y-%m-%d"),
            self.start_time.format("%H:%M")
        )
    }
}

impl FromStr for SlotToken {
    type Err = InvalidSlotToken;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidSlotToken(s.to_string());

        let body = s.strip_prefix(TOKEN_PREFIX).ok_or_else(invalid)?;
        let (date, time) = body.split_once(':').ok_or_else(invalid)?;

        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| invalid())?;
        let start_time = NaiveTime::parse_from_str(time, "%H:%M").map_err(|_| invalid())?;

        Ok(SlotToken { date, start_time })
    }
}

impl Serialize for SlotToken {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SlotToken {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
