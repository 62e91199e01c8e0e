use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::WorkingWindow;

pub const DEFAULT_SESSION_MINUTES: i32 = 60;
pub const MAX_ADVANCE_BOOKING_DAYS: i32 = 365;

pub fn default_working_hours_start() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default()
}

pub fn default_working_hours_end() -> NaiveTime {
    NaiveTime::from_hms_opt(21, 0, 0).unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct TrainerSettings {
    pub id: Uuid,
    pub trainer_id: Uuid,
    pub working_hours_start: NaiveTime,
    pub working_hours_end: NaiveTime,
    /// ISO weekday numbers, Monday = 1 .. Sunday = 7.
    pub working_days: Vec<i32>,
    pub default_session_duration: i32,
    pub advance_booking_days: i32,
    pub cancellation_hours: i32,
    pub reminder_hours: i32,
    pub auto_confirm_bookings: bool,
    pub email_notifications: bool,
    pub telegram_notifications: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TrainerSettings {
    /// Settings a trainer gets on registration: Mon-Sat, 09:00-21:00.
    pub fn defaults_for(trainer_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            trainer_id,
            working_hours_start: default_working_hours_start(),
            working_hours_end: default_working_hours_end(),
            working_days: vec![1, 2, 3, 4, 5, 6],
            default_session_duration: DEFAULT_SESSION_MINUTES,
            advance_booking_days: 30,
            cancellation_hours: 24,
            reminder_hours: 2,
            auto_confirm_bookings: false,
            email_notifications: true,
            telegram_notifications: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn working_window(&self) -> WorkingWindow {
        WorkingWindow {
            start_time: self.working_hours_start,
            end_time: self.working_hours_end,
        }
    }

    pub fn works_on(&self, date: NaiveDate) -> bool {
        let weekday = date.weekday().number_from_monday() as i32;
        self.working_days.contains(&weekday)
    }

    pub fn apply(&mut self, update: &UpdateTrainerSettings) {
        if let Some(start) = update.working_hours_start {
            self.working_hours_start = start;
        }
        if let Some(end) = update.working_hours_end {
            self.working_hours_end = end;
        }
        if let Some(days) = &update.working_days {
            self.working_days = days.clone();
        }
        if let Some(duration) = update.default_session_duration {
            self.default_session_duration = duration;
        }
        if let Some(days) = update.advance_booking_days {
            self.advance_booking_days = days;
        }
        if let Some(hours) = update.cancellation_hours {
            self.cancellation_hours = hours;
        }
        if let Some(hours) = update.reminder_hours {
            self.reminder_hours = hours;
        }
        if let Some(flag) = update.auto_confirm_bookings {
            self.auto_confirm_bookings = flag;
        }
        if let Some(flag) = update.email_notifications {
            self.email_notifications = flag;
        }
        if let Some(flag) = update.telegram_notifications {
            self.telegram_notifications = flag;
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTrainerSettings {
    pub working_hours_start: Option<NaiveTime>,
    pub working_hours_end: Option<NaiveTime>,
    pub working_days: Option<Vec<i32>>,
    pub default_session_duration: Option<i32>,
    pub advance_booking_days: Option<i32>,
    pub cancellation_hours: Option<i32>,
    pub reminder_hours: Option<i32>,
    pub auto_confirm_bookings: Option<bool>,
    pub email_notifications: Option<bool>,
    pub telegram_notifications: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_cover_monday_to_saturday() {
        let settings = TrainerSettings::defaults_for(Uuid::new_v4());

        // 2024-01-15 is a Monday, 2024-01-21 a Sunday
        assert!(settings.works_on(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()));
        assert!(settings.works_on(NaiveDate::from_ymd_opt(2024, 1, 20).unwrap()));
        assert!(!settings.works_on(NaiveDate::from_ymd_opt(2024, 1, 21).unwrap()));
    }

    #[test]
    fn test_apply_only_touches_given_fields() {
        let mut settings = TrainerSettings::defaults_for(Uuid::new_v4());
        settings.apply(&UpdateTrainerSettings {
            working_hours_end: NaiveTime::from_hms_opt(18, 0, 0),
            ..Default::default()
        });

        assert_eq!(settings.working_hours_start, default_working_hours_start());
        assert_eq!(settings.working_hours_end, NaiveTime::from_hms_opt(18, 0, 0).unwrap());
        assert_eq!(settings.default_session_duration, 60);
    }
}
