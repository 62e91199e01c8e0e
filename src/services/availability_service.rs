use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::models::{AvailableSlot, BookableSlot, BookedInterval, TrainerSettings, WorkoutStatus};
use crate::services::availability_engine::AvailabilityEngine;
use crate::services::error::missing;
use crate::services::{ServiceError, ServiceResult};
use crate::store::{RecordStore, WorkoutFilter};

/// Free slots of a trainer on a given local date.
///
/// Every call reads trainer, settings and scheduled workouts fresh from the
/// store; nothing is cached between calls.
#[derive(Clone)]
pub struct AvailabilityService {
    store: RecordStore,
    engine: AvailabilityEngine,
}

impl AvailabilityService {
    pub fn new(store: RecordStore, engine: AvailabilityEngine) -> Self {
        Self { store, engine }
    }

    #[instrument(skip(self))]
    pub async fn available_slots(
        &self,
        trainer_id: Uuid,
        date: NaiveDate,
        duration_minutes: Option<i64>,
    ) -> ServiceResult<Vec<BookableSlot>> {
        let trainer = self
            .store
            .trainers
            .get_trainer(trainer_id)
            .await
            .map_err(missing("Trainer"))?;
        let settings = match self.store.settings.get_settings(trainer_id).await? {
            Some(settings) => settings,
            None => TrainerSettings::defaults_for(trainer_id),
        };

        let tz = parse_timezone(&trainer.timezone)?;
        let window = settings.working_window();
        let duration =
            duration_minutes.unwrap_or_else(|| i64::from(settings.default_session_duration));

        self.engine.check(&window, duration)?;

        let now = Utc::now();
        let today = now.with_timezone(&tz).date_naive();
        let last_bookable =
            today.checked_add_signed(Duration::days(i64::from(settings.advance_booking_days)));

        let in_window = last_bookable.is_some_and(|last| date >= today && date <= last);
        if !settings.works_on(date) || !in_window {
            debug!("{} is not bookable for trainer {}", date, trainer_id);
            return Ok(Vec::new());
        }

        // Anything starting two days either side can be compared on wall
        // clock time; nothing further away can reach into this date.
        let anchor = Utc.from_utc_datetime(&date.and_time(NaiveTime::default()));
        let filter = WorkoutFilter::for_trainer(trainer_id)
            .with_statuses(&[WorkoutStatus::Scheduled])
            .between(
                Some(anchor - Duration::days(2)),
                Some(anchor + Duration::days(2)),
            );
        let workouts = self.store.workouts.query_workouts(filter).await?;

        let booked: Vec<BookedInterval> = workouts
            .iter()
            .map(|workout| {
                BookedInterval::new(
                    workout.workout_date.with_timezone(&tz).naive_local(),
                    i64::from(workout.duration),
                )
            })
            .collect();

        let slots = self
            .engine
            .compute_available_slots(&window, &booked, date, duration)?;

        Ok(slots
            .iter()
            .filter_map(|slot| to_bookable(tz, slot))
            .filter(|slot| slot.start > now)
            .collect())
    }
}

pub fn parse_timezone(name: &str) -> ServiceResult<Tz> {
    name.parse::<Tz>().map_err(|_| {
        ServiceError::InvalidConfiguration(format!("unknown trainer timezone '{}'", name))
    })
}

/// Local wall-clock time in `tz` as an instant. Times skipped by a DST
/// jump have no instant; ambiguous ones take the earlier reading.
pub fn local_to_utc(tz: Tz, local: NaiveDateTime) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&local)
        .earliest()
        .map(|instant| instant.with_timezone(&Utc))
}

fn to_bookable(tz: Tz, slot: &AvailableSlot) -> Option<BookableSlot> {
    let start = local_to_utc(tz, slot.start)?;
    Some(BookableSlot {
        start,
        end: start + Duration::minutes(slot.duration),
        duration: slot.duration,
        label: slot.label(),
        token: slot.token().to_string(),
    })
}
