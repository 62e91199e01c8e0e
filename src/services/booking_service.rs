use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::models::{validate_duration, validate_name, CreateWorkout, SlotToken, Workout};
use crate::services::availability_service::AvailabilityService;
use crate::services::error::missing;
use crate::services::{ServiceError, ServiceResult};
use crate::store::RecordStore;

pub const DEFAULT_WORKOUT_TITLE: &str = "Training session";

/// One async mutex per trainer, serialising everything that can put a new
/// scheduled workout on that trainer's calendar.
#[derive(Clone, Default)]
pub struct TrainerLocks {
    locks: Arc<Mutex<HashMap<Uuid, Arc<Mutex<()>>>>>,
}

impl TrainerLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, trainer_id: Uuid) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            // Idle entries are only referenced by the map. Clones are taken
            // under the map lock, so a dropped entry is never handed out again.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks
                .entry(trainer_id)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}

/// Booking request from a client-facing surface. The slot is named either
/// by the token handed out with the availability listing or by an explicit
/// local date and start time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookSlot {
    pub client_id: Uuid,
    pub token: Option<SlotToken>,
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    /// Minutes; the trainer's default session length when omitted.
    pub duration: Option<i64>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub workout_type: Option<String>,
    pub location: Option<String>,
    pub price: Option<i64>,
    pub notes: Option<String>,
}

impl BookSlot {
    pub fn slot_token(&self) -> ServiceResult<SlotToken> {
        match (self.token, self.date, self.start_time) {
            (Some(token), _, _) => Ok(token),
            (None, Some(date), Some(start_time)) => Ok(SlotToken { date, start_time }),
            _ => Err(ServiceError::InvalidRequest(
                "either a slot token or date and start_time is required".to_string(),
            )),
        }
    }
}

#[derive(Clone)]
pub struct BookingService {
    store: RecordStore,
    availability: AvailabilityService,
    locks: TrainerLocks,
}

impl BookingService {
    pub fn new(store: RecordStore, availability: AvailabilityService, locks: TrainerLocks) -> Self {
        Self {
            store,
            availability,
            locks,
        }
    }

    /// Books one of the slots currently offered by the availability
    /// listing.
    ///
    /// Availability is recomputed while the trainer's lock is held, so two
    /// bookings racing for the same slot cannot both see it free. A slot
    /// that is no longer offered fails with `SlotConflict`.
    #[instrument(skip(self, request), fields(client_id = %request.client_id))]
    pub async fn book_slot(&self, trainer_id: Uuid, request: BookSlot) -> ServiceResult<Workout> {
        let token = request.slot_token()?;
        self.owned_client(trainer_id, request.client_id).await?;

        let _guard = self.locks.acquire(trainer_id).await;

        let slots = self
            .availability
            .available_slots(trainer_id, token.date, request.duration)
            .await?;

        let wanted = token.to_string();
        let slot = match slots.into_iter().find(|slot| slot.token == wanted) {
            Some(slot) => slot,
            None => {
                warn!("Slot {} is no longer available for trainer {}", wanted, trainer_id);
                return Err(ServiceError::SlotConflict);
            }
        };

        let data = CreateWorkout {
            client_id: request.client_id,
            title: request
                .title
                .unwrap_or_else(|| DEFAULT_WORKOUT_TITLE.to_string()),
            description: request.description,
            workout_date: slot.start,
            duration: Some(slot.duration as i32),
            status: None,
            workout_type: request.workout_type,
            location: request.location,
            price: request.price,
            notes: request.notes,
        };

        let workout = self
            .store
            .workouts
            .create_workout(trainer_id, data)
            .await
            .map_err(missing("Client"))?;

        info!("Booked workout {} at {} ({})", workout.id, workout.workout_date, slot.label);
        Ok(workout)
    }

    /// Manual entry by the trainer at any time, on or off the slot grid.
    /// Overlaps with scheduled workouts are still rejected by the store.
    #[instrument(skip(self, data), fields(client_id = %data.client_id))]
    pub async fn create_workout(&self, trainer_id: Uuid, data: CreateWorkout) -> ServiceResult<Workout> {
        validate_name(&data.title, "Title").map_err(ServiceError::validation)?;
        validate_duration(i64::from(data.effective_duration())).map_err(ServiceError::validation)?;
        if matches!(data.price, Some(price) if price < 0) {
            return Err(ServiceError::Validation("Price cannot be negative".to_string()));
        }
        self.owned_client(trainer_id, data.client_id).await?;

        let _guard = self.locks.acquire(trainer_id).await;

        let workout = self
            .store
            .workouts
            .create_workout(trainer_id, data)
            .await
            .map_err(missing("Client"))?;

        info!("Created workout {} at {}", workout.id, workout.workout_date);
        Ok(workout)
    }

    async fn owned_client(&self, trainer_id: Uuid, client_id: Uuid) -> ServiceResult<()> {
        let client = self
            .store
            .clients
            .get_client(client_id)
            .await
            .map_err(missing("Client"))?;

        if client.trainer_id != trainer_id {
            return Err(ServiceError::NotFound("Client"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CreateClient, CreateTrainer};
    use crate::services::availability_engine::AvailabilityEngine;
    use assert_matches::assert_matches;
    use chrono::{Datelike, Duration, Utc, Weekday};

    #[tokio::test]
    async fn test_trainer_locks_drop_idle_entries() {
        let locks = TrainerLocks::new();
        let held = Uuid::new_v4();
        let guard = locks.acquire(held).await;

        for _ in 0..3 {
            drop(locks.acquire(Uuid::new_v4()).await);
        }
        let last = locks.acquire(Uuid::new_v4()).await;

        let map = locks.locks.lock().await;
        assert_eq!(map.len(), 2);
        assert!(map.contains_key(&held));
        drop(map);
        drop(guard);
        drop(last);
    }

    #[tokio::test]
    async fn test_trainer_locks_serialise_one_trainer() {
        let locks = TrainerLocks::new();
        let trainer_id = Uuid::new_v4();
        let guard = locks.acquire(trainer_id).await;

        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire(trainer_id).await;
            })
        };
        tokio::task::yield_now().await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
        // unrelated trainers never wait
        drop(locks.acquire(Uuid::new_v4()).await);
    }

    fn next_wednesday() -> NaiveDate {
        let mut date = Utc::now().date_naive() + Duration::days(2);
        while date.weekday() != Weekday::Wed {
            date += Duration::days(1);
        }
        date
    }

    async fn setup() -> (BookingService, Uuid, Uuid) {
        let store = RecordStore::in_memory();
        let trainer = store
            .trainers
            .create_trainer(CreateTrainer {
                telegram_id: 11,
                timezone: Some("UTC".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        let client = store
            .clients
            .create_client(
                trainer.id,
                CreateClient {
                    first_name: "Oleg".to_string(),
                    sessions_total: Some(5),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let availability = AvailabilityService::new(store.clone(), AvailabilityEngine::default());
        let service = BookingService::new(store, availability, TrainerLocks::new());
        (service, trainer.id, client.id)
    }

    fn request(client_id: Uuid, date: NaiveDate, hour: u32) -> BookSlot {
        BookSlot {
            client_id,
            token: Some(SlotToken {
                date,
                start_time: NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
            }),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_booking_the_same_slot_twice_conflicts() {
        let (service, trainer_id, client_id) = setup().await;
        let date = next_wednesday();

        let workout = service
            .book_slot(trainer_id, request(client_id, date, 10))
            .await
            .unwrap();
        assert_eq!(workout.duration, 60);
        assert_eq!(workout.title, DEFAULT_WORKOUT_TITLE);

        let second = service.book_slot(trainer_id, request(client_id, date, 10)).await;
        assert_matches!(second, Err(ServiceError::SlotConflict));
    }

    #[tokio::test]
    async fn test_concurrent_bookings_for_one_slot_admit_exactly_one() {
        let (service, trainer_id, client_id) = setup().await;
        let date = next_wednesday();

        let attempts: Vec<_> = (0..8)
            .map(|_| {
                let service = service.clone();
                tokio::spawn(async move {
                    service.book_slot(trainer_id, request(client_id, date, 14)).await
                })
            })
            .collect();

        let mut booked = 0;
        let mut conflicts = 0;
        for attempt in attempts {
            match attempt.await.unwrap() {
                Ok(_) => booked += 1,
                Err(ServiceError::SlotConflict) => conflicts += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(booked, 1);
        assert_eq!(conflicts, 7);
    }

    #[tokio::test]
    async fn test_request_without_slot_is_invalid() {
        let (service, trainer_id, client_id) = setup().await;
        let result = service
            .book_slot(
                trainer_id,
                BookSlot {
                    client_id,
                    date: Some(next_wednesday()),
                    ..Default::default()
                },
            )
            .await;
        assert_matches!(result, Err(ServiceError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_off_grid_start_is_not_bookable() {
        let (service, trainer_id, client_id) = setup().await;
        let mut off_grid = request(client_id, next_wednesday(), 10);
        off_grid.token = off_grid.token.map(|mut token| {
            token.start_time = NaiveTime::from_hms_opt(10, 10, 0).unwrap();
            token
        });

        assert_matches!(
            service.book_slot(trainer_id, off_grid).await,
            Err(ServiceError::SlotConflict)
        );
    }

    #[tokio::test]
    async fn test_other_trainers_client_cannot_be_booked() {
        let (service, _, client_id) = setup().await;
        let result = service
            .book_slot(Uuid::new_v4(), request(client_id, next_wednesday(), 10))
            .await;
        assert_matches!(result, Err(ServiceError::NotFound("Client")));
    }
}
