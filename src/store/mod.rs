//! Record Store port.
//!
//! Each record kind gets a narrow async trait; services receive them bundled
//! in [`RecordStore`] so that a single backend (Postgres or in-memory) can
//! serve all of them while tests swap out individual kinds.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::models::*;

pub use memory::InMemoryRecordStore;
pub use postgres::PgRecordStore;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Record not found")]
    NotFound,
    #[error("Slot is already taken by another scheduled workout")]
    SlotConflict,
    #[error("Duplicate record")]
    Duplicate,
    #[error("Record was modified concurrently")]
    StaleRecord,
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    #[error("Database error: {0}")]
    Database(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

// SQLSTATE codes raised by the constraints in migrations/
const EXCLUSION_VIOLATION: &str = "23P01";
const UNIQUE_VIOLATION: &str = "23505";

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
                Some(EXCLUSION_VIOLATION) => StoreError::SlotConflict,
                Some(UNIQUE_VIOLATION) => StoreError::Duplicate,
                _ => StoreError::Database(err.to_string()),
            },
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => StoreError::Unavailable(err.to_string()),
            _ => StoreError::Database(err.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkoutFilter {
    pub trainer_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    /// Empty means any status.
    pub statuses: Vec<WorkoutStatus>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub order: SortOrder,
    pub limit: Option<i64>,
}

impl WorkoutFilter {
    pub fn for_trainer(trainer_id: Uuid) -> Self {
        Self {
            trainer_id: Some(trainer_id),
            ..Default::default()
        }
    }

    pub fn for_client(client_id: Uuid) -> Self {
        Self {
            client_id: Some(client_id),
            ..Default::default()
        }
    }

    pub fn with_statuses(mut self, statuses: &[WorkoutStatus]) -> Self {
        self.statuses = statuses.to_vec();
        self
    }

    pub fn between(mut self, from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    pub fn ordered(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    pub fn limited(mut self, limit: Option<i64>) -> Self {
        self.limit = limit;
        self
    }

    pub fn matches(&self, workout: &Workout) -> bool {
        self.trainer_id.map_or(true, |id| workout.trainer_id == id)
            && self.client_id.map_or(true, |id| workout.client_id == id)
            && (self.statuses.is_empty() || self.statuses.contains(&workout.status))
            && self.from.map_or(true, |from| workout.workout_date >= from)
            && self.to.map_or(true, |to| workout.workout_date <= to)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClientOrder {
    #[default]
    NewestFirst,
    FirstName,
    SubscriptionEnd,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientFilter {
    pub trainer_id: Option<Uuid>,
    pub active_only: bool,
    /// Case-insensitive substring of first or last name.
    pub name_search: Option<String>,
    /// Only clients whose subscription ends on or before this date.
    pub subscription_ends_by: Option<NaiveDate>,
    pub order: ClientOrder,
}

impl ClientFilter {
    pub fn for_trainer(trainer_id: Uuid) -> Self {
        Self {
            trainer_id: Some(trainer_id),
            ..Default::default()
        }
    }

    pub fn active(mut self) -> Self {
        self.active_only = true;
        self
    }

    pub fn matches(&self, client: &Client) -> bool {
        let name_matches = |term: &String| {
            let term = term.to_lowercase();
            client.first_name.to_lowercase().contains(&term)
                || client
                    .last_name
                    .as_ref()
                    .map_or(false, |last| last.to_lowercase().contains(&term))
        };

        self.trainer_id.map_or(true, |id| client.trainer_id == id)
            && (!self.active_only || client.is_active)
            && self.name_search.as_ref().map_or(true, name_matches)
            && self.subscription_ends_by.map_or(true, |date| {
                client.subscription_end.map_or(false, |end| end <= date)
            })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentFilter {
    pub trainer_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl PaymentFilter {
    pub fn matches(&self, payment: &Payment) -> bool {
        self.trainer_id.map_or(true, |id| payment.trainer_id == id)
            && self.client_id.map_or(true, |id| payment.client_id == id)
            && self.from.map_or(true, |from| payment.payment_date >= from)
            && self.to.map_or(true, |to| payment.payment_date <= to)
    }
}

/// Subscription counters as read before a compare-and-set write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionCounters {
    pub total: i32,
    pub used: i32,
}

impl From<&Client> for SessionCounters {
    fn from(client: &Client) -> Self {
        Self {
            total: client.sessions_total,
            used: client.sessions_used,
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TrainerStore: Send + Sync {
    async fn create_trainer(&self, data: CreateTrainer) -> StoreResult<Trainer>;
    async fn get_trainer(&self, id: Uuid) -> StoreResult<Trainer>;
    async fn find_trainer_by_telegram_id(&self, telegram_id: i64) -> StoreResult<Option<Trainer>>;
    async fn update_trainer(&self, id: Uuid, data: UpdateTrainer) -> StoreResult<Trainer>;
    async fn set_trainer_active(&self, id: Uuid, active: bool) -> StoreResult<Trainer>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get_settings(&self, trainer_id: Uuid) -> StoreResult<Option<TrainerSettings>>;
    async fn upsert_settings(&self, settings: TrainerSettings) -> StoreResult<TrainerSettings>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClientStore: Send + Sync {
    async fn create_client(&self, trainer_id: Uuid, data: CreateClient) -> StoreResult<Client>;
    async fn get_client(&self, id: Uuid) -> StoreResult<Client>;
    async fn find_client_by_telegram_id(&self, telegram_id: i64) -> StoreResult<Option<Client>>;
    async fn update_client(&self, id: Uuid, data: UpdateClient) -> StoreResult<Client>;
    async fn query_clients(&self, filter: ClientFilter) -> StoreResult<Vec<Client>>;
    async fn set_client_active(&self, id: Uuid, active: bool) -> StoreResult<Client>;
    /// Writes `next` only if the stored counters still equal `expected`,
    /// otherwise fails with `StaleRecord`.
    async fn compare_and_set_sessions(
        &self,
        id: Uuid,
        expected: SessionCounters,
        next: SessionCounters,
    ) -> StoreResult<Client>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WorkoutStore: Send + Sync {
    /// Fails with `SlotConflict` when a scheduled workout of the same
    /// trainer overlaps the new one.
    async fn create_workout(&self, trainer_id: Uuid, data: CreateWorkout) -> StoreResult<Workout>;
    async fn get_workout(&self, id: Uuid) -> StoreResult<Workout>;
    async fn update_workout(&self, id: Uuid, data: UpdateWorkout) -> StoreResult<Workout>;
    async fn query_workouts(&self, filter: WorkoutFilter) -> StoreResult<Vec<Workout>>;
    /// Moves `from` -> `to` only if the workout is still in `from`,
    /// otherwise fails with `StaleRecord`.
    async fn transition_workout(
        &self,
        id: Uuid,
        from: WorkoutStatus,
        to: WorkoutStatus,
        notes: Option<String>,
    ) -> StoreResult<Workout>;
    async fn set_session_consumed(&self, id: Uuid, consumed: bool) -> StoreResult<Workout>;
    /// Removes the workout together with its exercises.
    async fn delete_workout(&self, id: Uuid) -> StoreResult<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExerciseStore: Send + Sync {
    async fn add_exercises(
        &self,
        workout_id: Uuid,
        exercises: Vec<CreateExercise>,
    ) -> StoreResult<Vec<WorkoutExercise>>;
    async fn list_exercises(&self, workout_id: Uuid) -> StoreResult<Vec<WorkoutExercise>>;
    async fn get_exercise(&self, id: Uuid) -> StoreResult<WorkoutExercise>;
    async fn update_exercise(&self, id: Uuid, data: UpdateExercise) -> StoreResult<WorkoutExercise>;
    async fn delete_exercise(&self, id: Uuid) -> StoreResult<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MeasurementStore: Send + Sync {
    async fn create_measurement(
        &self,
        client_id: Uuid,
        measurement_date: NaiveDate,
        data: CreateMeasurement,
    ) -> StoreResult<Measurement>;
    async fn list_measurements(
        &self,
        client_id: Uuid,
        order: SortOrder,
        limit: Option<i64>,
    ) -> StoreResult<Vec<Measurement>>;
    async fn count_measurements(&self, client_id: Uuid) -> StoreResult<i64>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn create_payment(
        &self,
        trainer_id: Uuid,
        payment_date: NaiveDate,
        data: CreatePayment,
    ) -> StoreResult<Payment>;
    async fn query_payments(&self, filter: PaymentFilter) -> StoreResult<Vec<Payment>>;
}

/// Bundle of the per-kind stores handed to services.
#[derive(Clone)]
pub struct RecordStore {
    pub trainers: Arc<dyn TrainerStore>,
    pub settings: Arc<dyn SettingsStore>,
    pub clients: Arc<dyn ClientStore>,
    pub workouts: Arc<dyn WorkoutStore>,
    pub exercises: Arc<dyn ExerciseStore>,
    pub measurements: Arc<dyn MeasurementStore>,
    pub payments: Arc<dyn PaymentStore>,
}

impl RecordStore {
    /// Serves every record kind from one backend.
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: TrainerStore
            + SettingsStore
            + ClientStore
            + WorkoutStore
            + ExerciseStore
            + MeasurementStore
            + PaymentStore
            + 'static,
    {
        Self {
            trainers: backend.clone(),
            settings: backend.clone(),
            clients: backend.clone(),
            workouts: backend.clone(),
            exercises: backend.clone(),
            measurements: backend.clone(),
            payments: backend,
        }
    }

    pub fn in_memory() -> Self {
        Self::from_backend(Arc::new(InMemoryRecordStore::new()))
    }
}

impl std::fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore").finish_non_exhaustive()
    }
}
