use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::models::{
    validate_duration, validate_name, CreateExercise, CreateWorkout, UpdateExercise,
    UpdateWorkout, Workout, WorkoutExercise, WorkoutStatus,
};
use crate::services::availability_service::{local_to_utc, parse_timezone};
use crate::services::booking_service::TrainerLocks;
use crate::services::client_service::update_sessions;
use crate::services::error::missing;
use crate::services::retry::RetryConfig;
use crate::services::session_accounting;
use crate::services::{ServiceError, ServiceResult};
use crate::store::{RecordStore, SortOrder, WorkoutFilter};

pub const DEFAULT_UPCOMING_DAYS: i64 = 7;
pub const MAX_UPCOMING_DAYS: i64 = 366;
pub const COPY_SUFFIX: &str = " (copy)";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkoutQuery {
    pub client_id: Option<Uuid>,
    pub status: Option<WorkoutStatus>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
}

/// What happened to the client's subscription as a side effect of a status
/// change.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionOutcome {
    NotAffected,
    Consumed { sessions_remaining: i32 },
    AlreadyConsumed,
    Refunded { sessions_remaining: i32 },
    /// The status change stands; the subscription could not be updated.
    Failed { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct TransitionOutcome {
    pub workout: Workout,
    pub session: SessionOutcome,
}

#[derive(Clone)]
pub struct WorkoutService {
    store: RecordStore,
    locks: TrainerLocks,
    retry: RetryConfig,
}

impl WorkoutService {
    pub fn new(store: RecordStore, locks: TrainerLocks) -> Self {
        Self {
            store,
            locks,
            retry: RetryConfig::default(),
        }
    }

    pub async fn get(&self, trainer_id: Uuid, workout_id: Uuid) -> ServiceResult<Workout> {
        let workout = self
            .store
            .workouts
            .get_workout(workout_id)
            .await
            .map_err(missing("Workout"))?;

        if workout.trainer_id != trainer_id {
            return Err(ServiceError::NotFound("Workout"));
        }
        Ok(workout)
    }

    pub async fn list(&self, trainer_id: Uuid, query: WorkoutQuery) -> ServiceResult<Vec<Workout>> {
        let mut filter = WorkoutFilter::for_trainer(trainer_id)
            .between(query.from, query.to)
            .limited(query.limit.map(|limit| limit.clamp(1, 500)));
        filter.client_id = query.client_id;
        if let Some(status) = query.status {
            filter.statuses = vec![status];
        }

        Ok(self.store.workouts.query_workouts(filter).await?)
    }

    #[instrument(skip(self, data))]
    pub async fn update(
        &self,
        trainer_id: Uuid,
        workout_id: Uuid,
        data: UpdateWorkout,
    ) -> ServiceResult<Workout> {
        if let Some(title) = &data.title {
            validate_name(title, "Title").map_err(ServiceError::validation)?;
        }
        if let Some(duration) = data.duration {
            validate_duration(i64::from(duration)).map_err(ServiceError::validation)?;
        }

        let _guard = self.locks.acquire(trainer_id).await;
        self.get(trainer_id, workout_id).await?;

        self.store
            .workouts
            .update_workout(workout_id, data)
            .await
            .map_err(missing("Workout"))
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, trainer_id: Uuid, workout_id: Uuid) -> ServiceResult<()> {
        self.get(trainer_id, workout_id).await?;
        self.store
            .workouts
            .delete_workout(workout_id)
            .await
            .map_err(missing("Workout"))?;
        info!("Deleted workout {}", workout_id);
        Ok(())
    }

    /// Workouts of every status on the trainer's current local day.
    pub async fn today(&self, trainer_id: Uuid) -> ServiceResult<Vec<Workout>> {
        let trainer = self
            .store
            .trainers
            .get_trainer(trainer_id)
            .await
            .map_err(missing("Trainer"))?;
        let tz = parse_timezone(&trainer.timezone)?;

        let today = Utc::now().with_timezone(&tz).date_naive();
        let midnight = today.and_time(NaiveTime::default());
        let start = local_to_utc(tz, midnight).unwrap_or_else(|| Utc.from_utc_datetime(&midnight));
        let end = start + Duration::days(1) - Duration::seconds(1);

        let filter = WorkoutFilter::for_trainer(trainer_id).between(Some(start), Some(end));
        Ok(self.store.workouts.query_workouts(filter).await?)
    }

    /// Scheduled workouts from now until `days` ahead.
    pub async fn upcoming(&self, trainer_id: Uuid, days: Option<i64>) -> ServiceResult<Vec<Workout>> {
        let days = days.unwrap_or(DEFAULT_UPCOMING_DAYS);
        if !(1..=MAX_UPCOMING_DAYS).contains(&days) {
            return Err(ServiceError::InvalidRequest(format!(
                "Days must be between 1 and {}",
                MAX_UPCOMING_DAYS
            )));
        }

        let now = Utc::now();
        let filter = WorkoutFilter::for_trainer(trainer_id)
            .with_statuses(&[WorkoutStatus::Scheduled])
            .between(Some(now), Some(now + Duration::days(days)));
        Ok(self.store.workouts.query_workouts(filter).await?)
    }

    pub async fn complete(
        &self,
        trainer_id: Uuid,
        workout_id: Uuid,
        notes: Option<String>,
    ) -> ServiceResult<TransitionOutcome> {
        self.transition(trainer_id, workout_id, WorkoutStatus::Completed, notes)
            .await
    }

    pub async fn mark_no_show(&self, trainer_id: Uuid, workout_id: Uuid) -> ServiceResult<TransitionOutcome> {
        self.transition(trainer_id, workout_id, WorkoutStatus::NoShow, None)
            .await
    }

    pub async fn cancel(
        &self,
        trainer_id: Uuid,
        workout_id: Uuid,
        reason: Option<String>,
    ) -> ServiceResult<TransitionOutcome> {
        self.transition(trainer_id, workout_id, WorkoutStatus::Cancelled, reason)
            .await
    }

    /// Puts a completed, no-show or cancelled workout back on the calendar,
    /// refunding the session it used.
    pub async fn reopen(&self, trainer_id: Uuid, workout_id: Uuid) -> ServiceResult<TransitionOutcome> {
        self.transition(trainer_id, workout_id, WorkoutStatus::Scheduled, None)
            .await
    }

    /// Changes status, then settles the client's subscription. Accounting
    /// failures are logged and reported; they never undo the status change.
    #[instrument(skip(self, notes))]
    async fn transition(
        &self,
        trainer_id: Uuid,
        workout_id: Uuid,
        to: WorkoutStatus,
        notes: Option<String>,
    ) -> ServiceResult<TransitionOutcome> {
        // re-entering scheduled claims calendar time
        let _guard = if to == WorkoutStatus::Scheduled {
            Some(self.locks.acquire(trainer_id).await)
        } else {
            None
        };

        let current = self.get(trainer_id, workout_id).await?;
        if !current.status.can_transition_to(to) {
            return Err(ServiceError::InvalidTransition {
                from: current.status,
                to,
            });
        }

        let workout = self
            .store
            .workouts
            .transition_workout(workout_id, current.status, to, notes)
            .await
            .map_err(missing("Workout"))?;
        info!("Workout {} moved {} -> {}", workout_id, current.status, to);

        let (workout, session) = if to.consumes_session() {
            self.consume_for(workout).await
        } else if to == WorkoutStatus::Scheduled {
            self.refund_for(workout).await
        } else {
            (workout, SessionOutcome::NotAffected)
        };

        Ok(TransitionOutcome { workout, session })
    }

    async fn consume_for(&self, workout: Workout) -> (Workout, SessionOutcome) {
        if workout.session_consumed {
            return (workout, SessionOutcome::AlreadyConsumed);
        }

        let client = match update_sessions(
            &self.store,
            &self.retry,
            workout.client_id,
            session_accounting::consume_session,
        )
        .await
        {
            Ok(client) => client,
            Err(err) => {
                warn!(
                    "Could not use a session of client {} for workout {}: {}",
                    workout.client_id, workout.id, err
                );
                return (workout, SessionOutcome::Failed { reason: err.to_string() });
            }
        };

        let outcome = SessionOutcome::Consumed {
            sessions_remaining: client.sessions_remaining(),
        };
        match self.store.workouts.set_session_consumed(workout.id, true).await {
            Ok(workout) => (workout, outcome),
            Err(err) => {
                warn!("Session used but workout {} not flagged: {}", workout.id, err);
                (workout, outcome)
            }
        }
    }

    async fn refund_for(&self, workout: Workout) -> (Workout, SessionOutcome) {
        if !workout.session_consumed {
            return (workout, SessionOutcome::NotAffected);
        }

        let client = match update_sessions(
            &self.store,
            &self.retry,
            workout.client_id,
            session_accounting::refund_session,
        )
        .await
        {
            Ok(client) => client,
            Err(err) => {
                warn!(
                    "Could not refund a session of client {} for workout {}: {}",
                    workout.client_id, workout.id, err
                );
                return (workout, SessionOutcome::Failed { reason: err.to_string() });
            }
        };

        let outcome = SessionOutcome::Refunded {
            sessions_remaining: client.sessions_remaining(),
        };
        match self.store.workouts.set_session_consumed(workout.id, false).await {
            Ok(workout) => (workout, outcome),
            Err(err) => {
                warn!("Session refunded but workout {} still flagged: {}", workout.id, err);
                (workout, outcome)
            }
        }
    }

    /// Copies a workout and its exercises to `workout_date` as a new
    /// scheduled workout.
    #[instrument(skip(self))]
    pub async fn duplicate(
        &self,
        trainer_id: Uuid,
        workout_id: Uuid,
        workout_date: DateTime<Utc>,
    ) -> ServiceResult<Workout> {
        let original = self.get(trainer_id, workout_id).await?;
        let exercises = self.store.exercises.list_exercises(workout_id).await?;

        let data = CreateWorkout {
            client_id: original.client_id,
            title: format!("{}{}", original.title, COPY_SUFFIX),
            description: original.description,
            workout_date,
            duration: Some(original.duration),
            status: Some(WorkoutStatus::Scheduled),
            workout_type: original.workout_type,
            location: original.location,
            price: original.price,
            notes: original.notes,
        };

        let copy = {
            let _guard = self.locks.acquire(trainer_id).await;
            self.store
                .workouts
                .create_workout(trainer_id, data)
                .await
                .map_err(missing("Client"))?
        };

        if !exercises.is_empty() {
            let exercises = exercises.iter().map(CreateExercise::from).collect();
            self.store.exercises.add_exercises(copy.id, exercises).await?;
        }

        info!("Duplicated workout {} as {}", workout_id, copy.id);
        Ok(copy)
    }

    pub async fn add_exercises(
        &self,
        trainer_id: Uuid,
        workout_id: Uuid,
        exercises: Vec<CreateExercise>,
    ) -> ServiceResult<Vec<WorkoutExercise>> {
        if exercises.is_empty() {
            return Err(ServiceError::InvalidRequest("No exercises given".to_string()));
        }
        for exercise in &exercises {
            validate_name(&exercise.exercise_name, "Exercise name")
                .map_err(ServiceError::validation)?;
        }

        self.get(trainer_id, workout_id).await?;
        self.store
            .exercises
            .add_exercises(workout_id, exercises)
            .await
            .map_err(missing("Workout"))
    }

    pub async fn list_exercises(
        &self,
        trainer_id: Uuid,
        workout_id: Uuid,
    ) -> ServiceResult<Vec<WorkoutExercise>> {
        self.get(trainer_id, workout_id).await?;
        Ok(self.store.exercises.list_exercises(workout_id).await?)
    }

    pub async fn update_exercise(
        &self,
        trainer_id: Uuid,
        exercise_id: Uuid,
        data: UpdateExercise,
    ) -> ServiceResult<WorkoutExercise> {
        if let Some(name) = &data.exercise_name {
            validate_name(name, "Exercise name").map_err(ServiceError::validation)?;
        }

        self.owned_exercise(trainer_id, exercise_id).await?;
        self.store
            .exercises
            .update_exercise(exercise_id, data)
            .await
            .map_err(missing("Exercise"))
    }

    pub async fn delete_exercise(&self, trainer_id: Uuid, exercise_id: Uuid) -> ServiceResult<()> {
        self.owned_exercise(trainer_id, exercise_id).await?;
        self.store
            .exercises
            .delete_exercise(exercise_id)
            .await
            .map_err(missing("Exercise"))
    }

    async fn owned_exercise(&self, trainer_id: Uuid, exercise_id: Uuid) -> ServiceResult<WorkoutExercise> {
        let exercise = self
            .store
            .exercises
            .get_exercise(exercise_id)
            .await
            .map_err(missing("Exercise"))?;

        match self.get(trainer_id, exercise.workout_id).await {
            Ok(_) => Ok(exercise),
            Err(ServiceError::NotFound(_)) => Err(ServiceError::NotFound("Exercise")),
            Err(err) => Err(err),
        }
    }

    /// Most recent workouts of one client, newest first.
    pub async fn client_history(
        &self,
        trainer_id: Uuid,
        client_id: Uuid,
        limit: Option<i64>,
    ) -> ServiceResult<Vec<Workout>> {
        let mut filter = WorkoutFilter::for_client(client_id)
            .ordered(SortOrder::Descending)
            .limited(Some(limit.unwrap_or(20).clamp(1, 500)));
        filter.trainer_id = Some(trainer_id);
        Ok(self.store.workouts.query_workouts(filter).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CreateClient, CreateTrainer};
    use crate::store::{MockClientStore, StoreError};
    use assert_matches::assert_matches;
    use std::sync::Arc;

    struct Fixture {
        service: WorkoutService,
        store: RecordStore,
        trainer_id: Uuid,
        client_id: Uuid,
    }

    async fn fixture(sessions_total: i32) -> Fixture {
        let store = RecordStore::in_memory();
        let trainer = store
            .trainers
            .create_trainer(CreateTrainer {
                telegram_id: 3,
                ..Default::default()
            })
            .await
            .unwrap();
        let client = store
            .clients
            .create_client(
                trainer.id,
                CreateClient {
                    first_name: "Maria".to_string(),
                    sessions_total: Some(sessions_total),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        Fixture {
            service: WorkoutService::new(store.clone(), TrainerLocks::new()),
            store,
            trainer_id: trainer.id,
            client_id: client.id,
        }
    }

    async fn schedule(f: &Fixture, hour: u32) -> Workout {
        f.store
            .workouts
            .create_workout(
                f.trainer_id,
                CreateWorkout {
                    client_id: f.client_id,
                    title: "Upper body".to_string(),
                    description: None,
                    workout_date: Utc.with_ymd_and_hms(2024, 3, 4, hour, 0, 0).unwrap(),
                    duration: Some(60),
                    status: None,
                    workout_type: None,
                    location: None,
                    price: Some(250_000),
                    notes: None,
                },
            )
            .await
            .unwrap()
    }

    async fn sessions_used(f: &Fixture) -> i32 {
        f.store.clients.get_client(f.client_id).await.unwrap().sessions_used
    }

    #[tokio::test]
    async fn test_complete_reopen_complete_uses_one_session() {
        let f = fixture(10).await;
        let workout = schedule(&f, 9).await;

        let outcome = f.service.complete(f.trainer_id, workout.id, None).await.unwrap();
        assert_eq!(outcome.session, SessionOutcome::Consumed { sessions_remaining: 9 });
        assert!(outcome.workout.session_consumed);

        let outcome = f.service.reopen(f.trainer_id, workout.id).await.unwrap();
        assert_eq!(outcome.session, SessionOutcome::Refunded { sessions_remaining: 10 });
        assert_eq!(outcome.workout.status, WorkoutStatus::Scheduled);

        f.service.complete(f.trainer_id, workout.id, None).await.unwrap();
        assert_eq!(sessions_used(&f).await, 1);
    }

    #[tokio::test]
    async fn test_no_show_uses_a_session() {
        let f = fixture(10).await;
        let workout = schedule(&f, 9).await;

        let outcome = f.service.mark_no_show(f.trainer_id, workout.id).await.unwrap();
        assert_eq!(outcome.workout.status, WorkoutStatus::NoShow);
        assert_eq!(sessions_used(&f).await, 1);
    }

    #[tokio::test]
    async fn test_exhausted_subscription_still_records_completion() {
        let f = fixture(0).await;
        let workout = schedule(&f, 9).await;

        let outcome = f.service.complete(f.trainer_id, workout.id, None).await.unwrap();
        assert_eq!(outcome.workout.status, WorkoutStatus::Completed);
        assert!(!outcome.workout.session_consumed);
        assert_matches!(outcome.session, SessionOutcome::Failed { .. });
        assert_eq!(sessions_used(&f).await, 0);
    }

    #[tokio::test]
    async fn test_cancel_does_not_touch_sessions() {
        let f = fixture(10).await;
        let workout = schedule(&f, 9).await;

        let outcome = f
            .service
            .cancel(f.trainer_id, workout.id, Some("sick".to_string()))
            .await
            .unwrap();
        assert_eq!(outcome.session, SessionOutcome::NotAffected);
        assert_eq!(outcome.workout.notes.as_deref(), Some("sick"));
        assert_eq!(sessions_used(&f).await, 0);
    }

    #[tokio::test]
    async fn test_invalid_transitions_are_rejected() {
        let f = fixture(10).await;
        let workout = schedule(&f, 9).await;
        f.service.cancel(f.trainer_id, workout.id, None).await.unwrap();

        assert_matches!(
            f.service.complete(f.trainer_id, workout.id, None).await,
            Err(ServiceError::InvalidTransition {
                from: WorkoutStatus::Cancelled,
                to: WorkoutStatus::Completed
            })
        );
    }

    #[tokio::test]
    async fn test_reopening_into_a_taken_slot_conflicts() {
        let f = fixture(10).await;
        let workout = schedule(&f, 9).await;
        f.service.cancel(f.trainer_id, workout.id, None).await.unwrap();
        schedule(&f, 9).await;

        assert_matches!(
            f.service.reopen(f.trainer_id, workout.id).await,
            Err(ServiceError::SlotConflict)
        );
    }

    #[tokio::test]
    async fn test_duplicate_copies_exercises() {
        let f = fixture(10).await;
        let workout = schedule(&f, 9).await;
        f.service
            .add_exercises(
                f.trainer_id,
                workout.id,
                vec![
                    CreateExercise {
                        exercise_name: "Bench press".to_string(),
                        sets: Some(4),
                        ..Default::default()
                    },
                    CreateExercise {
                        exercise_name: "Pull-up".to_string(),
                        ..Default::default()
                    },
                ],
            )
            .await
            .unwrap();

        let next_week = workout.workout_date + Duration::days(7);
        let copy = f.service.duplicate(f.trainer_id, workout.id, next_week).await.unwrap();

        assert_eq!(copy.title, "Upper body (copy)");
        assert_eq!(copy.status, WorkoutStatus::Scheduled);
        let names: Vec<String> = f
            .service
            .list_exercises(f.trainer_id, copy.id)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.exercise_name)
            .collect();
        assert_eq!(names, vec!["Bench press", "Pull-up"]);
    }

    #[tokio::test]
    async fn test_upcoming_rejects_out_of_range_days() {
        let f = fixture(1).await;
        for days in [0, MAX_UPCOMING_DAYS + 1, 1_000_000_000, i64::MAX] {
            let result = f.service.upcoming(f.trainer_id, Some(days)).await;
            assert_matches!(result, Err(ServiceError::InvalidRequest(_)), "days = {}", days);
        }
        assert!(f.service.upcoming(f.trainer_id, Some(MAX_UPCOMING_DAYS)).await.is_ok());
    }

    #[tokio::test]
    async fn test_store_outage_during_accounting_is_reported() {
        let f = fixture(10).await;
        let workout = schedule(&f, 9).await;

        let mut clients = MockClientStore::new();
        clients
            .expect_get_client()
            .returning(|_| Err(StoreError::Unavailable("connection reset".to_string())));
        let mut store = f.store.clone();
        store.clients = Arc::new(clients);
        let service = WorkoutService::new(store, TrainerLocks::new());

        let outcome = service.complete(f.trainer_id, workout.id, None).await.unwrap();
        assert_eq!(outcome.workout.status, WorkoutStatus::Completed);
        assert_matches!(outcome.session, SessionOutcome::Failed { .. });
    }
}
