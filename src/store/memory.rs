use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::*;

#[derive(Default)]
struct Tables {
    trainers: HashMap<Uuid, Trainer>,
    settings: HashMap<Uuid, TrainerSettings>,
    clients: HashMap<Uuid, Client>,
    workouts: HashMap<Uuid, Workout>,
    exercises: HashMap<Uuid, WorkoutExercise>,
    measurements: HashMap<Uuid, Measurement>,
    payments: HashMap<Uuid, Payment>,
}

impl Tables {
    /// Mirrors the Postgres exclusion constraint on scheduled workouts.
    fn check_slot_free(&self, candidate: &Workout) -> StoreResult<()> {
        if candidate.status != WorkoutStatus::Scheduled {
            return Ok(());
        }

        let clash = self.workouts.values().any(|existing| {
            existing.id != candidate.id
                && existing.trainer_id == candidate.trainer_id
                && existing.status == WorkoutStatus::Scheduled
                && existing.overlaps(candidate.workout_date, candidate.ends_at())
        });

        if clash {
            Err(StoreError::SlotConflict)
        } else {
            Ok(())
        }
    }
}

/// Record store kept in process memory, with the same conflict semantics
/// as the Postgres schema. Used for tests and local runs.
#[derive(Default)]
pub struct InMemoryRecordStore {
    tables: RwLock<Tables>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn patch<T>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}

fn patch_opt<T>(target: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *target = value;
    }
}

#[async_trait]
impl TrainerStore for InMemoryRecordStore {
    async fn create_trainer(&self, data: CreateTrainer) -> StoreResult<Trainer> {
        let mut tables = self.tables.write().await;

        if tables
            .trainers
            .values()
            .any(|trainer| trainer.telegram_id == data.telegram_id)
        {
            return Err(StoreError::Duplicate);
        }

        let now = Utc::now();
        let trainer = Trainer {
            id: Uuid::new_v4(),
            telegram_id: data.telegram_id,
            first_name: data.first_name,
            last_name: data.last_name,
            username: data.username,
            phone: data.phone,
            email: data.email,
            specialization: data.specialization,
            experience_years: data.experience_years.unwrap_or(0),
            hourly_rate: data.hourly_rate,
            currency: data.currency.unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            timezone: data.timezone.unwrap_or_else(|| DEFAULT_TIMEZONE.to_string()),
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        tables.trainers.insert(trainer.id, trainer.clone());
        Ok(trainer)
    }

    async fn get_trainer(&self, id: Uuid) -> StoreResult<Trainer> {
        let tables = self.tables.read().await;
        tables.trainers.get(&id).cloned().ok_or(StoreError::NotFound)
    }

    async fn find_trainer_by_telegram_id(&self, telegram_id: i64) -> StoreResult<Option<Trainer>> {
        let tables = self.tables.read().await;
        Ok(tables
            .trainers
            .values()
            .find(|trainer| trainer.telegram_id == telegram_id)
            .cloned())
    }

    async fn update_trainer(&self, id: Uuid, data: UpdateTrainer) -> StoreResult<Trainer> {
        let mut tables = self.tables.write().await;
        let trainer = tables.trainers.get_mut(&id).ok_or(StoreError::NotFound)?;

        patch_opt(&mut trainer.first_name, data.first_name);
        patch_opt(&mut trainer.last_name, data.last_name);
        patch_opt(&mut trainer.username, data.username);
        patch_opt(&mut trainer.phone, data.phone);
        patch_opt(&mut trainer.email, data.email);
        patch_opt(&mut trainer.specialization, data.specialization);
        patch(&mut trainer.experience_years, data.experience_years);
        patch_opt(&mut trainer.hourly_rate, data.hourly_rate);
        patch(&mut trainer.currency, data.currency);
        patch(&mut trainer.timezone, data.timezone);
        trainer.updated_at = Utc::now();

        Ok(trainer.clone())
    }

    async fn set_trainer_active(&self, id: Uuid, active: bool) -> StoreResult<Trainer> {
        let mut tables = self.tables.write().await;
        let trainer = tables.trainers.get_mut(&id).ok_or(StoreError::NotFound)?;
        trainer.is_active = active;
        trainer.updated_at = Utc::now();
        Ok(trainer.clone())
    }
}

#[async_trait]
impl SettingsStore for InMemoryRecordStore {
    async fn get_settings(&self, trainer_id: Uuid) -> StoreResult<Option<TrainerSettings>> {
        let tables = self.tables.read().await;
        Ok(tables.settings.get(&trainer_id).cloned())
    }

    async fn upsert_settings(&self, mut settings: TrainerSettings) -> StoreResult<TrainerSettings> {
        let mut tables = self.tables.write().await;

        if !tables.trainers.contains_key(&settings.trainer_id) {
            return Err(StoreError::NotFound);
        }

        let now = Utc::now();
        if let Some(existing) = tables.settings.get(&settings.trainer_id) {
            settings.id = existing.id;
            settings.created_at = existing.created_at;
        }
        settings.updated_at = now;

        tables.settings.insert(settings.trainer_id, settings.clone());
        Ok(settings)
    }
}

#[async_trait]
impl ClientStore for InMemoryRecordStore {
    async fn create_client(&self, trainer_id: Uuid, data: CreateClient) -> StoreResult<Client> {
        let mut tables = self.tables.write().await;

        if !tables.trainers.contains_key(&trainer_id) {
            return Err(StoreError::NotFound);
        }

        let now = Utc::now();
        let client = Client {
            id: Uuid::new_v4(),
            trainer_id,
            telegram_id: data.telegram_id,
            first_name: data.first_name,
            last_name: data.last_name,
            username: data.username,
            phone: data.phone,
            email: data.email,
            birth_date: data.birth_date,
            gender: data.gender,
            height_cm: data.height_cm,
            initial_weight: data.initial_weight,
            current_weight: data.current_weight.or(data.initial_weight),
            target_weight: data.target_weight,
            goal: data.goal,
            medical_notes: data.medical_notes,
            emergency_contact: data.emergency_contact,
            subscription_type: data.subscription_type,
            subscription_start: data.subscription_start,
            subscription_end: data.subscription_end,
            sessions_total: data.sessions_total.unwrap_or(0),
            sessions_used: data.sessions_used.unwrap_or(0),
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        tables.clients.insert(client.id, client.clone());
        Ok(client)
    }

    async fn get_client(&self, id: Uuid) -> StoreResult<Client> {
        let tables = self.tables.read().await;
        tables.clients.get(&id).cloned().ok_or(StoreError::NotFound)
    }

    async fn find_client_by_telegram_id(&self, telegram_id: i64) -> StoreResult<Option<Client>> {
        let tables = self.tables.read().await;
        Ok(tables
            .clients
            .values()
            .find(|client| client.telegram_id == Some(telegram_id))
            .cloned())
    }

    async fn update_client(&self, id: Uuid, data: UpdateClient) -> StoreResult<Client> {
        let mut tables = self.tables.write().await;
        let client = tables.clients.get_mut(&id).ok_or(StoreError::NotFound)?;

        patch_opt(&mut client.telegram_id, data.telegram_id);
        patch(&mut client.first_name, data.first_name);
        patch_opt(&mut client.last_name, data.last_name);
        patch_opt(&mut client.username, data.username);
        patch_opt(&mut client.phone, data.phone);
        patch_opt(&mut client.email, data.email);
        patch_opt(&mut client.birth_date, data.birth_date);
        patch_opt(&mut client.gender, data.gender);
        patch_opt(&mut client.height_cm, data.height_cm);
        patch_opt(&mut client.current_weight, data.current_weight);
        patch_opt(&mut client.target_weight, data.target_weight);
        patch_opt(&mut client.goal, data.goal);
        patch_opt(&mut client.medical_notes, data.medical_notes);
        patch_opt(&mut client.emergency_contact, data.emergency_contact);
        patch_opt(&mut client.subscription_type, data.subscription_type);
        patch_opt(&mut client.subscription_start, data.subscription_start);
        patch_opt(&mut client.subscription_end, data.subscription_end);
        client.updated_at = Utc::now();

        Ok(client.clone())
    }

    async fn query_clients(&self, filter: ClientFilter) -> StoreResult<Vec<Client>> {
        let tables = self.tables.read().await;
        let mut clients: Vec<Client> = tables
            .clients
            .values()
            .filter(|client| filter.matches(client))
            .cloned()
            .collect();

        match filter.order {
            ClientOrder::NewestFirst => clients.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            ClientOrder::FirstName => clients.sort_by(|a, b| a.first_name.cmp(&b.first_name)),
            ClientOrder::SubscriptionEnd => {
                clients.sort_by(|a, b| a.subscription_end.cmp(&b.subscription_end))
            }
        }

        Ok(clients)
    }

    async fn set_client_active(&self, id: Uuid, active: bool) -> StoreResult<Client> {
        let mut tables = self.tables.write().await;
        let client = tables.clients.get_mut(&id).ok_or(StoreError::NotFound)?;
        client.is_active = active;
        client.updated_at = Utc::now();
        Ok(client.clone())
    }

    async fn compare_and_set_sessions(
        &self,
        id: Uuid,
        expected: SessionCounters,
        next: SessionCounters,
    ) -> StoreResult<Client> {
        let mut tables = self.tables.write().await;
        let client = tables.clients.get_mut(&id).ok_or(StoreError::NotFound)?;

        if SessionCounters::from(&*client) != expected {
            return Err(StoreError::StaleRecord);
        }

        client.sessions_total = next.total;
        client.sessions_used = next.used;
        client.updated_at = Utc::now();
        Ok(client.clone())
    }
}

#[async_trait]
impl WorkoutStore for InMemoryRecordStore {
    async fn create_workout(&self, trainer_id: Uuid, data: CreateWorkout) -> StoreResult<Workout> {
        let mut tables = self.tables.write().await;

        if !tables.trainers.contains_key(&trainer_id) || !tables.clients.contains_key(&data.client_id)
        {
            return Err(StoreError::NotFound);
        }

        let now = Utc::now();
        let workout = Workout {
            id: Uuid::new_v4(),
            trainer_id,
            client_id: data.client_id,
            duration: data.effective_duration(),
            title: data.title,
            description: data.description,
            workout_date: data.workout_date,
            status: data.status.unwrap_or_default(),
            workout_type: data.workout_type,
            location: data.location,
            price: data.price,
            notes: data.notes,
            session_consumed: false,
            created_at: now,
            updated_at: now,
        };

        tables.check_slot_free(&workout)?;
        tables.workouts.insert(workout.id, workout.clone());
        Ok(workout)
    }

    async fn get_workout(&self, id: Uuid) -> StoreResult<Workout> {
        let tables = self.tables.read().await;
        tables.workouts.get(&id).cloned().ok_or(StoreError::NotFound)
    }

    async fn update_workout(&self, id: Uuid, data: UpdateWorkout) -> StoreResult<Workout> {
        let mut tables = self.tables.write().await;
        let mut workout = tables.workouts.get(&id).cloned().ok_or(StoreError::NotFound)?;

        patch(&mut workout.title, data.title);
        patch_opt(&mut workout.description, data.description);
        patch(&mut workout.workout_date, data.workout_date);
        patch(&mut workout.duration, data.duration);
        patch_opt(&mut workout.workout_type, data.workout_type);
        patch_opt(&mut workout.location, data.location);
        patch_opt(&mut workout.price, data.price);
        patch_opt(&mut workout.notes, data.notes);
        workout.updated_at = Utc::now();

        tables.check_slot_free(&workout)?;
        tables.workouts.insert(id, workout.clone());
        Ok(workout)
    }

    async fn query_workouts(&self, filter: WorkoutFilter) -> StoreResult<Vec<Workout>> {
        let tables = self.tables.read().await;
        let mut workouts: Vec<Workout> = tables
            .workouts
            .values()
            .filter(|workout| filter.matches(workout))
            .cloned()
            .collect();

        workouts.sort_by(|a, b| match filter.order {
            SortOrder::Ascending => a.workout_date.cmp(&b.workout_date),
            SortOrder::Descending => b.workout_date.cmp(&a.workout_date),
        });

        if let Some(limit) = filter.limit {
            workouts.truncate(limit.max(0) as usize);
        }

        Ok(workouts)
    }

    async fn transition_workout(
        &self,
        id: Uuid,
        from: WorkoutStatus,
        to: WorkoutStatus,
        notes: Option<String>,
    ) -> StoreResult<Workout> {
        let mut tables = self.tables.write().await;
        let mut workout = tables.workouts.get(&id).cloned().ok_or(StoreError::NotFound)?;

        if workout.status != from {
            return Err(StoreError::StaleRecord);
        }

        workout.status = to;
        patch_opt(&mut workout.notes, notes);
        workout.updated_at = Utc::now();

        tables.check_slot_free(&workout)?;
        tables.workouts.insert(id, workout.clone());
        Ok(workout)
    }

    async fn set_session_consumed(&self, id: Uuid, consumed: bool) -> StoreResult<Workout> {
        let mut tables = self.tables.write().await;
        let workout = tables.workouts.get_mut(&id).ok_or(StoreError::NotFound)?;
        workout.session_consumed = consumed;
        workout.updated_at = Utc::now();
        Ok(workout.clone())
    }

    async fn delete_workout(&self, id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.exercises.retain(|_, exercise| exercise.workout_id != id);
        tables.workouts.remove(&id).map(|_| ()).ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl ExerciseStore for InMemoryRecordStore {
    async fn add_exercises(
        &self,
        workout_id: Uuid,
        exercises: Vec<CreateExercise>,
    ) -> StoreResult<Vec<WorkoutExercise>> {
        let mut tables = self.tables.write().await;

        if !tables.workouts.contains_key(&workout_id) {
            return Err(StoreError::NotFound);
        }

        let now = Utc::now();
        let created: Vec<WorkoutExercise> = exercises
            .into_iter()
            .enumerate()
            .map(|(index, exercise)| WorkoutExercise {
                id: Uuid::new_v4(),
                workout_id,
                exercise_name: exercise.exercise_name,
                sets: exercise.sets,
                reps: exercise.reps,
                weight: exercise.weight,
                rest_time: exercise.rest_time,
                notes: exercise.notes,
                order_index: exercise.order_index.unwrap_or(index as i32),
                created_at: now,
            })
            .collect();

        for exercise in &created {
            tables.exercises.insert(exercise.id, exercise.clone());
        }

        Ok(created)
    }

    async fn list_exercises(&self, workout_id: Uuid) -> StoreResult<Vec<WorkoutExercise>> {
        let tables = self.tables.read().await;
        let mut exercises: Vec<WorkoutExercise> = tables
            .exercises
            .values()
            .filter(|exercise| exercise.workout_id == workout_id)
            .cloned()
            .collect();
        exercises.sort_by_key(|exercise| exercise.order_index);
        Ok(exercises)
    }

    async fn get_exercise(&self, id: Uuid) -> StoreResult<WorkoutExercise> {
        let tables = self.tables.read().await;
        tables.exercises.get(&id).cloned().ok_or(StoreError::NotFound)
    }

    async fn update_exercise(&self, id: Uuid, data: UpdateExercise) -> StoreResult<WorkoutExercise> {
        let mut tables = self.tables.write().await;
        let exercise = tables.exercises.get_mut(&id).ok_or(StoreError::NotFound)?;

        patch(&mut exercise.exercise_name, data.exercise_name);
        patch_opt(&mut exercise.sets, data.sets);
        patch_opt(&mut exercise.reps, data.reps);
        patch_opt(&mut exercise.weight, data.weight);
        patch_opt(&mut exercise.rest_time, data.rest_time);
        patch_opt(&mut exercise.notes, data.notes);
        patch(&mut exercise.order_index, data.order_index);

        Ok(exercise.clone())
    }

    async fn delete_exercise(&self, id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.exercises.remove(&id).map(|_| ()).ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl MeasurementStore for InMemoryRecordStore {
    async fn create_measurement(
        &self,
        client_id: Uuid,
        measurement_date: NaiveDate,
        data: CreateMeasurement,
    ) -> StoreResult<Measurement> {
        let mut tables = self.tables.write().await;

        if !tables.clients.contains_key(&client_id) {
            return Err(StoreError::NotFound);
        }

        let measurement = Measurement {
            id: Uuid::new_v4(),
            client_id,
            measurement_date,
            weight: data.weight,
            body_fat_percentage: data.body_fat_percentage,
            muscle_mass: data.muscle_mass,
            chest: data.chest,
            waist: data.waist,
            hips: data.hips,
            bicep: data.bicep,
            thigh: data.thigh,
            neck: data.neck,
            notes: data.notes,
            photo_urls: data.photo_urls,
            created_at: Utc::now(),
        };

        tables.measurements.insert(measurement.id, measurement.clone());
        Ok(measurement)
    }

    async fn list_measurements(
        &self,
        client_id: Uuid,
        order: SortOrder,
        limit: Option<i64>,
    ) -> StoreResult<Vec<Measurement>> {
        let tables = self.tables.read().await;
        let mut measurements: Vec<Measurement> = tables
            .measurements
            .values()
            .filter(|measurement| measurement.client_id == client_id)
            .cloned()
            .collect();

        measurements.sort_by(|a, b| {
            let by_date = a
                .measurement_date
                .cmp(&b.measurement_date)
                .then(a.created_at.cmp(&b.created_at));
            match order {
                SortOrder::Ascending => by_date,
                SortOrder::Descending => by_date.reverse(),
            }
        });

        if let Some(limit) = limit {
            measurements.truncate(limit.max(0) as usize);
        }

        Ok(measurements)
    }

    async fn count_measurements(&self, client_id: Uuid) -> StoreResult<i64> {
        let tables = self.tables.read().await;
        Ok(tables
            .measurements
            .values()
            .filter(|measurement| measurement.client_id == client_id)
            .count() as i64)
    }
}

#[async_trait]
impl PaymentStore for InMemoryRecordStore {
    async fn create_payment(
        &self,
        trainer_id: Uuid,
        payment_date: NaiveDate,
        data: CreatePayment,
    ) -> StoreResult<Payment> {
        let mut tables = self.tables.write().await;

        if !tables.trainers.contains_key(&trainer_id) || !tables.clients.contains_key(&data.client_id)
        {
            return Err(StoreError::NotFound);
        }

        let payment = Payment {
            id: Uuid::new_v4(),
            trainer_id,
            client_id: data.client_id,
            amount: data.amount,
            currency: data.currency.unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            payment_date,
            payment_type: data.payment_type,
            description: data.description,
            status: data.status.unwrap_or_default(),
            created_at: Utc::now(),
        };

        tables.payments.insert(payment.id, payment.clone());
        Ok(payment)
    }

    async fn query_payments(&self, filter: PaymentFilter) -> StoreResult<Vec<Payment>> {
        let tables = self.tables.read().await;
        let mut payments: Vec<Payment> = tables
            .payments
            .values()
            .filter(|payment| filter.matches(payment))
            .cloned()
            .collect();
        payments.sort_by(|a, b| b.payment_date.cmp(&a.payment_date));
        Ok(payments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{Duration, TimeZone};

    async fn seeded() -> (InMemoryRecordStore, Uuid, Uuid) {
        let store = InMemoryRecordStore::new();
        let trainer = store
            .create_trainer(CreateTrainer {
                telegram_id: 42,
                ..Default::default()
            })
            .await
            .unwrap();
        let client = store
            .create_client(
                trainer.id,
                CreateClient {
                    first_name: "Anna".to_string(),
                    sessions_total: Some(10),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        (store, trainer.id, client.id)
    }

    fn workout_at(client_id: Uuid, hour: u32, minutes: i32) -> CreateWorkout {
        CreateWorkout {
            client_id,
            title: "Session".to_string(),
            description: None,
            workout_date: Utc.with_ymd_and_hms(2024, 1, 15, hour, 0, 0).unwrap(),
            duration: Some(minutes),
            status: None,
            workout_type: None,
            location: None,
            price: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_overlapping_scheduled_workout_is_rejected() {
        let (store, trainer_id, client_id) = seeded().await;

        store.create_workout(trainer_id, workout_at(client_id, 9, 60)).await.unwrap();
        let clash = store.create_workout(trainer_id, workout_at(client_id, 9, 30)).await;
        assert_matches!(clash, Err(StoreError::SlotConflict));

        // back-to-back is fine
        store.create_workout(trainer_id, workout_at(client_id, 10, 60)).await.unwrap();
    }

    #[tokio::test]
    async fn test_cancelled_workout_frees_the_slot() {
        let (store, trainer_id, client_id) = seeded().await;

        let first = store.create_workout(trainer_id, workout_at(client_id, 9, 60)).await.unwrap();
        store
            .transition_workout(first.id, WorkoutStatus::Scheduled, WorkoutStatus::Cancelled, None)
            .await
            .unwrap();

        let second = store.create_workout(trainer_id, workout_at(client_id, 9, 60)).await.unwrap();

        // restoring the cancelled one would now double-book
        let restore = store
            .transition_workout(first.id, WorkoutStatus::Cancelled, WorkoutStatus::Scheduled, None)
            .await;
        assert_matches!(restore, Err(StoreError::SlotConflict));
        assert_eq!(store.get_workout(second.id).await.unwrap().status, WorkoutStatus::Scheduled);
    }

    #[tokio::test]
    async fn test_transition_requires_expected_status() {
        let (store, trainer_id, client_id) = seeded().await;
        let workout = store.create_workout(trainer_id, workout_at(client_id, 9, 60)).await.unwrap();

        store
            .transition_workout(workout.id, WorkoutStatus::Scheduled, WorkoutStatus::Completed, None)
            .await
            .unwrap();
        let again = store
            .transition_workout(workout.id, WorkoutStatus::Scheduled, WorkoutStatus::Completed, None)
            .await;
        assert_matches!(again, Err(StoreError::StaleRecord));
    }

    #[tokio::test]
    async fn test_compare_and_set_sessions() {
        let (store, _, client_id) = seeded().await;
        let expected = SessionCounters { total: 10, used: 0 };
        let next = SessionCounters { total: 10, used: 1 };

        let client = store.compare_and_set_sessions(client_id, expected, next).await.unwrap();
        assert_eq!(client.sessions_used, 1);

        let stale = store.compare_and_set_sessions(client_id, expected, next).await;
        assert_matches!(stale, Err(StoreError::StaleRecord));
    }

    #[tokio::test]
    async fn test_query_workouts_filters_and_orders() {
        let (store, trainer_id, client_id) = seeded().await;
        for hour in [12, 9, 15] {
            store.create_workout(trainer_id, workout_at(client_id, hour, 60)).await.unwrap();
        }

        let from = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();
        let workouts = store
            .query_workouts(
                WorkoutFilter::for_trainer(trainer_id)
                    .between(Some(from), Some(from + Duration::hours(10)))
                    .ordered(SortOrder::Descending),
            )
            .await
            .unwrap();

        let hours: Vec<u32> = workouts
            .iter()
            .map(|w| chrono::Timelike::hour(&w.workout_date))
            .collect();
        assert_eq!(hours, vec![15, 12]);
    }

    #[tokio::test]
    async fn test_delete_workout_removes_exercises() {
        let (store, trainer_id, client_id) = seeded().await;
        let workout = store.create_workout(trainer_id, workout_at(client_id, 9, 60)).await.unwrap();
        store
            .add_exercises(
                workout.id,
                vec![CreateExercise {
                    exercise_name: "Squat".to_string(),
                    ..Default::default()
                }],
            )
            .await
            .unwrap();

        store.delete_workout(workout.id).await.unwrap();
        assert!(store.list_exercises(workout.id).await.unwrap().is_empty());
        assert_matches!(store.delete_workout(workout.id).await, Err(StoreError::NotFound));
    }
}
