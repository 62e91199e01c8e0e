use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::debug;
use uuid::Uuid;

use super::*;

const TRAINER_COLUMNS: &str = "id, telegram_id, first_name, last_name, username, phone, email, \
    specialization, experience_years, hourly_rate, currency, timezone, is_active, created_at, updated_at";

const SETTINGS_COLUMNS: &str = "id, trainer_id, working_hours_start, working_hours_end, working_days, \
    default_session_duration, advance_booking_days, cancellation_hours, reminder_hours, \
    auto_confirm_bookings, email_notifications, telegram_notifications, created_at, updated_at";

const CLIENT_COLUMNS: &str = "id, trainer_id, telegram_id, first_name, last_name, username, phone, email, \
    birth_date, gender, height_cm, initial_weight, current_weight, target_weight, goal, medical_notes, \
    emergency_contact, subscription_type, subscription_start, subscription_end, sessions_total, \
    sessions_used, is_active, created_at, updated_at";

const WORKOUT_COLUMNS: &str = "id, trainer_id, client_id, title, description, workout_date, duration, \
    status, workout_type, location, price, notes, session_consumed, created_at, updated_at";

const EXERCISE_COLUMNS: &str =
    "id, workout_id, exercise_name, sets, reps, weight, rest_time, notes, order_index, created_at";

const MEASUREMENT_COLUMNS: &str = "id, client_id, measurement_date, weight, body_fat_percentage, \
    muscle_mass, chest, waist, hips, bicep, thigh, neck, notes, photo_urls, created_at";

const PAYMENT_COLUMNS: &str = "id, trainer_id, client_id, amount, currency, payment_date, payment_type, \
    description, status, created_at";

/// Record store backed by the Postgres schema in `migrations/`.
///
/// Overlap protection for scheduled workouts lives in the schema as an
/// exclusion constraint, so concurrent writers from other processes are
/// covered too.
#[derive(Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn exists(&self, table: &str, id: Uuid) -> StoreResult<bool> {
        let sql = format!("SELECT EXISTS (SELECT 1 FROM {} WHERE id = $1)", table);
        let exists: bool = sqlx::query_scalar(&sql).bind(id).fetch_one(&self.pool).await?;
        Ok(exists)
    }

    /// A conditional update matched nothing: either the row is gone or its
    /// guarded columns moved on.
    async fn missing_or_stale(&self, table: &str, id: Uuid) -> StoreError {
        match self.exists(table, id).await {
            Ok(true) => StoreError::StaleRecord,
            Ok(false) => StoreError::NotFound,
            Err(err) => err,
        }
    }
}

#[async_trait]
impl TrainerStore for PgRecordStore {
    async fn create_trainer(&self, data: CreateTrainer) -> StoreResult<Trainer> {
        let sql = format!(
            "INSERT INTO trainers (id, telegram_id, first_name, last_name, username, phone, email, \
             specialization, experience_years, hourly_rate, currency, timezone) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) RETURNING {}",
            TRAINER_COLUMNS
        );

        let trainer = sqlx::query_as::<_, Trainer>(&sql)
            .bind(Uuid::new_v4())
            .bind(data.telegram_id)
            .bind(data.first_name)
            .bind(data.last_name)
            .bind(data.username)
            .bind(data.phone)
            .bind(data.email)
            .bind(data.specialization)
            .bind(data.experience_years.unwrap_or(0))
            .bind(data.hourly_rate)
            .bind(data.currency.unwrap_or_else(|| DEFAULT_CURRENCY.to_string()))
            .bind(data.timezone.unwrap_or_else(|| DEFAULT_TIMEZONE.to_string()))
            .fetch_one(&self.pool)
            .await?;

        Ok(trainer)
    }

    async fn get_trainer(&self, id: Uuid) -> StoreResult<Trainer> {
        let sql = format!("SELECT {} FROM trainers WHERE id = $1", TRAINER_COLUMNS);
        let trainer = sqlx::query_as::<_, Trainer>(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(trainer)
    }

    async fn find_trainer_by_telegram_id(&self, telegram_id: i64) -> StoreResult<Option<Trainer>> {
        let sql = format!("SELECT {} FROM trainers WHERE telegram_id = $1", TRAINER_COLUMNS);
        let trainer = sqlx::query_as::<_, Trainer>(&sql)
            .bind(telegram_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(trainer)
    }

    async fn update_trainer(&self, id: Uuid, data: UpdateTrainer) -> StoreResult<Trainer> {
        let sql = format!(
            "UPDATE trainers SET \
             first_name = COALESCE($2, first_name), \
             last_name = COALESCE($3, last_name), \
             username = COALESCE($4, username), \
             phone = COALESCE($5, phone), \
             email = COALESCE($6, email), \
             specialization = COALESCE($7, specialization), \
             experience_years = COALESCE($8, experience_years), \
             hourly_rate = COALESCE($9, hourly_rate), \
             currency = COALESCE($10, currency), \
             timezone = COALESCE($11, timezone), \
             updated_at = NOW() \
             WHERE id = $1 RETURNING {}",
            TRAINER_COLUMNS
        );

        let trainer = sqlx::query_as::<_, Trainer>(&sql)
            .bind(id)
            .bind(data.first_name)
            .bind(data.last_name)
            .bind(data.username)
            .bind(data.phone)
            .bind(data.email)
            .bind(data.specialization)
            .bind(data.experience_years)
            .bind(data.hourly_rate)
            .bind(data.currency)
            .bind(data.timezone)
            .fetch_one(&self.pool)
            .await?;

        Ok(trainer)
    }

    async fn set_trainer_active(&self, id: Uuid, active: bool) -> StoreResult<Trainer> {
        let sql = format!(
            "UPDATE trainers SET is_active = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            TRAINER_COLUMNS
        );
        let trainer = sqlx::query_as::<_, Trainer>(&sql)
            .bind(id)
            .bind(active)
            .fetch_one(&self.pool)
            .await?;
        Ok(trainer)
    }
}

#[async_trait]
impl SettingsStore for PgRecordStore {
    async fn get_settings(&self, trainer_id: Uuid) -> StoreResult<Option<TrainerSettings>> {
        let sql = format!(
            "SELECT {} FROM trainer_settings WHERE trainer_id = $1",
            SETTINGS_COLUMNS
        );
        let settings = sqlx::query_as::<_, TrainerSettings>(&sql)
            .bind(trainer_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(settings)
    }

    async fn upsert_settings(&self, settings: TrainerSettings) -> StoreResult<TrainerSettings> {
        if !self.exists("trainers", settings.trainer_id).await? {
            return Err(StoreError::NotFound);
        }

        let sql = format!(
            "INSERT INTO trainer_settings (id, trainer_id, working_hours_start, working_hours_end, \
             working_days, default_session_duration, advance_booking_days, cancellation_hours, \
             reminder_hours, auto_confirm_bookings, email_notifications, telegram_notifications) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             ON CONFLICT (trainer_id) DO UPDATE SET \
             working_hours_start = EXCLUDED.working_hours_start, \
             working_hours_end = EXCLUDED.working_hours_end, \
             working_days = EXCLUDED.working_days, \
             default_session_duration = EXCLUDED.default_session_duration, \
             advance_booking_days = EXCLUDED.advance_booking_days, \
             cancellation_hours = EXCLUDED.cancellation_hours, \
             reminder_hours = EXCLUDED.reminder_hours, \
             auto_confirm_bookings = EXCLUDED.auto_confirm_bookings, \
             email_notifications = EXCLUDED.email_notifications, \
             telegram_notifications = EXCLUDED.telegram_notifications, \
             updated_at = NOW() \
             RETURNING {}",
            SETTINGS_COLUMNS
        );

        let stored = sqlx::query_as::<_, TrainerSettings>(&sql)
            .bind(settings.id)
            .bind(settings.trainer_id)
            .bind(settings.working_hours_start)
            .bind(settings.working_hours_end)
            .bind(settings.working_days)
            .bind(settings.default_session_duration)
            .bind(settings.advance_booking_days)
            .bind(settings.cancellation_hours)
            .bind(settings.reminder_hours)
            .bind(settings.auto_confirm_bookings)
            .bind(settings.email_notifications)
            .bind(settings.telegram_notifications)
            .fetch_one(&self.pool)
            .await?;

        Ok(stored)
    }
}

#[async_trait]
impl ClientStore for PgRecordStore {
    async fn create_client(&self, trainer_id: Uuid, data: CreateClient) -> StoreResult<Client> {
        if !self.exists("trainers", trainer_id).await? {
            return Err(StoreError::NotFound);
        }

        let sql = format!(
            "INSERT INTO clients (id, trainer_id, telegram_id, first_name, last_name, username, phone, \
             email, birth_date, gender, height_cm, initial_weight, current_weight, target_weight, goal, \
             medical_notes, emergency_contact, subscription_type, subscription_start, subscription_end, \
             sessions_total, sessions_used) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, \
             $19, $20, $21, $22) RETURNING {}",
            CLIENT_COLUMNS
        );

        let current_weight = data.current_weight.or(data.initial_weight);
        let client = sqlx::query_as::<_, Client>(&sql)
            .bind(Uuid::new_v4())
            .bind(trainer_id)
            .bind(data.telegram_id)
            .bind(data.first_name)
            .bind(data.last_name)
            .bind(data.username)
            .bind(data.phone)
            .bind(data.email)
            .bind(data.birth_date)
            .bind(data.gender)
            .bind(data.height_cm)
            .bind(data.initial_weight)
            .bind(current_weight)
            .bind(data.target_weight)
            .bind(data.goal)
            .bind(data.medical_notes)
            .bind(data.emergency_contact)
            .bind(data.subscription_type)
            .bind(data.subscription_start)
            .bind(data.subscription_end)
            .bind(data.sessions_total.unwrap_or(0))
            .bind(data.sessions_used.unwrap_or(0))
            .fetch_one(&self.pool)
            .await?;

        Ok(client)
    }

    async fn get_client(&self, id: Uuid) -> StoreResult<Client> {
        let sql = format!("SELECT {} FROM clients WHERE id = $1", CLIENT_COLUMNS);
        let client = sqlx::query_as::<_, Client>(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(client)
    }

    async fn find_client_by_telegram_id(&self, telegram_id: i64) -> StoreResult<Option<Client>> {
        let sql = format!(
            "SELECT {} FROM clients WHERE telegram_id = $1 ORDER BY created_at LIMIT 1",
            CLIENT_COLUMNS
        );
        let client = sqlx::query_as::<_, Client>(&sql)
            .bind(telegram_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(client)
    }

    async fn update_client(&self, id: Uuid, data: UpdateClient) -> StoreResult<Client> {
        let sql = format!(
            "UPDATE clients SET \
             telegram_id = COALESCE($2, telegram_id), \
             first_name = COALESCE($3, first_name), \
             last_name = COALESCE($4, last_name), \
             username = COALESCE($5, username), \
             phone = COALESCE($6, phone), \
             email = COALESCE($7, email), \
             birth_date = COALESCE($8, birth_date), \
             gender = COALESCE($9, gender), \
             height_cm = COALESCE($10, height_cm), \
             current_weight = COALESCE($11, current_weight), \
             target_weight = COALESCE($12, target_weight), \
             goal = COALESCE($13, goal), \
             medical_notes = COALESCE($14, medical_notes), \
             emergency_contact = COALESCE($15, emergency_contact), \
             subscription_type = COALESCE($16, subscription_type), \
             subscription_start = COALESCE($17, subscription_start), \
             subscription_end = COALESCE($18, subscription_end), \
             updated_at = NOW() \
             WHERE id = $1 RETURNING {}",
            CLIENT_COLUMNS
        );

        let client = sqlx::query_as::<_, Client>(&sql)
            .bind(id)
            .bind(data.telegram_id)
            .bind(data.first_name)
            .bind(data.last_name)
            .bind(data.username)
            .bind(data.phone)
            .bind(data.email)
            .bind(data.birth_date)
            .bind(data.gender)
            .bind(data.height_cm)
            .bind(data.current_weight)
            .bind(data.target_weight)
            .bind(data.goal)
            .bind(data.medical_notes)
            .bind(data.emergency_contact)
            .bind(data.subscription_type)
            .bind(data.subscription_start)
            .bind(data.subscription_end)
            .fetch_one(&self.pool)
            .await?;

        Ok(client)
    }

    async fn query_clients(&self, filter: ClientFilter) -> StoreResult<Vec<Client>> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM clients WHERE TRUE", CLIENT_COLUMNS));

        if let Some(trainer_id) = filter.trainer_id {
            query.push(" AND trainer_id = ").push_bind(trainer_id);
        }
        if filter.active_only {
            query.push(" AND is_active = TRUE");
        }
        if let Some(term) = &filter.name_search {
            let pattern = format!("%{}%", term);
            query
                .push(" AND (first_name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR last_name ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(date) = filter.subscription_ends_by {
            query.push(" AND subscription_end <= ").push_bind(date);
        }

        query.push(match filter.order {
            ClientOrder::NewestFirst => " ORDER BY created_at DESC",
            ClientOrder::FirstName => " ORDER BY first_name ASC",
            ClientOrder::SubscriptionEnd => " ORDER BY subscription_end ASC",
        });

        let clients = query
            .build_query_as::<Client>()
            .fetch_all(&self.pool)
            .await?;
        Ok(clients)
    }

    async fn set_client_active(&self, id: Uuid, active: bool) -> StoreResult<Client> {
        let sql = format!(
            "UPDATE clients SET is_active = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            CLIENT_COLUMNS
        );
        let client = sqlx::query_as::<_, Client>(&sql)
            .bind(id)
            .bind(active)
            .fetch_one(&self.pool)
            .await?;
        Ok(client)
    }

    async fn compare_and_set_sessions(
        &self,
        id: Uuid,
        expected: SessionCounters,
        next: SessionCounters,
    ) -> StoreResult<Client> {
        let sql = format!(
            "UPDATE clients SET sessions_total = $4, sessions_used = $5, updated_at = NOW() \
             WHERE id = $1 AND sessions_total = $2 AND sessions_used = $3 RETURNING {}",
            CLIENT_COLUMNS
        );

        let updated = sqlx::query_as::<_, Client>(&sql)
            .bind(id)
            .bind(expected.total)
            .bind(expected.used)
            .bind(next.total)
            .bind(next.used)
            .fetch_optional(&self.pool)
            .await?;

        match updated {
            Some(client) => Ok(client),
            None => Err(self.missing_or_stale("clients", id).await),
        }
    }
}

#[async_trait]
impl WorkoutStore for PgRecordStore {
    async fn create_workout(&self, trainer_id: Uuid, data: CreateWorkout) -> StoreResult<Workout> {
        if !self.exists("clients", data.client_id).await? {
            return Err(StoreError::NotFound);
        }

        let sql = format!(
            "INSERT INTO workouts (id, trainer_id, client_id, title, description, workout_date, duration, \
             status, workout_type, location, price, notes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) RETURNING {}",
            WORKOUT_COLUMNS
        );

        let duration = data.effective_duration();
        let workout = sqlx::query_as::<_, Workout>(&sql)
            .bind(Uuid::new_v4())
            .bind(trainer_id)
            .bind(data.client_id)
            .bind(data.title)
            .bind(data.description)
            .bind(data.workout_date)
            .bind(duration)
            .bind(data.status.unwrap_or_default())
            .bind(data.workout_type)
            .bind(data.location)
            .bind(data.price)
            .bind(data.notes)
            .fetch_one(&self.pool)
            .await?;

        debug!("Inserted workout {} for trainer {}", workout.id, trainer_id);
        Ok(workout)
    }

    async fn get_workout(&self, id: Uuid) -> StoreResult<Workout> {
        let sql = format!("SELECT {} FROM workouts WHERE id = $1", WORKOUT_COLUMNS);
        let workout = sqlx::query_as::<_, Workout>(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(workout)
    }

    async fn update_workout(&self, id: Uuid, data: UpdateWorkout) -> StoreResult<Workout> {
        let sql = format!(
            "UPDATE workouts SET \
             title = COALESCE($2, title), \
             description = COALESCE($3, description), \
             workout_date = COALESCE($4, workout_date), \
             duration = COALESCE($5, duration), \
             workout_type = COALESCE($6, workout_type), \
             location = COALESCE($7, location), \
             price = COALESCE($8, price), \
             notes = COALESCE($9, notes), \
             updated_at = NOW() \
             WHERE id = $1 RETURNING {}",
            WORKOUT_COLUMNS
        );

        let workout = sqlx::query_as::<_, Workout>(&sql)
            .bind(id)
            .bind(data.title)
            .bind(data.description)
            .bind(data.workout_date)
            .bind(data.duration)
            .bind(data.workout_type)
            .bind(data.location)
            .bind(data.price)
            .bind(data.notes)
            .fetch_one(&self.pool)
            .await?;

        Ok(workout)
    }

    async fn query_workouts(&self, filter: WorkoutFilter) -> StoreResult<Vec<Workout>> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM workouts WHERE TRUE", WORKOUT_COLUMNS));

        if let Some(trainer_id) = filter.trainer_id {
            query.push(" AND trainer_id = ").push_bind(trainer_id);
        }
        if let Some(client_id) = filter.client_id {
            query.push(" AND client_id = ").push_bind(client_id);
        }
        if !filter.statuses.is_empty() {
            let labels: Vec<String> = filter
                .statuses
                .iter()
                .map(|status| status.as_str().to_string())
                .collect();
            query.push(" AND status = ANY(").push_bind(labels).push(")");
        }
        if let Some(from) = filter.from {
            query.push(" AND workout_date >= ").push_bind(from);
        }
        if let Some(to) = filter.to {
            query.push(" AND workout_date <= ").push_bind(to);
        }

        query.push(match filter.order {
            SortOrder::Ascending => " ORDER BY workout_date ASC",
            SortOrder::Descending => " ORDER BY workout_date DESC",
        });

        if let Some(limit) = filter.limit {
            query.push(" LIMIT ").push_bind(limit);
        }

        let workouts = query
            .build_query_as::<Workout>()
            .fetch_all(&self.pool)
            .await?;
        Ok(workouts)
    }

    async fn transition_workout(
        &self,
        id: Uuid,
        from: WorkoutStatus,
        to: WorkoutStatus,
        notes: Option<String>,
    ) -> StoreResult<Workout> {
        let sql = format!(
            "UPDATE workouts SET status = $3, notes = COALESCE($4, notes), updated_at = NOW() \
             WHERE id = $1 AND status = $2 RETURNING {}",
            WORKOUT_COLUMNS
        );

        let updated = sqlx::query_as::<_, Workout>(&sql)
            .bind(id)
            .bind(from)
            .bind(to)
            .bind(notes)
            .fetch_optional(&self.pool)
            .await?;

        match updated {
            Some(workout) => Ok(workout),
            None => Err(self.missing_or_stale("workouts", id).await),
        }
    }

    async fn set_session_consumed(&self, id: Uuid, consumed: bool) -> StoreResult<Workout> {
        let sql = format!(
            "UPDATE workouts SET session_consumed = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            WORKOUT_COLUMNS
        );
        let workout = sqlx::query_as::<_, Workout>(&sql)
            .bind(id)
            .bind(consumed)
            .fetch_one(&self.pool)
            .await?;
        Ok(workout)
    }

    async fn delete_workout(&self, id: Uuid) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM workout_exercises WHERE workout_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM workouts WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl ExerciseStore for PgRecordStore {
    async fn add_exercises(
        &self,
        workout_id: Uuid,
        exercises: Vec<CreateExercise>,
    ) -> StoreResult<Vec<WorkoutExercise>> {
        if !self.exists("workouts", workout_id).await? {
            return Err(StoreError::NotFound);
        }

        let sql = format!(
            "INSERT INTO workout_exercises (id, workout_id, exercise_name, sets, reps, weight, rest_time, \
             notes, order_index) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {}",
            EXERCISE_COLUMNS
        );

        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(exercises.len());

        for (index, exercise) in exercises.into_iter().enumerate() {
            let order_index = exercise.order_index.unwrap_or(index as i32);
            let row = sqlx::query_as::<_, WorkoutExercise>(&sql)
                .bind(Uuid::new_v4())
                .bind(workout_id)
                .bind(exercise.exercise_name)
                .bind(exercise.sets)
                .bind(exercise.reps)
                .bind(exercise.weight)
                .bind(exercise.rest_time)
                .bind(exercise.notes)
                .bind(order_index)
                .fetch_one(&mut *tx)
                .await?;
            created.push(row);
        }

        tx.commit().await?;
        Ok(created)
    }

    async fn list_exercises(&self, workout_id: Uuid) -> StoreResult<Vec<WorkoutExercise>> {
        let sql = format!(
            "SELECT {} FROM workout_exercises WHERE workout_id = $1 ORDER BY order_index",
            EXERCISE_COLUMNS
        );
        let exercises = sqlx::query_as::<_, WorkoutExercise>(&sql)
            .bind(workout_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(exercises)
    }

    async fn get_exercise(&self, id: Uuid) -> StoreResult<WorkoutExercise> {
        let sql = format!("SELECT {} FROM workout_exercises WHERE id = $1", EXERCISE_COLUMNS);
        let exercise = sqlx::query_as::<_, WorkoutExercise>(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exercise)
    }

    async fn update_exercise(&self, id: Uuid, data: UpdateExercise) -> StoreResult<WorkoutExercise> {
        let sql = format!(
            "UPDATE workout_exercises SET \
             exercise_name = COALESCE($2, exercise_name), \
             sets = COALESCE($3, sets), \
             reps = COALESCE($4, reps), \
             weight = COALESCE($5, weight), \
             rest_time = COALESCE($6, rest_time), \
             notes = COALESCE($7, notes), \
             order_index = COALESCE($8, order_index) \
             WHERE id = $1 RETURNING {}",
            EXERCISE_COLUMNS
        );

        let exercise = sqlx::query_as::<_, WorkoutExercise>(&sql)
            .bind(id)
            .bind(data.exercise_name)
            .bind(data.sets)
            .bind(data.reps)
            .bind(data.weight)
            .bind(data.rest_time)
            .bind(data.notes)
            .bind(data.order_index)
            .fetch_one(&self.pool)
            .await?;

        Ok(exercise)
    }

    async fn delete_exercise(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM workout_exercises WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl MeasurementStore for PgRecordStore {
    async fn create_measurement(
        &self,
        client_id: Uuid,
        measurement_date: NaiveDate,
        data: CreateMeasurement,
    ) -> StoreResult<Measurement> {
        if !self.exists("clients", client_id).await? {
            return Err(StoreError::NotFound);
        }

        let sql = format!(
            "INSERT INTO client_measurements (id, client_id, measurement_date, weight, \
             body_fat_percentage, muscle_mass, chest, waist, hips, bicep, thigh, neck, notes, photo_urls) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) RETURNING {}",
            MEASUREMENT_COLUMNS
        );

        let measurement = sqlx::query_as::<_, Measurement>(&sql)
            .bind(Uuid::new_v4())
            .bind(client_id)
            .bind(measurement_date)
            .bind(data.weight)
            .bind(data.body_fat_percentage)
            .bind(data.muscle_mass)
            .bind(data.chest)
            .bind(data.waist)
            .bind(data.hips)
            .bind(data.bicep)
            .bind(data.thigh)
            .bind(data.neck)
            .bind(data.notes)
            .bind(data.photo_urls)
            .fetch_one(&self.pool)
            .await?;

        Ok(measurement)
    }

    async fn list_measurements(
        &self,
        client_id: Uuid,
        order: SortOrder,
        limit: Option<i64>,
    ) -> StoreResult<Vec<Measurement>> {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {} FROM client_measurements WHERE client_id = ",
            MEASUREMENT_COLUMNS
        ));
        query.push_bind(client_id);

        query.push(match order {
            SortOrder::Ascending => " ORDER BY measurement_date ASC, created_at ASC",
            SortOrder::Descending => " ORDER BY measurement_date DESC, created_at DESC",
        });

        if let Some(limit) = limit {
            query.push(" LIMIT ").push_bind(limit);
        }

        let measurements = query
            .build_query_as::<Measurement>()
            .fetch_all(&self.pool)
            .await?;
        Ok(measurements)
    }

    async fn count_measurements(&self, client_id: Uuid) -> StoreResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM client_measurements WHERE client_id = $1")
                .bind(client_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}

#[async_trait]
impl PaymentStore for PgRecordStore {
    async fn create_payment(
        &self,
        trainer_id: Uuid,
        payment_date: NaiveDate,
        data: CreatePayment,
    ) -> StoreResult<Payment> {
        if !self.exists("clients", data.client_id).await? {
            return Err(StoreError::NotFound);
        }

        let sql = format!(
            "INSERT INTO payments (id, trainer_id, client_id, amount, currency, payment_date, \
             payment_type, description, status, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING {}",
            PAYMENT_COLUMNS
        );

        let payment = sqlx::query_as::<_, Payment>(&sql)
            .bind(Uuid::new_v4())
            .bind(trainer_id)
            .bind(data.client_id)
            .bind(data.amount)
            .bind(data.currency.unwrap_or_else(|| DEFAULT_CURRENCY.to_string()))
            .bind(payment_date)
            .bind(data.payment_type)
            .bind(data.description)
            .bind(data.status.unwrap_or_default())
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await?;

        Ok(payment)
    }

    async fn query_payments(&self, filter: PaymentFilter) -> StoreResult<Vec<Payment>> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM payments WHERE TRUE", PAYMENT_COLUMNS));

        if let Some(trainer_id) = filter.trainer_id {
            query.push(" AND trainer_id = ").push_bind(trainer_id);
        }
        if let Some(client_id) = filter.client_id {
            query.push(" AND client_id = ").push_bind(client_id);
        }
        if let Some(from) = filter.from {
            query.push(" AND payment_date >= ").push_bind(from);
        }
        if let Some(to) = filter.to {
            query.push(" AND payment_date <= ").push_bind(to);
        }
        query.push(" ORDER BY payment_date DESC");

        let payments = query
            .build_query_as::<Payment>()
            .fetch_all(&self.pool)
            .await?;
        Ok(payments)
    }
}
