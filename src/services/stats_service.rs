use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc};
use uuid::Uuid;

use crate::models::{ClientStats, TrainerStats, Workout, WorkoutStats, WorkoutStatus};
use crate::services::error::missing;
use crate::services::{ServiceError, ServiceResult};
use crate::store::{ClientFilter, PaymentFilter, RecordStore, SortOrder, WorkoutFilter};

/// Whole-number percentage of `part` in `total`, zero for an empty total.
pub fn percent(part: i64, total: i64) -> i64 {
    if total <= 0 {
        return 0;
    }
    ((part as f64 / total as f64) * 100.0).round() as i64
}

fn count(workouts: &[Workout], status: WorkoutStatus) -> i64 {
    workouts.iter().filter(|w| w.status == status).count() as i64
}

/// Aggregates over workouts of a date range. Revenue counts completed and
/// no-show workouts alike.
pub fn summarize_workouts(workouts: &[Workout]) -> WorkoutStats {
    let total = workouts.len() as i64;
    let completed = count(workouts, WorkoutStatus::Completed);
    let cancelled = count(workouts, WorkoutStatus::Cancelled);
    let no_show = count(workouts, WorkoutStatus::NoShow);

    let billable: Vec<i64> = workouts
        .iter()
        .filter(|w| w.status.consumes_session())
        .map(|w| w.price.unwrap_or(0))
        .collect();
    let total_revenue: i64 = billable.iter().sum();

    WorkoutStats {
        total_workouts: total,
        completed_workouts: completed,
        cancelled_workouts: cancelled,
        no_show_workouts: no_show,
        completion_rate: percent(completed, total),
        cancellation_rate: percent(cancelled, total),
        no_show_rate: percent(no_show, total),
        total_revenue,
        average_price: if billable.is_empty() {
            0.0
        } else {
            total_revenue as f64 / billable.len() as f64
        },
    }
}

fn month_start(today: NaiveDate) -> NaiveDate {
    today.with_day(1).unwrap_or(today)
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::default()))
}

#[derive(Clone)]
pub struct StatsService {
    store: RecordStore,
}

impl StatsService {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }

    /// Workout statistics between two dates, inclusive. Defaults to the
    /// current month up to today.
    pub async fn workout_stats(
        &self,
        trainer_id: Uuid,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> ServiceResult<WorkoutStats> {
        let today = Utc::now().date_naive();
        let from = from.unwrap_or_else(|| month_start(today));
        let to = to.unwrap_or(today);
        if from > to {
            return Err(ServiceError::InvalidRequest(
                "Start date must not be after end date".to_string(),
            ));
        }

        let end = start_of_day(to) + chrono::Duration::days(1) - chrono::Duration::seconds(1);
        let filter = WorkoutFilter::for_trainer(trainer_id).between(Some(start_of_day(from)), Some(end));
        let workouts = self.store.workouts.query_workouts(filter).await?;

        Ok(summarize_workouts(&workouts))
    }

    /// Dashboard figures for the current month.
    pub async fn trainer_stats(&self, trainer_id: Uuid) -> ServiceResult<TrainerStats> {
        self.store
            .trainers
            .get_trainer(trainer_id)
            .await
            .map_err(missing("Trainer"))?;

        let clients = self
            .store
            .clients
            .query_clients(ClientFilter::for_trainer(trainer_id))
            .await?;
        let active_clients = clients.iter().filter(|c| c.is_active).count() as i64;

        let first_day = month_start(Utc::now().date_naive());
        let workouts = self
            .store
            .workouts
            .query_workouts(
                WorkoutFilter::for_trainer(trainer_id).between(Some(start_of_day(first_day)), None),
            )
            .await?;
        let monthly_workouts = workouts.len() as i64;
        let completed_workouts = count(&workouts, WorkoutStatus::Completed);

        let payments = self
            .store
            .payments
            .query_payments(PaymentFilter {
                trainer_id: Some(trainer_id),
                from: Some(first_day),
                ..Default::default()
            })
            .await?;
        let monthly_revenue: i64 = payments.iter().map(|p| p.amount).sum();

        Ok(TrainerStats {
            total_clients: clients.len() as i64,
            active_clients,
            monthly_workouts,
            completed_workouts,
            monthly_revenue,
            average_payment: if payments.is_empty() {
                0.0
            } else {
                monthly_revenue as f64 / payments.len() as f64
            },
            completion_rate: percent(completed_workouts, monthly_workouts),
        })
    }

    /// Attendance and weight progress of one client of the trainer.
    pub async fn client_stats(&self, trainer_id: Uuid, client_id: Uuid) -> ServiceResult<ClientStats> {
        let client = self
            .store
            .clients
            .get_client(client_id)
            .await
            .map_err(missing("Client"))?;
        if client.trainer_id != trainer_id {
            return Err(ServiceError::NotFound("Client"));
        }

        let workouts = self
            .store
            .workouts
            .query_workouts(WorkoutFilter::for_client(client_id))
            .await?;
        let total_workouts = workouts.len() as i64;
        let completed_workouts = count(&workouts, WorkoutStatus::Completed);

        let measurements = self
            .store
            .measurements
            .list_measurements(client_id, SortOrder::Ascending, None)
            .await?;
        let first = measurements.first().and_then(|m| m.weight);
        let latest = measurements.last().and_then(|m| m.weight);
        let weight_progress = match (first, latest) {
            (Some(first), Some(latest)) => latest - first,
            _ => 0.0,
        };

        Ok(ClientStats {
            total_workouts,
            completed_workouts,
            attendance_rate: percent(completed_workouts, total_workouts),
            weight_progress,
            latest_weight: latest,
            measurements_count: self.store.measurements.count_measurements(client_id).await?,
        })
    }
}
