use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::{text_column, UnknownVariant, DEFAULT_SESSION_MINUTES};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutStatus {
    #[default]
    Scheduled,
    Completed,
    Cancelled,
    NoShow,
}

impl WorkoutStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkoutStatus::Scheduled => "scheduled",
            WorkoutStatus::Completed => "completed",
            WorkoutStatus::Cancelled => "cancelled",
            WorkoutStatus::NoShow => "no_show",
        }
    }

    /// Completed and no-show both use up a subscription session: the
    /// time was reserved whether or not the client turned up.
    pub fn consumes_session(&self) -> bool {
        matches!(self, WorkoutStatus::Completed | WorkoutStatus::NoShow)
    }

    pub fn can_transition_to(&self, next: WorkoutStatus) -> bool {
        use WorkoutStatus::*;
        match (self, next) {
            (Scheduled, Completed) | (Scheduled, NoShow) | (Scheduled, Cancelled) => true,
            (Completed, Scheduled) | (NoShow, Scheduled) | (Cancelled, Scheduled) => true,
            _ => false,
        }
    }
}

impl fmt::Display for WorkoutStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkoutStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(WorkoutStatus::Scheduled),
            "completed" => Ok(WorkoutStatus::Completed),
            "cancelled" => Ok(WorkoutStatus::Cancelled),
            "no_show" => Ok(WorkoutStatus::NoShow),
            other => Err(UnknownVariant {
                kind: "workout status",
                value: other.to_string(),
            }),
        }
    }
}

text_column!(WorkoutStatus);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Workout {
    pub id: Uuid,
    pub trainer_id: Uuid,
    pub client_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub workout_date: DateTime<Utc>,
    /// Minutes.
    pub duration: i32,
    pub status: WorkoutStatus,
    pub workout_type: Option<String>,
    pub location: Option<String>,
    /// Minor currency units.
    pub price: Option<i64>,
    pub notes: Option<String>,
    /// Set once this workout has used up one of the client's sessions.
    pub session_consumed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Workout {
    pub fn ends_at(&self) -> DateTime<Utc> {
        self.workout_date + Duration::minutes(i64::from(self.duration))
    }

    /// Half-open `[start, end)` overlap against another time range.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.workout_date < end && self.ends_at() > start
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWorkout {
    pub client_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub workout_date: DateTime<Utc>,
    pub duration: Option<i32>,
    pub status: Option<WorkoutStatus>,
    pub workout_type: Option<String>,
    pub location: Option<String>,
    pub price: Option<i64>,
    pub notes: Option<String>,
}

impl CreateWorkout {
    pub fn effective_duration(&self) -> i32 {
        self.duration.unwrap_or(DEFAULT_SESSION_MINUTES)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateWorkout {
    pub title: Option<String>,
    pub description: Option<String>,
    pub workout_date: Option<DateTime<Utc>>,
    pub duration: Option<i32>,
    pub workout_type: Option<String>,
    pub location: Option<String>,
    pub price: Option<i64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct WorkoutExercise {
    pub id: Uuid,
    pub workout_id: Uuid,
    pub exercise_name: String,
    pub sets: Option<i32>,
    /// Free text, e.g. "10-12" or "to failure".
    pub reps: Option<String>,
    pub weight: Option<f64>,
    /// Seconds.
    pub rest_time: Option<i32>,
    pub notes: Option<String>,
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateExercise {
    pub exercise_name: String,
    pub sets: Option<i32>,
    pub reps: Option<String>,
    pub weight: Option<f64>,
    pub rest_time: Option<i32>,
    pub notes: Option<String>,
    pub order_index: Option<i32>,
}

impl From<&WorkoutExercise> for CreateExercise {
    fn from(exercise: &WorkoutExercise) -> Self {
        Self {
            exercise_name: exercise.exercise_name.clone(),
            sets: exercise.sets,
            reps: exercise.reps.clone(),
            weight: exercise.weight,
            rest_time: exercise.rest_time,
            notes: exercise.notes.clone(),
            order_index: Some(exercise.order_index),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateExercise {
    pub exercise_name: Option<String>,
    pub sets: Option<i32>,
    pub reps: Option<String>,
    pub weight: Option<f64>,
    pub rest_time: Option<i32>,
    pub notes: Option<String>,
    pub order_index: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct WorkoutStats {
    pub total_workouts: i64,
    pub completed_workouts: i64,
    pub cancelled_workouts: i64,
    pub no_show_workouts: i64,
    pub completion_rate: i64,
    pub cancellation_rate: i64,
    pub no_show_rate: i64,
    pub total_revenue: i64,
    pub average_price: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TrainerStats {
    pub total_clients: i64,
    pub active_clients: i64,
    pub monthly_workouts: i64,
    pub completed_workouts: i64,
    pub monthly_revenue: i64,
    pub average_payment: f64,
    pub completion_rate: i64,
}
