use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Client {
    pub id: Uuid,
    pub trainer_id: Uuid,
    pub telegram_id: Option<i64>,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<String>,
    pub height_cm: Option<i32>,
    pub initial_weight: Option<f64>,
    pub current_weight: Option<f64>,
    pub target_weight: Option<f64>,
    pub goal: Option<String>,
    pub medical_notes: Option<String>,
    pub emergency_contact: Option<String>,
    pub subscription_type: Option<String>,
    pub subscription_start: Option<NaiveDate>,
    pub subscription_end: Option<NaiveDate>,
    pub sessions_total: i32,
    pub sessions_used: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Client {
    pub fn full_name(&self) -> String {
        match &self.last_name {
            Some(last) if !last.is_empty() => format!("{} {}", self.first_name, last),
            _ => self.first_name.clone(),
        }
    }

    pub fn sessions_remaining(&self) -> i32 {
        (self.sessions_total - self.sessions_used).max(0)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateClient {
    pub telegram_id: Option<i64>,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<String>,
    pub height_cm: Option<i32>,
    pub initial_weight: Option<f64>,
    pub current_weight: Option<f64>,
    pub target_weight: Option<f64>,
    pub goal: Option<String>,
    pub medical_notes: Option<String>,
    pub emergency_contact: Option<String>,
    pub subscription_type: Option<String>,
    pub subscription_start: Option<NaiveDate>,
    pub subscription_end: Option<NaiveDate>,
    pub sessions_total: Option<i32>,
    pub sessions_used: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateClient {
    pub telegram_id: Option<i64>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<String>,
    pub height_cm: Option<i32>,
    pub current_weight: Option<f64>,
    pub target_weight: Option<f64>,
    pub goal: Option<String>,
    pub medical_notes: Option<String>,
    pub emergency_contact: Option<String>,
    pub subscription_type: Option<String>,
    pub subscription_start: Option<NaiveDate>,
    pub subscription_end: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClientStats {
    pub total_workouts: i64,
    pub completed_workouts: i64,
    pub attendance_rate: i64,
    pub weight_progress: f64,
    pub latest_weight: Option<f64>,
    pub measurements_count: i64,
}
