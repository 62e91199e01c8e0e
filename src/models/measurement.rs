use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Body measurements in kilograms, centimetres and percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Measurement {
    pub id: Uuid,
    pub client_id: Uuid,
    pub measurement_date: NaiveDate,
    pub weight: Option<f64>,
    pub body_fat_percentage: Option<f64>,
    pub muscle_mass: Option<f64>,
    pub chest: Option<f64>,
    pub waist: Option<f64>,
    pub hips: Option<f64>,
    pub bicep: Option<f64>,
    pub thigh: Option<f64>,
    pub neck: Option<f64>,
    pub notes: Option<String>,
    pub photo_urls: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateMeasurement {
    /// Defaults to today when omitted.
    pub measurement_date: Option<NaiveDate>,
    pub weight: Option<f64>,
    pub body_fat_percentage: Option<f64>,
    pub muscle_mass: Option<f64>,
    pub chest: Option<f64>,
    pub waist: Option<f64>,
    pub hips: Option<f64>,
    pub bicep: Option<f64>,
    pub thigh: Option<f64>,
    pub neck: Option<f64>,
    pub notes: Option<String>,
    #[serde(default)]
    pub photo_urls: Vec<String>,
}
