use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::api::{AppState, HandlerResult};
use crate::auth::{AuthError, Claims};
use crate::models::{BookableSlot, Workout};
use crate::services::BookSlot;

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    /// Local date in the trainer's timezone
    pub date: NaiveDate,
    /// Minutes; the trainer's default session length when omitted
    pub duration: Option<i64>,
}

/// Free slots of the authenticated trainer on one date
pub async fn get_availability(
    State(state): State<AppState>,
    WithRejection(claims, _): WithRejection<Claims, AuthError>,
    Query(query): Query<AvailabilityQuery>,
) -> HandlerResult<Json<Vec<BookableSlot>>> {
    let slots = state
        .services
        .availability
        .available_slots(claims.trainer_id()?, query.date, query.duration)
        .await?;
    Ok(Json(slots))
}

pub async fn book_slot(
    State(state): State<AppState>,
    WithRejection(claims, _): WithRejection<Claims, AuthError>,
    Json(request): Json<BookSlot>,
) -> HandlerResult<(StatusCode, Json<Workout>)> {
    let workout = state
        .services
        .bookings
        .book_slot(claims.trainer_id()?, request)
        .await?;
    Ok((StatusCode::CREATED, Json(workout)))
}
