use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use axum_extra::extract::WithRejection;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::{AppState, HandlerResult};
use crate::auth::{AuthError, Claims};
use crate::models::{
    CreateExercise, CreateWorkout, UpdateExercise, UpdateWorkout, Workout, WorkoutExercise,
    WorkoutStats,
};
use crate::services::{TransitionOutcome, WorkoutQuery};

#[derive(Debug, Deserialize)]
pub struct UpcomingQuery {
    pub days: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CompleteRequest {
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CancelRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DuplicateRequest {
    pub workout_date: DateTime<Utc>,
}

pub fn workout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_workouts).post(create_workout))
        .route("/today", get(today_workouts))
        .route("/upcoming", get(upcoming_workouts))
        .route("/stats", get(workout_stats))
        .route(
            "/:workout_id",
            get(get_workout).put(update_workout).delete(delete_workout),
        )
        .route("/:workout_id/complete", post(complete_workout))
        .route("/:workout_id/no-show", post(mark_no_show))
        .route("/:workout_id/cancel", post(cancel_workout))
        .route("/:workout_id/reopen", post(reopen_workout))
        .route("/:workout_id/duplicate", post(duplicate_workout))
        .route(
            "/:workout_id/exercises",
            get(list_exercises).post(add_exercises),
        )
}

pub fn exercise_routes() -> Router<AppState> {
    Router::new().route(
        "/:exercise_id",
        put(update_exercise).delete(delete_exercise),
    )
}

pub async fn list_workouts(
    State(state): State<AppState>,
    WithRejection(claims, _): WithRejection<Claims, AuthError>,
    Query(query): Query<WorkoutQuery>,
) -> HandlerResult<Json<Vec<Workout>>> {
    let workouts = state
        .services
        .workouts
        .list(claims.trainer_id()?, query)
        .await?;
    Ok(Json(workouts))
}

/// Manual entry by the trainer, not restricted to the slot grid
pub async fn create_workout(
    State(state): State<AppState>,
    WithRejection(claims, _): WithRejection<Claims, AuthError>,
    Json(data): Json<CreateWorkout>,
) -> HandlerResult<(StatusCode, Json<Workout>)> {
    let workout = state
        .services
        .bookings
        .create_workout(claims.trainer_id()?, data)
        .await?;
    Ok((StatusCode::CREATED, Json(workout)))
}

pub async fn today_workouts(
    State(state): State<AppState>,
    WithRejection(claims, _): WithRejection<Claims, AuthError>,
) -> HandlerResult<Json<Vec<Workout>>> {
    let workouts = state.services.workouts.today(claims.trainer_id()?).await?;
    Ok(Json(workouts))
}

pub async fn upcoming_workouts(
    State(state): State<AppState>,
    WithRejection(claims, _): WithRejection<Claims, AuthError>,
    Query(query): Query<UpcomingQuery>,
) -> HandlerResult<Json<Vec<Workout>>> {
    let workouts = state
        .services
        .workouts
        .upcoming(claims.trainer_id()?, query.days)
        .await?;
    Ok(Json(workouts))
}

pub async fn workout_stats(
    State(state): State<AppState>,
    WithRejection(claims, _): WithRejection<Claims, AuthError>,
    Query(query): Query<StatsQuery>,
) -> HandlerResult<Json<WorkoutStats>> {
    let stats = state
        .services
        .stats
        .workout_stats(claims.trainer_id()?, query.from, query.to)
        .await?;
    Ok(Json(stats))
}

pub async fn get_workout(
    State(state): State<AppState>,
    WithRejection(claims, _): WithRejection<Claims, AuthError>,
    Path(workout_id): Path<Uuid>,
) -> HandlerResult<Json<Workout>> {
    let workout = state
        .services
        .workouts
        .get(claims.trainer_id()?, workout_id)
        .await?;
    Ok(Json(workout))
}

pub async fn update_workout(
    State(state): State<AppState>,
    WithRejection(claims, _): WithRejection<Claims, AuthError>,
    Path(workout_id): Path<Uuid>,
    Json(data): Json<UpdateWorkout>,
) -> HandlerResult<Json<Workout>> {
    let workout = state
        .services
        .workouts
        .update(claims.trainer_id()?, workout_id, data)
        .await?;
    Ok(Json(workout))
}

pub async fn delete_workout(
    State(state): State<AppState>,
    WithRejection(claims, _): WithRejection<Claims, AuthError>,
    Path(workout_id): Path<Uuid>,
) -> HandlerResult<StatusCode> {
    state
        .services
        .workouts
        .delete(claims.trainer_id()?, workout_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// The transition bodies are optional; an absent or unreadable body means no note.

pub async fn complete_workout(
    State(state): State<AppState>,
    WithRejection(claims, _): WithRejection<Claims, AuthError>,
    Path(workout_id): Path<Uuid>,
    body: Option<Json<CompleteRequest>>,
) -> HandlerResult<Json<TransitionOutcome>> {
    let request = body.map(|Json(request)| request).unwrap_or_default();
    let outcome = state
        .services
        .workouts
        .complete(claims.trainer_id()?, workout_id, request.notes)
        .await?;
    Ok(Json(outcome))
}

pub async fn mark_no_show(
    State(state): State<AppState>,
    WithRejection(claims, _): WithRejection<Claims, AuthError>,
    Path(workout_id): Path<Uuid>,
) -> HandlerResult<Json<TransitionOutcome>> {
    let outcome = state
        .services
        .workouts
        .mark_no_show(claims.trainer_id()?, workout_id)
        .await?;
    Ok(Json(outcome))
}

pub async fn cancel_workout(
    State(state): State<AppState>,
    WithRejection(claims, _): WithRejection<Claims, AuthError>,
    Path(workout_id): Path<Uuid>,
    body: Option<Json<CancelRequest>>,
) -> HandlerResult<Json<TransitionOutcome>> {
    let request = body.map(|Json(request)| request).unwrap_or_default();
    let outcome = state
        .services
        .workouts
        .cancel(claims.trainer_id()?, workout_id, request.reason)
        .await?;
    Ok(Json(outcome))
}

pub async fn reopen_workout(
    State(state): State<AppState>,
    WithRejection(claims, _): WithRejection<Claims, AuthError>,
    Path(workout_id): Path<Uuid>,
) -> HandlerResult<Json<TransitionOutcome>> {
    let outcome = state
        .services
        .workouts
        .reopen(claims.trainer_id()?, workout_id)
        .await?;
    Ok(Json(outcome))
}

pub async fn duplicate_workout(
    State(state): State<AppState>,
    WithRejection(claims, _): WithRejection<Claims, AuthError>,
    Path(workout_id): Path<Uuid>,
    Json(request): Json<DuplicateRequest>,
) -> HandlerResult<(StatusCode, Json<Workout>)> {
    let workout = state
        .services
        .workouts
        .duplicate(claims.trainer_id()?, workout_id, request.workout_date)
        .await?;
    Ok((StatusCode::CREATED, Json(workout)))
}

pub async fn list_exercises(
    State(state): State<AppState>,
    WithRejection(claims, _): WithRejection<Claims, AuthError>,
    Path(workout_id): Path<Uuid>,
) -> HandlerResult<Json<Vec<WorkoutExercise>>> {
    let exercises = state
        .services
        .workouts
        .list_exercises(claims.trainer_id()?, workout_id)
        .await?;
    Ok(Json(exercises))
}

pub async fn add_exercises(
    State(state): State<AppState>,
    WithRejection(claims, _): WithRejection<Claims, AuthError>,
    Path(workout_id): Path<Uuid>,
    Json(exercises): Json<Vec<CreateExercise>>,
) -> HandlerResult<(StatusCode, Json<Vec<WorkoutExercise>>)> {
    let exercises = state
        .services
        .workouts
        .add_exercises(claims.trainer_id()?, workout_id, exercises)
        .await?;
    Ok((StatusCode::CREATED, Json(exercises)))
}

pub async fn update_exercise(
    State(state): State<AppState>,
    WithRejection(claims, _): WithRejection<Claims, AuthError>,
    Path(exercise_id): Path<Uuid>,
    Json(data): Json<UpdateExercise>,
) -> HandlerResult<Json<WorkoutExercise>> {
    let exercise = state
        .services
        .workouts
        .update_exercise(claims.trainer_id()?, exercise_id, data)
        .await?;
    Ok(Json(exercise))
}

pub async fn delete_exercise(
    State(state): State<AppState>,
    WithRejection(claims, _): WithRejection<Claims, AuthError>,
    Path(exercise_id): Path<Uuid>,
) -> HandlerResult<StatusCode> {
    state
        .services
        .workouts
        .delete_exercise(claims.trainer_id()?, exercise_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
