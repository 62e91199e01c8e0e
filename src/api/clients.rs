use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::{AppState, HandlerResult};
use crate::auth::{AuthError, Claims};
use crate::models::{
    Client, ClientStats, CreateClient, CreateMeasurement, Measurement, UpdateClient, Workout,
};
use crate::services::ExtendSubscription;

#[derive(Debug, Deserialize)]
pub struct ListClientsQuery {
    /// Only active clients (default: true)
    pub active_only: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct ExpiringQuery {
    pub days: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct AddSessionsRequest {
    pub sessions: i32,
}

pub fn client_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_clients).post(create_client))
        .route("/search", get(search_clients))
        .route("/expiring", get(expiring_clients))
        .route("/telegram/:telegram_id", get(get_client_by_telegram_id))
        .route(
            "/:client_id",
            get(get_client).put(update_client).delete(deactivate_client),
        )
        .route("/:client_id/activate", post(activate_client))
        .route("/:client_id/sessions", post(add_sessions))
        .route("/:client_id/subscription", post(extend_subscription))
        .route(
            "/:client_id/measurements",
            get(list_measurements).post(add_measurement),
        )
        .route("/:client_id/stats", get(client_stats))
        .route("/:client_id/workouts", get(client_workouts))
}

pub async fn list_clients(
    State(state): State<AppState>,
    WithRejection(claims, _): WithRejection<Claims, AuthError>,
    Query(query): Query<ListClientsQuery>,
) -> HandlerResult<Json<Vec<Client>>> {
    let clients = state
        .services
        .clients
        .list(claims.trainer_id()?, query.active_only.unwrap_or(true))
        .await?;
    Ok(Json(clients))
}

pub async fn create_client(
    State(state): State<AppState>,
    WithRejection(claims, _): WithRejection<Claims, AuthError>,
    Json(data): Json<CreateClient>,
) -> HandlerResult<(StatusCode, Json<Client>)> {
    let client = state
        .services
        .clients
        .create(claims.trainer_id()?, data)
        .await?;
    Ok((StatusCode::CREATED, Json(client)))
}

pub async fn search_clients(
    State(state): State<AppState>,
    WithRejection(claims, _): WithRejection<Claims, AuthError>,
    Query(query): Query<SearchQuery>,
) -> HandlerResult<Json<Vec<Client>>> {
    let clients = state
        .services
        .clients
        .search(claims.trainer_id()?, &query.q)
        .await?;
    Ok(Json(clients))
}

pub async fn expiring_clients(
    State(state): State<AppState>,
    WithRejection(claims, _): WithRejection<Claims, AuthError>,
    Query(query): Query<ExpiringQuery>,
) -> HandlerResult<Json<Vec<Client>>> {
    let clients = state
        .services
        .clients
        .expiring_subscriptions(claims.trainer_id()?, query.days)
        .await?;
    Ok(Json(clients))
}

pub async fn get_client(
    State(state): State<AppState>,
    WithRejection(claims, _): WithRejection<Claims, AuthError>,
    Path(client_id): Path<Uuid>,
) -> HandlerResult<Json<Client>> {
    let client = state
        .services
        .clients
        .get(claims.trainer_id()?, client_id)
        .await?;
    Ok(Json(client))
}

pub async fn get_client_by_telegram_id(
    State(state): State<AppState>,
    WithRejection(claims, _): WithRejection<Claims, AuthError>,
    Path(telegram_id): Path<i64>,
) -> HandlerResult<Json<Client>> {
    let client = state
        .services
        .clients
        .get_by_telegram_id(claims.trainer_id()?, telegram_id)
        .await?;
    Ok(Json(client))
}

pub async fn update_client(
    State(state): State<AppState>,
    WithRejection(claims, _): WithRejection<Claims, AuthError>,
    Path(client_id): Path<Uuid>,
    Json(data): Json<UpdateClient>,
) -> HandlerResult<Json<Client>> {
    let client = state
        .services
        .clients
        .update(claims.trainer_id()?, client_id, data)
        .await?;
    Ok(Json(client))
}

/// Soft delete: the client is deactivated, history is kept
pub async fn deactivate_client(
    State(state): State<AppState>,
    WithRejection(claims, _): WithRejection<Claims, AuthError>,
    Path(client_id): Path<Uuid>,
) -> HandlerResult<Json<Client>> {
    let client = state
        .services
        .clients
        .set_active(claims.trainer_id()?, client_id, false)
        .await?;
    Ok(Json(client))
}

pub async fn activate_client(
    State(state): State<AppState>,
    WithRejection(claims, _): WithRejection<Claims, AuthError>,
    Path(client_id): Path<Uuid>,
) -> HandlerResult<Json<Client>> {
    let client = state
        .services
        .clients
        .set_active(claims.trainer_id()?, client_id, true)
        .await?;
    Ok(Json(client))
}

pub async fn add_sessions(
    State(state): State<AppState>,
    WithRejection(claims, _): WithRejection<Claims, AuthError>,
    Path(client_id): Path<Uuid>,
    Json(request): Json<AddSessionsRequest>,
) -> HandlerResult<Json<Client>> {
    let client = state
        .services
        .clients
        .add_sessions(claims.trainer_id()?, client_id, request.sessions)
        .await?;
    Ok(Json(client))
}

pub async fn extend_subscription(
    State(state): State<AppState>,
    WithRejection(claims, _): WithRejection<Claims, AuthError>,
    Path(client_id): Path<Uuid>,
    Json(extension): Json<ExtendSubscription>,
) -> HandlerResult<Json<Client>> {
    let client = state
        .services
        .clients
        .extend_subscription(claims.trainer_id()?, client_id, extension)
        .await?;
    Ok(Json(client))
}

pub async fn list_measurements(
    State(state): State<AppState>,
    WithRejection(claims, _): WithRejection<Claims, AuthError>,
    Path(client_id): Path<Uuid>,
    Query(query): Query<LimitQuery>,
) -> HandlerResult<Json<Vec<Measurement>>> {
    let measurements = state
        .services
        .clients
        .list_measurements(claims.trainer_id()?, client_id, query.limit)
        .await?;
    Ok(Json(measurements))
}

pub async fn add_measurement(
    State(state): State<AppState>,
    WithRejection(claims, _): WithRejection<Claims, AuthError>,
    Path(client_id): Path<Uuid>,
    Json(data): Json<CreateMeasurement>,
) -> HandlerResult<(StatusCode, Json<Measurement>)> {
    let measurement = state
        .services
        .clients
        .add_measurement(claims.trainer_id()?, client_id, data)
        .await?;
    Ok((StatusCode::CREATED, Json(measurement)))
}

pub async fn client_stats(
    State(state): State<AppState>,
    WithRejection(claims, _): WithRejection<Claims, AuthError>,
    Path(client_id): Path<Uuid>,
) -> HandlerResult<Json<ClientStats>> {
    let stats = state
        .services
        .stats
        .client_stats(claims.trainer_id()?, client_id)
        .await?;
    Ok(Json(stats))
}

/// Most recent workouts of the client, newest first
pub async fn client_workouts(
    State(state): State<AppState>,
    WithRejection(claims, _): WithRejection<Claims, AuthError>,
    Path(client_id): Path<Uuid>,
    Query(query): Query<LimitQuery>,
) -> HandlerResult<Json<Vec<Workout>>> {
    let workouts = state
        .services
        .workouts
        .client_history(claims.trainer_id()?, client_id, query.limit)
        .await?;
    Ok(Json(workouts))
}
