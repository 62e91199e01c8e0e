use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use axum_extra::extract::WithRejection;
use serde::Serialize;
use tracing::info;

use crate::api::{AppState, HandlerResult};
use crate::auth::{AuthError, Claims, TokenResponse};
use crate::models::{
    CreateTrainer, Trainer, TrainerSettings, TrainerStats, UpdateTrainer, UpdateTrainerSettings,
};

#[derive(Debug, Serialize)]
pub struct RegistrationResponse {
    pub trainer: Trainer,
    pub token: TokenResponse,
}

pub fn trainer_routes() -> Router<AppState> {
    Router::new()
        .route("/", axum::routing::post(register_trainer))
        .route("/me", get(get_me).put(update_me))
        .route("/me/settings", get(get_settings).put(update_settings))
        .route("/me/stats", get(get_stats))
}

/// Register a trainer and hand out the token the trainer acts with
pub async fn register_trainer(
    State(state): State<AppState>,
    Json(data): Json<CreateTrainer>,
) -> HandlerResult<(StatusCode, Json<RegistrationResponse>)> {
    let trainer = state.services.trainers.register(data).await?;
    let token = state.jwt.issue(trainer.id, Some(trainer.telegram_id))?;

    info!("Issued access token for trainer {}", trainer.id);
    Ok((StatusCode::CREATED, Json(RegistrationResponse { trainer, token })))
}

pub async fn get_me(
    State(state): State<AppState>,
    WithRejection(claims, _): WithRejection<Claims, AuthError>,
) -> HandlerResult<Json<Trainer>> {
    let trainer = state.services.trainers.get(claims.trainer_id()?).await?;
    Ok(Json(trainer))
}

pub async fn update_me(
    State(state): State<AppState>,
    WithRejection(claims, _): WithRejection<Claims, AuthError>,
    Json(data): Json<UpdateTrainer>,
) -> HandlerResult<Json<Trainer>> {
    let trainer = state
        .services
        .trainers
        .update(claims.trainer_id()?, data)
        .await?;
    Ok(Json(trainer))
}

pub async fn get_settings(
    State(state): State<AppState>,
    WithRejection(claims, _): WithRejection<Claims, AuthError>,
) -> HandlerResult<Json<TrainerSettings>> {
    let settings = state
        .services
        .trainers
        .get_settings(claims.trainer_id()?)
        .await?;
    Ok(Json(settings))
}

pub async fn update_settings(
    State(state): State<AppState>,
    WithRejection(claims, _): WithRejection<Claims, AuthError>,
    Json(update): Json<UpdateTrainerSettings>,
) -> HandlerResult<Json<TrainerSettings>> {
    let settings = state
        .services
        .trainers
        .update_settings(claims.trainer_id()?, update)
        .await?;
    Ok(Json(settings))
}

pub async fn get_stats(
    State(state): State<AppState>,
    WithRejection(claims, _): WithRejection<Claims, AuthError>,
) -> HandlerResult<Json<TrainerStats>> {
    let stats = state
        .services
        .stats
        .trainer_stats(claims.trainer_id()?)
        .await?;
    Ok(Json(stats))
}
