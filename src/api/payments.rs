use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;

use crate::api::{AppState, HandlerResult};
use crate::auth::{AuthError, Claims};
use crate::models::{CreatePayment, Payment};
use crate::services::PaymentQuery;

pub async fn list_payments(
    State(state): State<AppState>,
    WithRejection(claims, _): WithRejection<Claims, AuthError>,
    Query(query): Query<PaymentQuery>,
) -> HandlerResult<Json<Vec<Payment>>> {
    let payments = state
        .services
        .payments
        .list(claims.trainer_id()?, query)
        .await?;
    Ok(Json(payments))
}

pub async fn record_payment(
    State(state): State<AppState>,
    WithRejection(claims, _): WithRejection<Claims, AuthError>,
    Json(data): Json<CreatePayment>,
) -> HandlerResult<(StatusCode, Json<Payment>)> {
    let payment = state
        .services
        .payments
        .record(claims.trainer_id()?, data)
        .await?;
    Ok((StatusCode::CREATED, Json(payment)))
}
