use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::api::ApiError;
use crate::models::WorkoutStatus;
use crate::services::availability_engine::AvailabilityError;
use crate::services::session_accounting::AccountingError;
use crate::store::StoreError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServiceError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Client has used all {total} sessions of the subscription")]
    SessionsExhausted { used: i32, total: i32 },
    #[error("slot no longer available, please pick another")]
    SlotConflict,
    #[error("Workout cannot move from {from} to {to}")]
    InvalidTransition {
        from: WorkoutStatus,
        to: WorkoutStatus,
    },
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("Store error: {0}")]
    Store(String),
}

impl ServiceError {
    /// Wraps a validator failure from `models::validation`.
    pub fn validation(err: anyhow::Error) -> Self {
        ServiceError::Validation(err.to_string())
    }
}

/// Maps a store error, naming the record kind on `NotFound`.
pub fn missing(kind: &'static str) -> impl Fn(StoreError) -> ServiceError {
    move |err| match err {
        StoreError::NotFound => ServiceError::NotFound(kind),
        other => other.into(),
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ServiceError::NotFound("Record"),
            StoreError::SlotConflict => ServiceError::SlotConflict,
            StoreError::Duplicate => ServiceError::Conflict("record already exists".to_string()),
            StoreError::StaleRecord => {
                ServiceError::Conflict("record was modified concurrently, please retry".to_string())
            }
            StoreError::Unavailable(reason) => ServiceError::StoreUnavailable(reason),
            StoreError::Database(reason) => ServiceError::Store(reason),
        }
    }
}

impl From<AvailabilityError> for ServiceError {
    fn from(err: AvailabilityError) -> Self {
        match err {
            AvailabilityError::InvalidConfiguration(reason) => {
                ServiceError::InvalidConfiguration(reason)
            }
            AvailabilityError::InvalidRequest(reason) => ServiceError::InvalidRequest(reason),
        }
    }
}

impl From<AccountingError> for ServiceError {
    fn from(err: AccountingError) -> Self {
        match err {
            AccountingError::SessionsExhausted { used, total } => {
                ServiceError::SessionsExhausted { used, total }
            }
            other => ServiceError::InvalidRequest(other.to_string()),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ServiceError::InvalidConfiguration(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_CONFIGURATION")
            }
            ServiceError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
            ServiceError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ServiceError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ServiceError::SessionsExhausted { .. } => (StatusCode::CONFLICT, "SESSIONS_EXHAUSTED"),
            ServiceError::SlotConflict => (StatusCode::CONFLICT, "SLOT_CONFLICT"),
            ServiceError::InvalidTransition { .. } => (StatusCode::CONFLICT, "INVALID_TRANSITION"),
            ServiceError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            ServiceError::StoreUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE")
            }
            ServiceError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let error = match &self {
            ServiceError::StoreUnavailable(reason) => {
                tracing::error!("Store unavailable: {}", reason);
                ApiError::new(code, "Service temporarily unavailable, please try again shortly")
            }
            ServiceError::Store(reason) => {
                tracing::error!("Store error: {}", reason);
                ApiError::new(code, "Internal server error")
            }
            ServiceError::SessionsExhausted { used, total } => ApiError::with_details(
                code,
                &self.to_string(),
                json!({ "sessions_used": used, "sessions_total": total }),
            ),
            ServiceError::InvalidTransition { from, to } => ApiError::with_details(
                code,
                &self.to_string(),
                json!({ "from": from, "to": to }),
            ),
            _ => ApiError::new(code, &self.to_string()),
        };

        (status, Json(error)).into_response()
    }
}
