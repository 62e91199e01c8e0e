use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::bookings::{book_slot, get_availability};
use super::clients::client_routes;
use super::health::health_check;
use super::payments::{list_payments, record_payment};
use super::trainers::trainer_routes;
use super::workouts::{exercise_routes, workout_routes};
use super::AppState;

pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

pub fn create_routes(state: AppState) -> Router {
    let api = Router::new()
        .nest("/trainers", trainer_routes())
        .nest("/clients", client_routes())
        .nest("/workouts", workout_routes())
        .nest("/exercises", exercise_routes())
        .route("/availability", get(get_availability))
        .route("/bookings", post(book_slot))
        .route("/payments", get(list_payments).post(record_payment));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(state)
}
