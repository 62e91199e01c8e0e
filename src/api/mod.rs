// API routes and handlers

pub mod bookings;
pub mod clients;
pub mod error;
pub mod health;
pub mod payments;
pub mod routes;
pub mod state;
pub mod trainers;
pub mod workouts;

pub use error::{ApiError, HandlerError, HandlerResult};
pub use routes::create_routes;
pub use state::AppState;
