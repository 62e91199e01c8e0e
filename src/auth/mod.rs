// Bearer JWT authentication of trainers

pub mod errors;
pub mod extractor;
pub mod jwt;
pub mod models;

pub use errors::AuthError;
pub use jwt::JwtService;
pub use models::{Claims, TokenResponse};
