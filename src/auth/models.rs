use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthError;

/// JWT token claims. The subject is the trainer id; every request acts on
/// behalf of that trainer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,              // Subject (trainer ID)
    pub telegram_id: Option<i64>, // Chat identity of the trainer
    pub exp: usize,               // Expiration time
    pub iat: usize,               // Issued at
    pub jti: String,              // JWT ID
}

impl Claims {
    pub fn trainer_id(&self) -> Result<Uuid, AuthError> {
        Uuid::parse_str(&self.sub).map_err(|_| AuthError::InvalidToken)
    }
}

/// Token handed out on trainer registration.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: usize,
}
