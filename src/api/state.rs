use axum::extract::FromRef;

use crate::auth::JwtService;
use crate::services::Services;

#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    pub jwt: JwtService,
}

impl AppState {
    pub fn new(services: Services, jwt: JwtService) -> Self {
        Self { services, jwt }
    }
}

impl FromRef<AppState> for JwtService {
    fn from_ref(state: &AppState) -> Self {
        state.jwt.clone()
    }
}
