// Shared fixtures for the integration tests
#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, Response, StatusCode},
    Router,
};
use chrono::{Datelike, Duration, NaiveDate, Utc, Weekday};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use trainer_hub::api::{create_routes, AppState};
use trainer_hub::auth::JwtService;
use trainer_hub::models::*;
use trainer_hub::services::{AvailabilityEngine, Services};
use trainer_hub::store::RecordStore;

pub const TEST_JWT_SECRET: &str = "test_secret_key_for_testing_only";

/// Builders for realistic request payloads
pub struct MockDataGenerator;

impl MockDataGenerator {
    pub fn trainer(telegram_id: i64) -> CreateTrainer {
        CreateTrainer {
            telegram_id,
            first_name: Some("Elena".to_string()),
            last_name: Some("Sokolova".to_string()),
            email: Some(format!("trainer{}@example.com", telegram_id)),
            timezone: Some("UTC".to_string()),
            ..Default::default()
        }
    }

    pub fn client(first_name: &str, sessions_total: i32) -> CreateClient {
        CreateClient {
            first_name: first_name.to_string(),
            last_name: Some("Ivanov".to_string()),
            initial_weight: Some(82.5),
            subscription_type: Some(format!("{} sessions", sessions_total)),
            sessions_total: Some(sessions_total),
            ..Default::default()
        }
    }

    pub fn exercise(name: &str, order_index: i32) -> CreateExercise {
        CreateExercise {
            exercise_name: name.to_string(),
            sets: Some(3),
            reps: Some("10".to_string()),
            order_index: Some(order_index),
            ..Default::default()
        }
    }
}

/// First `weekday` at least two days from now, so the whole local day lies
/// in the future for any test timezone.
pub fn next_weekday(weekday: Weekday) -> NaiveDate {
    let mut date = Utc::now().date_naive() + Duration::days(2);
    while date.weekday() != weekday {
        date += Duration::days(1);
    }
    date
}

/// In-memory services with one registered trainer
pub struct TestContext {
    pub store: RecordStore,
    pub services: Services,
    pub trainer: Trainer,
}

impl TestContext {
    pub async fn new() -> Self {
        let store = RecordStore::in_memory();
        let services = Services::new(store.clone(), AvailabilityEngine::default());
        let trainer = services
            .trainers
            .register(MockDataGenerator::trainer(1001))
            .await
            .unwrap();

        Self {
            store,
            services,
            trainer,
        }
    }

    pub async fn client(&self, first_name: &str, sessions_total: i32) -> Client {
        self.services
            .clients
            .create(self.trainer.id, MockDataGenerator::client(first_name, sessions_total))
            .await
            .unwrap()
    }
}

/// Router over the in-memory store, driven with `oneshot`
pub struct TestApp {
    pub router: Router,
    pub services: Services,
    pub jwt: JwtService,
}

impl TestApp {
    pub fn new() -> Self {
        let services = Services::new(RecordStore::in_memory(), AvailabilityEngine::default());
        let jwt = JwtService::new(TEST_JWT_SECRET);
        let router = create_routes(AppState::new(services.clone(), jwt.clone()));

        Self {
            router,
            services,
            jwt,
        }
    }

    pub fn token_for(&self, trainer_id: Uuid) -> String {
        self.jwt.create_access_token(trainer_id, None).unwrap()
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> Response<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder.body(Body::from(body.to_string())).unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Sends the request and returns status plus parsed JSON body (Null when empty)
    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let response = self.request(method, uri, body, token).await;
        let status = response.status();
        (status, body_json(response).await)
    }
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    }
}
