use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use trainer_hub::api::{create_routes, AppState};
use trainer_hub::auth::JwtService;
use trainer_hub::config::{run_migrations, AppConfig, DatabaseConfig, DatabaseSeeder, StoreBackend};
use trainer_hub::services::{AvailabilityEngine, Services};
use trainer_hub::store::{PgRecordStore, RecordStore};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let config = AppConfig::from_env()?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("trainer_hub={},tower_http=info", config.log_level))),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting trainer-hub in {} mode", config.environment);

    let store = match config.store_backend {
        StoreBackend::Postgres => {
            let db_config = DatabaseConfig::from_env()?;
            let pool = db_config
                .create_pool()
                .await
                .context("failed to connect to database")?;
            run_migrations(&pool).await.context("failed to run migrations")?;
            info!("Connected to database, migrations applied");
            RecordStore::from_backend(Arc::new(PgRecordStore::new(pool)))
        }
        StoreBackend::Memory => {
            info!("Using in-memory record store; data is lost on restart");
            RecordStore::in_memory()
        }
    };

    let engine = AvailabilityEngine::with_grid_step(config.slot_grid_minutes)
        .context("invalid SLOT_GRID_MINUTES")?;
    let services = Services::new(store, engine);

    if config.seed_demo_data {
        DatabaseSeeder::new(services.clone()).seed_all().await?;
    }

    let state = AppState::new(services, JwtService::new(&config.jwt_secret));
    let app = create_routes(state);

    let listener = TcpListener::bind(config.server_address()).await?;
    info!("Trainer hub listening on http://{}", config.server_address());
    info!("Health check available at http://{}/health", config.server_address());

    axum::serve(listener, app).await?;

    Ok(())
}
