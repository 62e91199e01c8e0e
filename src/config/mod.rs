// Start-up configuration read from the environment

pub mod app;
pub mod database;
pub mod seeding;

pub use app::{AppConfig, StoreBackend};
pub use database::{run_migrations, DatabaseConfig};
pub use seeding::DatabaseSeeder;
