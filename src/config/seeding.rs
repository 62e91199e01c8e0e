use anyhow::{Context, Result};
use chrono::{Duration, TimeZone, Utc};

use crate::models::*;
use crate::services::{ServiceError, Services};

pub const DEMO_TRAINER_TELEGRAM_ID: i64 = 100_000_001;
pub const DEMO_CLIENT_TELEGRAM_ID: i64 = 200_000_001;

/// Inserts a demo trainer with one client and one scheduled workout.
/// Does nothing when the demo trainer already exists.
pub struct DatabaseSeeder {
    services: Services,
}

impl DatabaseSeeder {
    pub fn new(services: Services) -> Self {
        Self { services }
    }

    pub async fn seed_all(&self) -> Result<()> {
        tracing::info!("Starting database seeding...");

        match self
            .services
            .trainers
            .get_by_telegram_id(DEMO_TRAINER_TELEGRAM_ID)
            .await
        {
            Ok(trainer) => {
                tracing::info!("Demo trainer {} already present, skipping seeding", trainer.id);
                return Ok(());
            }
            Err(ServiceError::NotFound(_)) => {}
            Err(err) => return Err(err).context("failed to look up demo trainer"),
        }

        let trainer = self.seed_trainer().await?;
        let client = self.seed_client(&trainer).await?;
        self.seed_workout(&trainer, &client).await?;

        tracing::info!("Database seeding completed!");
        Ok(())
    }

    async fn seed_trainer(&self) -> Result<Trainer> {
        let trainer = self
            .services
            .trainers
            .register(CreateTrainer {
                telegram_id: DEMO_TRAINER_TELEGRAM_ID,
                first_name: Some("Anna".to_string()),
                last_name: Some("Demo".to_string()),
                username: Some("anna_trainer".to_string()),
                email: Some("anna.demo@example.com".to_string()),
                specialization: Some("Strength training".to_string()),
                experience_years: Some(6),
                hourly_rate: Some(250_000),
                ..Default::default()
            })
            .await
            .context("failed to create demo trainer")?;

        tracing::info!("Created demo trainer {}", trainer.id);
        Ok(trainer)
    }

    async fn seed_client(&self, trainer: &Trainer) -> Result<Client> {
        let today = Utc::now().date_naive();
        let client = self
            .services
            .clients
            .create(
                trainer.id,
                CreateClient {
                    telegram_id: Some(DEMO_CLIENT_TELEGRAM_ID),
                    first_name: "Maxim".to_string(),
                    last_name: Some("Petrov".to_string()),
                    goal: Some("Lose 5 kg before summer".to_string()),
                    initial_weight: Some(88.0),
                    subscription_type: Some("12 sessions".to_string()),
                    subscription_start: Some(today),
                    subscription_end: Some(today + Duration::days(60)),
                    sessions_total: Some(12),
                    ..Default::default()
                },
            )
            .await
            .context("failed to create demo client")?;

        tracing::info!("Created demo client {}", client.id);
        Ok(client)
    }

    async fn seed_workout(&self, trainer: &Trainer, client: &Client) -> Result<()> {
        let tomorrow = Utc::now().date_naive() + Duration::days(1);
        let start = Utc.from_utc_datetime(
            &tomorrow
                .and_hms_opt(7, 0, 0)
                .context("invalid demo workout time")?,
        );

        let workout = self
            .services
            .bookings
            .create_workout(
                trainer.id,
                CreateWorkout {
                    client_id: client.id,
                    title: "Full body intro".to_string(),
                    description: Some("Assessment and technique basics".to_string()),
                    workout_date: start,
                    duration: Some(60),
                    status: None,
                    workout_type: Some("strength".to_string()),
                    location: Some("Main gym".to_string()),
                    price: Some(250_000),
                    notes: None,
                },
            )
            .await
            .context("failed to create demo workout")?;

        self.services
            .workouts
            .add_exercises(
                trainer.id,
                workout.id,
                vec![
                    CreateExercise {
                        exercise_name: "Goblet squat".to_string(),
                        sets: Some(3),
                        reps: Some("12".to_string()),
                        rest_time: Some(60),
                        ..Default::default()
                    },
                    CreateExercise {
                        exercise_name: "Plank".to_string(),
                        sets: Some(3),
                        reps: Some("45 sec".to_string()),
                        ..Default::default()
                    },
                ],
            )
            .await
            .context("failed to add demo exercises")?;

        tracing::info!("Created demo workout {}", workout.id);
        Ok(())
    }
}
