use tracing::{info, instrument};
use uuid::Uuid;

use crate::models::{
    validate_duration, validate_email, validate_timezone, validate_working_days, CreateTrainer,
    Trainer, TrainerSettings, UpdateTrainer, UpdateTrainerSettings, MAX_ADVANCE_BOOKING_DAYS,
};
use crate::services::error::missing;
use crate::services::{ServiceError, ServiceResult};
use crate::store::RecordStore;

#[derive(Clone)]
pub struct TrainerService {
    store: RecordStore,
}

impl TrainerService {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }

    /// Creates the trainer together with default settings.
    #[instrument(skip(self, data), fields(telegram_id = data.telegram_id))]
    pub async fn register(&self, data: CreateTrainer) -> ServiceResult<Trainer> {
        if let Some(email) = &data.email {
            validate_email(email).map_err(ServiceError::validation)?;
        }
        if let Some(timezone) = &data.timezone {
            validate_timezone(timezone).map_err(ServiceError::validation)?;
        }

        let trainer = self.store.trainers.create_trainer(data).await?;
        self.store
            .settings
            .upsert_settings(TrainerSettings::defaults_for(trainer.id))
            .await?;

        info!("Registered trainer {} ({})", trainer.id, trainer.display_name());
        Ok(trainer)
    }

    pub async fn get(&self, trainer_id: Uuid) -> ServiceResult<Trainer> {
        self.store
            .trainers
            .get_trainer(trainer_id)
            .await
            .map_err(missing("Trainer"))
    }

    pub async fn get_by_telegram_id(&self, telegram_id: i64) -> ServiceResult<Trainer> {
        self.store
            .trainers
            .find_trainer_by_telegram_id(telegram_id)
            .await?
            .ok_or(ServiceError::NotFound("Trainer"))
    }

    #[instrument(skip(self, data))]
    pub async fn update(&self, trainer_id: Uuid, data: UpdateTrainer) -> ServiceResult<Trainer> {
        if let Some(email) = &data.email {
            validate_email(email).map_err(ServiceError::validation)?;
        }
        if let Some(timezone) = &data.timezone {
            validate_timezone(timezone).map_err(ServiceError::validation)?;
        }

        self.store
            .trainers
            .update_trainer(trainer_id, data)
            .await
            .map_err(missing("Trainer"))
    }

    #[instrument(skip(self))]
    pub async fn set_active(&self, trainer_id: Uuid, active: bool) -> ServiceResult<Trainer> {
        let trainer = self
            .store
            .trainers
            .set_trainer_active(trainer_id, active)
            .await
            .map_err(missing("Trainer"))?;
        info!("Trainer {} active = {}", trainer_id, active);
        Ok(trainer)
    }

    /// Settings of the trainer; defaults are stored on first access for
    /// trainers created before settings existed.
    pub async fn get_settings(&self, trainer_id: Uuid) -> ServiceResult<TrainerSettings> {
        match self.store.settings.get_settings(trainer_id).await? {
            Some(settings) => Ok(settings),
            None => {
                self.get(trainer_id).await?;
                let settings = self
                    .store
                    .settings
                    .upsert_settings(TrainerSettings::defaults_for(trainer_id))
                    .await?;
                Ok(settings)
            }
        }
    }

    #[instrument(skip(self, update))]
    pub async fn update_settings(
        &self,
        trainer_id: Uuid,
        update: UpdateTrainerSettings,
    ) -> ServiceResult<TrainerSettings> {
        let mut settings = self.get_settings(trainer_id).await?;
        settings.apply(&update);

        if settings.working_hours_start >= settings.working_hours_end {
            return Err(ServiceError::Validation(
                "Working hours start must be before end".to_string(),
            ));
        }
        validate_working_days(&settings.working_days).map_err(ServiceError::validation)?;
        validate_duration(i64::from(settings.default_session_duration))
            .map_err(ServiceError::validation)?;
        if !(0..=MAX_ADVANCE_BOOKING_DAYS).contains(&settings.advance_booking_days) {
            return Err(ServiceError::Validation(format!(
                "Advance booking days must be between 0 and {}",
                MAX_ADVANCE_BOOKING_DAYS
            )));
        }

        let settings = self.store.settings.upsert_settings(settings).await?;
        info!("Updated settings for trainer {}", trainer_id);
        Ok(settings)
    }
}
