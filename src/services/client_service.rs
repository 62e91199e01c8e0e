use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::models::{
    validate_email, validate_name, validate_session_counters, Client, CreateClient,
    CreateMeasurement, Measurement, UpdateClient,
};
use crate::services::error::missing;
use crate::services::retry::RetryConfig;
use crate::services::session_accounting::{self, AccountingError};
use crate::services::{ServiceError, ServiceResult};
use crate::store::{ClientFilter, ClientOrder, RecordStore, SessionCounters, SortOrder, StoreError};

pub const DEFAULT_EXPIRING_DAYS: i64 = 7;
pub const MAX_EXPIRING_DAYS: i64 = 366;
pub const DEFAULT_MEASUREMENT_LIMIT: i64 = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtendSubscription {
    pub subscription_end: NaiveDate,
    pub subscription_type: Option<String>,
    /// Sessions added to the subscription together with the extension.
    pub sessions: Option<i32>,
}

/// Applies `change` to the client's session counters with a
/// compare-and-set write, re-reading and retrying when another writer got
/// there first.
pub(crate) async fn update_sessions<F>(
    store: &RecordStore,
    retry: &RetryConfig,
    client_id: Uuid,
    change: F,
) -> ServiceResult<Client>
where
    F: Fn(&Client) -> Result<Client, AccountingError>,
{
    let change = &change;
    let outcome = retry
        .execute(
            || async move {
                let current = store.clients.get_client(client_id).await?;
                match change(&current) {
                    Ok(next) => store
                        .clients
                        .compare_and_set_sessions(
                            client_id,
                            SessionCounters::from(&current),
                            SessionCounters::from(&next),
                        )
                        .await
                        .map(Ok),
                    Err(err) => Ok(Err(err)),
                }
            },
            |err: &StoreError| *err == StoreError::StaleRecord,
        )
        .await
        .map_err(missing("Client"))?;

    Ok(outcome?)
}

#[derive(Clone)]
pub struct ClientService {
    store: RecordStore,
    retry: RetryConfig,
}

impl ClientService {
    pub fn new(store: RecordStore) -> Self {
        Self {
            store,
            retry: RetryConfig::default(),
        }
    }

    #[instrument(skip(self, data))]
    pub async fn create(&self, trainer_id: Uuid, data: CreateClient) -> ServiceResult<Client> {
        validate_name(&data.first_name, "First name").map_err(ServiceError::validation)?;
        if let Some(email) = &data.email {
            validate_email(email).map_err(ServiceError::validation)?;
        }
        validate_session_counters(
            data.sessions_total.unwrap_or(0),
            data.sessions_used.unwrap_or(0),
        )
        .map_err(ServiceError::validation)?;

        let client = self
            .store
            .clients
            .create_client(trainer_id, data)
            .await
            .map_err(missing("Trainer"))?;

        info!("Created client {} for trainer {}", client.id, trainer_id);
        Ok(client)
    }

    /// Client owned by `trainer_id`; anyone else's client is reported as
    /// missing.
    pub async fn get(&self, trainer_id: Uuid, client_id: Uuid) -> ServiceResult<Client> {
        let client = self
            .store
            .clients
            .get_client(client_id)
            .await
            .map_err(missing("Client"))?;

        if client.trainer_id != trainer_id {
            return Err(ServiceError::NotFound("Client"));
        }
        Ok(client)
    }

    pub async fn get_by_telegram_id(&self, trainer_id: Uuid, telegram_id: i64) -> ServiceResult<Client> {
        match self.store.clients.find_client_by_telegram_id(telegram_id).await? {
            Some(client) if client.trainer_id == trainer_id => Ok(client),
            _ => Err(ServiceError::NotFound("Client")),
        }
    }

    pub async fn list(&self, trainer_id: Uuid, active_only: bool) -> ServiceResult<Vec<Client>> {
        let mut filter = ClientFilter::for_trainer(trainer_id);
        filter.active_only = active_only;
        Ok(self.store.clients.query_clients(filter).await?)
    }

    #[instrument(skip(self, data))]
    pub async fn update(
        &self,
        trainer_id: Uuid,
        client_id: Uuid,
        data: UpdateClient,
    ) -> ServiceResult<Client> {
        self.get(trainer_id, client_id).await?;

        if let Some(first_name) = &data.first_name {
            validate_name(first_name, "First name").map_err(ServiceError::validation)?;
        }
        if let Some(email) = &data.email {
            validate_email(email).map_err(ServiceError::validation)?;
        }

        self.store
            .clients
            .update_client(client_id, data)
            .await
            .map_err(missing("Client"))
    }

    /// Case-insensitive match on first or last name, ordered by first name.
    pub async fn search(&self, trainer_id: Uuid, term: &str) -> ServiceResult<Vec<Client>> {
        let term = term.trim();
        if term.is_empty() {
            return Err(ServiceError::InvalidRequest(
                "Search term cannot be empty".to_string(),
            ));
        }

        let filter = ClientFilter {
            trainer_id: Some(trainer_id),
            name_search: Some(term.to_string()),
            order: ClientOrder::FirstName,
            ..Default::default()
        };
        Ok(self.store.clients.query_clients(filter).await?)
    }

    #[instrument(skip(self))]
    pub async fn set_active(
        &self,
        trainer_id: Uuid,
        client_id: Uuid,
        active: bool,
    ) -> ServiceResult<Client> {
        self.get(trainer_id, client_id).await?;
        let client = self
            .store
            .clients
            .set_client_active(client_id, active)
            .await
            .map_err(missing("Client"))?;
        info!("Client {} active = {}", client_id, active);
        Ok(client)
    }

    #[instrument(skip(self))]
    pub async fn add_sessions(
        &self,
        trainer_id: Uuid,
        client_id: Uuid,
        sessions: i32,
    ) -> ServiceResult<Client> {
        self.get(trainer_id, client_id).await?;
        let client = update_sessions(&self.store, &self.retry, client_id, |client| {
            session_accounting::add_sessions(client, sessions)
        })
        .await?;

        info!(
            "Added {} sessions to client {} ({} remaining)",
            sessions,
            client_id,
            client.sessions_remaining()
        );
        Ok(client)
    }

    #[instrument(skip(self, extension))]
    pub async fn extend_subscription(
        &self,
        trainer_id: Uuid,
        client_id: Uuid,
        extension: ExtendSubscription,
    ) -> ServiceResult<Client> {
        let client = self.get(trainer_id, client_id).await?;

        if let Some(start) = client.subscription_start {
            if extension.subscription_end < start {
                return Err(ServiceError::Validation(
                    "Subscription cannot end before it starts".to_string(),
                ));
            }
        }

        if let Some(sessions) = extension.sessions {
            self.add_sessions(trainer_id, client_id, sessions).await?;
        }

        let update = UpdateClient {
            subscription_end: Some(extension.subscription_end),
            subscription_type: extension.subscription_type,
            ..Default::default()
        };
        self.store
            .clients
            .update_client(client_id, update)
            .await
            .map_err(missing("Client"))
    }

    /// Active clients whose subscription ends within `days` from today.
    pub async fn expiring_subscriptions(
        &self,
        trainer_id: Uuid,
        days: Option<i64>,
    ) -> ServiceResult<Vec<Client>> {
        let today = Utc::now().date_naive();
        let days = days.unwrap_or(DEFAULT_EXPIRING_DAYS);
        if !(0..=MAX_EXPIRING_DAYS).contains(&days) {
            return Err(ServiceError::InvalidRequest(format!(
                "Days must be between 0 and {}",
                MAX_EXPIRING_DAYS
            )));
        }

        let filter = ClientFilter {
            trainer_id: Some(trainer_id),
            active_only: true,
            subscription_ends_by: Some(today + Duration::days(days)),
            order: ClientOrder::SubscriptionEnd,
            ..Default::default()
        };

        let clients = self.store.clients.query_clients(filter).await?;
        Ok(clients
            .into_iter()
            .filter(|client| client.subscription_end.map_or(false, |end| end >= today))
            .collect())
    }

    /// Records a measurement; a weight reading also becomes the client's
    /// current weight.
    #[instrument(skip(self, data))]
    pub async fn add_measurement(
        &self,
        trainer_id: Uuid,
        client_id: Uuid,
        data: CreateMeasurement,
    ) -> ServiceResult<Measurement> {
        self.get(trainer_id, client_id).await?;

        if let Some(weight) = data.weight {
            if weight <= 0.0 {
                return Err(ServiceError::Validation("Weight must be positive".to_string()));
            }
        }

        let date = data
            .measurement_date
            .unwrap_or_else(|| Utc::now().date_naive());
        let measurement = self
            .store
            .measurements
            .create_measurement(client_id, date, data)
            .await
            .map_err(missing("Client"))?;

        if let Some(weight) = measurement.weight {
            let update = UpdateClient {
                current_weight: Some(weight),
                ..Default::default()
            };
            self.store.clients.update_client(client_id, update).await?;
        }

        Ok(measurement)
    }

    pub async fn list_measurements(
        &self,
        trainer_id: Uuid,
        client_id: Uuid,
        limit: Option<i64>,
    ) -> ServiceResult<Vec<Measurement>> {
        self.get(trainer_id, client_id).await?;
        let limit = limit.unwrap_or(DEFAULT_MEASUREMENT_LIMIT).clamp(1, 100);
        Ok(self
            .store
            .measurements
            .list_measurements(client_id, SortOrder::Descending, Some(limit))
            .await?)
    }
}
