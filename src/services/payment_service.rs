use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::models::{validate_amount, CreatePayment, Payment};
use crate::services::error::missing;
use crate::services::{ServiceError, ServiceResult};
use crate::store::{PaymentFilter, RecordStore};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentQuery {
    pub client_id: Option<Uuid>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Clone)]
pub struct PaymentService {
    store: RecordStore,
}

impl PaymentService {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }

    #[instrument(skip(self, data), fields(client_id = %data.client_id, amount = data.amount))]
    pub async fn record(&self, trainer_id: Uuid, data: CreatePayment) -> ServiceResult<Payment> {
        validate_amount(data.amount).map_err(ServiceError::validation)?;

        let client = self
            .store
            .clients
            .get_client(data.client_id)
            .await
            .map_err(missing("Client"))?;
        if client.trainer_id != trainer_id {
            return Err(ServiceError::NotFound("Client"));
        }

        let date = data.payment_date.unwrap_or_else(|| Utc::now().date_naive());
        let payment = self
            .store
            .payments
            .create_payment(trainer_id, date, data)
            .await
            .map_err(missing("Client"))?;

        info!("Recorded payment {} from client {}", payment.id, client.full_name());
        Ok(payment)
    }

    pub async fn list(&self, trainer_id: Uuid, query: PaymentQuery) -> ServiceResult<Vec<Payment>> {
        let filter = PaymentFilter {
            trainer_id: Some(trainer_id),
            client_id: query.client_id,
            from: query.from,
            to: query.to,
        };
        Ok(self.store.payments.query_payments(filter).await?)
    }
}
