// Business logic services

pub mod availability_engine;
pub mod availability_service;
pub mod booking_service;
pub mod client_service;
pub mod error;
pub mod payment_service;
pub mod retry;
pub mod session_accounting;
pub mod stats_service;
pub mod trainer_service;
pub mod workout_service;

pub use availability_engine::{AvailabilityEngine, AvailabilityError};
pub use availability_service::AvailabilityService;
pub use booking_service::{BookSlot, BookingService, TrainerLocks};
pub use client_service::{ClientService, ExtendSubscription};
pub use error::{ServiceError, ServiceResult};
pub use payment_service::{PaymentQuery, PaymentService};
pub use session_accounting::AccountingError;
pub use stats_service::StatsService;
pub use trainer_service::TrainerService;
pub use workout_service::{SessionOutcome, TransitionOutcome, WorkoutQuery, WorkoutService};

use crate::store::RecordStore;

/// Every service wired to one record store.
#[derive(Clone)]
pub struct Services {
    pub trainers: TrainerService,
    pub clients: ClientService,
    pub availability: AvailabilityService,
    pub bookings: BookingService,
    pub workouts: WorkoutService,
    pub stats: StatsService,
    pub payments: PaymentService,
}

impl Services {
    pub fn new(store: RecordStore, engine: AvailabilityEngine) -> Self {
        let locks = TrainerLocks::new();
        let availability = AvailabilityService::new(store.clone(), engine);

        Self {
            trainers: TrainerService::new(store.clone()),
            clients: ClientService::new(store.clone()),
            bookings: BookingService::new(store.clone(), availability.clone(), locks.clone()),
            availability,
            workouts: WorkoutService::new(store.clone(), locks),
            stats: StatsService::new(store.clone()),
            payments: PaymentService::new(store),
        }
    }
}
