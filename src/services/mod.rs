//! Business logic services

pub mod auth;
pub mod availability;
pub mod email;
pub mod equipment;
pub mod maintenance;
pub mod reservations;
pub mod sweeper;

use std::sync::Arc;

use crate::{clock::Clock, config::AppConfig, repository::Stores};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub equipment: equipment::EquipmentService,
    pub availability: availability::AvailabilityService,
    pub reservations: reservations::ReservationsService,
    pub maintenance: maintenance::MaintenanceService,
    pub sweeper: sweeper::Sweeper,
}

impl Services {
    /// Create all services over the given stores
    pub fn new(
        stores: Stores,
        config: &AppConfig,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn email::Notifier>,
    ) -> Self {
        let availability = availability::AvailabilityService::new(stores.clone(), clock.clone());
        let reservations = reservations::ReservationsService::new(
            stores.clone(),
            availability.clone(),
            notifier,
            clock.clone(),
            config.rental.delivery_cost,
        );
        let maintenance =
            maintenance::MaintenanceService::new(stores.clone(), availability.clone(), clock.clone());

        Self {
            auth: auth::AuthService::new(stores.clone(), config.auth.clone()),
            equipment: equipment::EquipmentService::new(stores.clone(), clock.clone()),
            sweeper: sweeper::Sweeper::new(
                stores,
                reservations.clone(),
                maintenance.clone(),
                clock,
            ),
            availability,
            reservations,
            maintenance,
        }
    }
}
