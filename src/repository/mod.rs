//! Repository layer for database operations
//!
//! Each aggregate is reached through a store trait so the lifecycle
//! services can run against PostgreSQL in production and an in-memory
//! store in tests.

pub mod equipment;
pub mod maintenance;
#[cfg(test)]
pub mod memory;
pub mod reservations;
pub mod users;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        equipment::EquipmentQuery, Equipment, EquipmentStatus, Maintenance, Period, Reservation,
        User,
    },
};

#[async_trait]
pub trait EquipmentStore: Send + Sync {
    async fn get(&self, id: Uuid) -> AppResult<Equipment>;
    async fn list(&self, query: &EquipmentQuery) -> AppResult<Vec<Equipment>>;
    async fn insert(&self, equipment: &Equipment) -> AppResult<()>;
    /// Persist every mutable column of `equipment`
    async fn save(&self, equipment: &Equipment) -> AppResult<()>;
    async fn delete(&self, id: Uuid) -> AppResult<()>;
    async fn set_status(&self, id: Uuid, status: EquipmentStatus) -> AppResult<()>;
}

#[async_trait]
pub trait ReservationStore: Send + Sync {
    async fn get(&self, id: Uuid) -> AppResult<Reservation>;
    async fn insert(&self, reservation: &Reservation) -> AppResult<()>;
    /// Persist status, derived costs and transition fields
    async fn save(&self, reservation: &Reservation) -> AppResult<()>;

    /// Whether an approved or active reservation of `equipment_id` overlaps `period`
    async fn has_blocking_overlap(
        &self,
        equipment_id: Uuid,
        period: &Period,
        exclude: Option<Uuid>,
    ) -> AppResult<bool>;

    /// Whether another reservation is active, or approved and covering `at`
    async fn has_other_occupying(
        &self,
        equipment_id: Uuid,
        exclude: Option<Uuid>,
        at: DateTime<Utc>,
    ) -> AppResult<bool>;

    /// Whether any reservation of the equipment is approved or active
    async fn has_blocking(&self, equipment_id: Uuid) -> AppResult<bool>;

    /// Approved reservations whose start falls in `[from, to)`
    async fn find_approved_starting(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<Reservation>>;

    /// Active reservations ending strictly before `until`
    async fn find_active_ending_before(&self, until: DateTime<Utc>) -> AppResult<Vec<Reservation>>;

    /// Active reservations whose period contains `at`
    async fn find_active_at(&self, at: DateTime<Utc>) -> AppResult<Vec<Reservation>>;
}

#[async_trait]
pub trait MaintenanceStore: Send + Sync {
    async fn get(&self, id: Uuid) -> AppResult<Maintenance>;
    async fn insert(&self, maintenance: &Maintenance) -> AppResult<()>;
    async fn save(&self, maintenance: &Maintenance) -> AppResult<()>;
    /// Whether another maintenance of the equipment is in progress
    async fn has_other_in_progress(&self, equipment_id: Uuid, exclude: Option<Uuid>) -> AppResult<bool>;
    /// Scheduled maintenance whose date is before `now`
    async fn find_overdue(&self, now: DateTime<Utc>) -> AppResult<Vec<Maintenance>>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get(&self, id: Uuid) -> AppResult<User>;
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;
    async fn insert(&self, user: &User) -> AppResult<()>;
}

/// Store handles shared by the services
#[derive(Clone)]
pub struct Stores {
    pub equipment: Arc<dyn EquipmentStore>,
    pub reservations: Arc<dyn ReservationStore>,
    pub maintenance: Arc<dyn MaintenanceStore>,
    pub users: Arc<dyn UserStore>,
}

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub equipment: equipment::EquipmentRepository,
    pub reservations: reservations::ReservationsRepository,
    pub maintenance: maintenance::MaintenanceRepository,
    pub users: users::UsersRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            equipment: equipment::EquipmentRepository::new(pool.clone()),
            reservations: reservations::ReservationsRepository::new(pool.clone()),
            maintenance: maintenance::MaintenanceRepository::new(pool.clone()),
            users: users::UsersRepository::new(pool.clone()),
            pool,
        }
    }

    /// Check database connectivity
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub fn stores(&self) -> Stores {
        Stores {
            equipment: Arc::new(self.equipment.clone()),
            reservations: Arc::new(self.reservations.clone()),
            maintenance: Arc::new(self.maintenance.clone()),
            users: Arc::new(self.users.clone()),
        }
    }
}
