//! Equipment catalogue service

use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::{
    clock::Clock,
    error::{AppError, AppResult},
    models::{
        equipment::{CreateEquipment, EquipmentQuery, UpdateEquipment},
        Equipment,
    },
    repository::Stores,
};

#[derive(Clone)]
pub struct EquipmentService {
    stores: Stores,
    clock: Arc<dyn Clock>,
}

impl EquipmentService {
    pub fn new(stores: Stores, clock: Arc<dyn Clock>) -> Self {
        Self { stores, clock }
    }

    pub async fn list(&self, query: &EquipmentQuery) -> AppResult<Vec<Equipment>> {
        self.stores.equipment.list(query).await
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Equipment> {
        self.stores.equipment.get(id).await
    }

    pub async fn create(&self, data: &CreateEquipment) -> AppResult<Equipment> {
        data.validate()?;
        let equipment = Equipment::from_request(data, self.clock.now());
        check_rental_days(&equipment)?;
        self.stores.equipment.insert(&equipment).await?;
        tracing::info!("Equipment {} created ({})", equipment.id, equipment.name);
        Ok(equipment)
    }

    pub async fn update(&self, id: Uuid, data: &UpdateEquipment) -> AppResult<Equipment> {
        data.validate()?;
        let mut equipment = self.stores.equipment.get(id).await?;
        equipment.apply(data, self.clock.now());
        check_rental_days(&equipment)?;
        self.stores.equipment.save(&equipment).await?;
        tracing::info!("Equipment {} updated", equipment.id);
        Ok(equipment)
    }

    /// Delete equipment that no approved or active reservation refers to
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.stores.equipment.get(id).await?;
        if self.stores.reservations.has_blocking(id).await? {
            return Err(AppError::unavailable(format!(
                "Equipment {} has approved or active reservations",
                id
            )));
        }
        self.stores.equipment.delete(id).await?;
        tracing::info!("Equipment {} deleted", id);
        Ok(())
    }
}

/// Partial updates can invert the bounds even when each field is valid alone
fn check_rental_days(equipment: &Equipment) -> AppResult<()> {
    if equipment.minimum_rental_days > equipment.maximum_rental_days {
        return Err(AppError::Validation(format!(
            "minimum_rental_days ({}) exceeds maximum_rental_days ({})",
            equipment.minimum_rental_days, equipment.maximum_rental_days
        )));
    }
    Ok(())
}
