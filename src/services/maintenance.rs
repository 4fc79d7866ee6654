//! Maintenance lifecycle service

use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use super::availability::{AvailabilityService, Occupant};
use crate::{
    clock::Clock,
    error::AppResult,
    models::{
        maintenance::{CancelMaintenance, CompleteMaintenance, CreateMaintenance, UpdateMaintenance},
        EquipmentStatus, Maintenance, MaintenanceStatus,
    },
    repository::Stores,
};

#[derive(Clone)]
pub struct MaintenanceService {
    stores: Stores,
    availability: AvailabilityService,
    clock: Arc<dyn Clock>,
}

impl MaintenanceService {
    pub fn new(stores: Stores, availability: AvailabilityService, clock: Arc<dyn Clock>) -> Self {
        Self {
            stores,
            availability,
            clock,
        }
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Maintenance> {
        self.stores.maintenance.get(id).await
    }

    /// Schedule maintenance; `assigned_by` is the calling admin
    pub async fn create(&self, assigned_by: Uuid, data: CreateMaintenance) -> AppResult<Maintenance> {
        data.validate()?;
        self.stores.equipment.get(data.equipment_id).await?;
        if let Some(technician_id) = data.technician_id {
            self.stores.users.get(technician_id).await?;
        }

        let maintenance = Maintenance::schedule(&data, assigned_by, self.clock.now());
        self.stores.maintenance.insert(&maintenance).await?;
        tracing::info!(
            "Maintenance {} scheduled on equipment {} for {}",
            maintenance.id,
            maintenance.equipment_id,
            maintenance.scheduled_date
        );
        Ok(maintenance)
    }

    /// Edit planning details while the work is still scheduled
    pub async fn update(&self, id: Uuid, data: UpdateMaintenance) -> AppResult<Maintenance> {
        data.validate()?;
        let mut maintenance = self.stores.maintenance.get(id).await?;
        if let Some(technician_id) = data.technician_id {
            self.stores.users.get(technician_id).await?;
        }

        maintenance.apply_update(data, self.clock.now())?;
        self.stores.maintenance.save(&maintenance).await?;
        tracing::info!("Maintenance {} updated", maintenance.id);
        Ok(maintenance)
    }

    /// Begin work; the equipment goes into maintenance
    pub async fn start(
        &self,
        id: Uuid,
        technician_id: Option<Uuid>,
        caller: Uuid,
    ) -> AppResult<Maintenance> {
        let now = self.clock.now();
        let mut maintenance = self.stores.maintenance.get(id).await?;
        maintenance.transition(MaintenanceStatus::InProgress, now)?;

        let technician_id = technician_id.unwrap_or(caller);
        self.stores.users.get(technician_id).await?;
        maintenance.technician_id = Some(technician_id);
        maintenance.actual_start_date = Some(now);
        self.stores.maintenance.save(&maintenance).await?;
        tracing::info!(
            "Maintenance {} started by technician {}",
            maintenance.id,
            technician_id
        );

        self.stores
            .equipment
            .set_status(maintenance.equipment_id, EquipmentStatus::Maintenance)
            .await
            .map_err(|e| {
                tracing::warn!(
                    "Maintenance {} started but equipment {} could not be marked: {}",
                    maintenance.id,
                    maintenance.equipment_id,
                    e
                );
                e
            })?;
        Ok(maintenance)
    }

    pub async fn complete(&self, id: Uuid, data: CompleteMaintenance) -> AppResult<Maintenance> {
        data.validate()?;
        let now = self.clock.now();
        let mut maintenance = self.stores.maintenance.get(id).await?;
        maintenance.transition(MaintenanceStatus::Completed, now)?;

        maintenance.actual_end_date = Some(now);
        maintenance.work_performed = data.work_performed;
        maintenance.next_maintenance_date = data.next_maintenance_date;
        if let Some(cost) = data.cost {
            maintenance.labor_cost = cost.labor.unwrap_or(maintenance.labor_cost);
            maintenance.parts_cost = cost.parts.unwrap_or(maintenance.parts_cost);
            maintenance.external_cost = cost.external.unwrap_or(maintenance.external_cost);
        }
        self.stores.maintenance.save(&maintenance).await?;
        tracing::info!(
            "Maintenance {} completed (total cost {})",
            maintenance.id,
            maintenance.total_cost()
        );

        self.release(&maintenance).await?;
        Ok(maintenance)
    }

    pub async fn cancel(&self, id: Uuid, data: CancelMaintenance) -> AppResult<Maintenance> {
        let mut maintenance = self.stores.maintenance.get(id).await?;
        maintenance.transition(MaintenanceStatus::Cancelled, self.clock.now())?;

        if let Some(reason) = data.reason.filter(|r| !r.trim().is_empty()) {
            let line = format!("Cancelled: {}", reason);
            maintenance.notes = Some(match maintenance.notes.take() {
                Some(notes) if !notes.is_empty() => format!("{}\n{}", notes, line),
                _ => line,
            });
        }
        self.stores.maintenance.save(&maintenance).await?;
        tracing::info!("Maintenance {} cancelled", maintenance.id);

        let equipment = self.stores.equipment.get(maintenance.equipment_id).await?;
        if equipment.status == EquipmentStatus::Maintenance {
            self.release(&maintenance).await?;
        }
        Ok(maintenance)
    }

    /// Scheduled maintenance whose date has already passed
    pub async fn overdue(&self) -> AppResult<Vec<Maintenance>> {
        self.stores.maintenance.find_overdue(self.clock.now()).await
    }

    async fn release(&self, maintenance: &Maintenance) -> AppResult<()> {
        self.availability
            .release(maintenance.equipment_id, Occupant::Maintenance(maintenance.id))
            .await
            .map(|_| ())
            .map_err(|e| {
                tracing::warn!(
                    "Maintenance {} is {} but equipment {} could not be released: {}",
                    maintenance.id,
                    maintenance.status,
                    maintenance.equipment_id,
                    e
                );
                e
            })
    }
}
