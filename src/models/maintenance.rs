//! Maintenance model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::enums::{MaintenancePriority, MaintenanceStatus, MaintenanceType};
use crate::error::{AppError, AppResult};

/// Maintenance intervention on one piece of equipment
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Maintenance {
    pub id: Uuid,
    pub equipment_id: Uuid,
    pub maintenance_type: MaintenanceType,
    pub status: MaintenanceStatus,
    pub priority: MaintenancePriority,
    pub title: String,
    pub description: String,
    pub scheduled_date: DateTime<Utc>,
    /// Estimated duration in hours
    pub estimated_duration: Option<Decimal>,
    pub actual_start_date: Option<DateTime<Utc>>,
    pub actual_end_date: Option<DateTime<Utc>>,
    pub technician_id: Option<Uuid>,
    pub assigned_by: Option<Uuid>,
    pub labor_cost: Decimal,
    pub parts_cost: Decimal,
    pub external_cost: Decimal,
    pub work_performed: Option<String>,
    pub next_maintenance_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Maintenance {
    pub fn total_cost(&self) -> Decimal {
        self.labor_cost + self.parts_cost + self.external_cost
    }

    pub fn schedule(data: &CreateMaintenance, assigned_by: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            equipment_id: data.equipment_id,
            maintenance_type: data.maintenance_type,
            status: MaintenanceStatus::Scheduled,
            priority: data.priority.unwrap_or(MaintenancePriority::Medium),
            title: data.title.clone(),
            description: data.description.clone(),
            scheduled_date: data.scheduled_date,
            estimated_duration: data.estimated_duration,
            actual_start_date: None,
            actual_end_date: None,
            technician_id: data.technician_id,
            assigned_by: Some(assigned_by),
            labor_cost: Decimal::ZERO,
            parts_cost: Decimal::ZERO,
            external_cost: Decimal::ZERO,
            work_performed: None,
            next_maintenance_date: None,
            notes: data.notes.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Move to `to`, enforcing scheduled -> in_progress -> completed (cancel from either)
    pub fn transition(&mut self, to: MaintenanceStatus, now: DateTime<Utc>) -> AppResult<()> {
        use MaintenanceStatus::*;

        let allowed = matches!(
            (self.status, to),
            (Scheduled, InProgress)
                | (Scheduled, Cancelled)
                | (InProgress, Completed)
                | (InProgress, Cancelled)
        );
        if !allowed {
            return Err(AppError::InvalidState(format!(
                "Maintenance {} cannot go from {} to {}",
                self.id, self.status, to
            )));
        }
        self.status = to;
        self.updated_at = now;
        Ok(())
    }

    /// Edit planning details; only scheduled work can still be changed
    pub fn apply_update(&mut self, data: UpdateMaintenance, now: DateTime<Utc>) -> AppResult<()> {
        if self.status != MaintenanceStatus::Scheduled {
            return Err(AppError::InvalidState(format!(
                "Maintenance {} is {} and can no longer be edited",
                self.id, self.status
            )));
        }
        if let Some(title) = data.title {
            self.title = title;
        }
        if let Some(description) = data.description {
            self.description = description;
        }
        if let Some(maintenance_type) = data.maintenance_type {
            self.maintenance_type = maintenance_type;
        }
        if let Some(priority) = data.priority {
            self.priority = priority;
        }
        if let Some(scheduled_date) = data.scheduled_date {
            self.scheduled_date = scheduled_date;
        }
        if data.estimated_duration.is_some() {
            self.estimated_duration = data.estimated_duration;
        }
        if data.technician_id.is_some() {
            self.technician_id = data.technician_id;
        }
        if data.notes.is_some() {
            self.notes = data.notes;
        }
        self.updated_at = now;
        Ok(())
    }
}

/// Schedule maintenance request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateMaintenance {
    pub equipment_id: Uuid,
    pub maintenance_type: MaintenanceType,
    pub priority: Option<MaintenancePriority>,
    #[validate(length(min = 1, max = 100, message = "Title must be 1-100 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 1000, message = "Description must be 1-1000 characters"))]
    pub description: String,
    pub scheduled_date: DateTime<Utc>,
    pub estimated_duration: Option<Decimal>,
    pub technician_id: Option<Uuid>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

/// Edit scheduled maintenance request; absent fields are left unchanged
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateMaintenance {
    pub maintenance_type: Option<MaintenanceType>,
    pub priority: Option<MaintenancePriority>,
    #[validate(length(min = 1, max = 100, message = "Title must be 1-100 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 1000, message = "Description must be 1-1000 characters"))]
    pub description: Option<String>,
    pub scheduled_date: Option<DateTime<Utc>>,
    pub estimated_duration: Option<Decimal>,
    pub technician_id: Option<Uuid>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

/// Start maintenance request
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct StartMaintenance {
    /// Defaults to the caller
    pub technician_id: Option<Uuid>,
}

/// Cost breakdown reported on completion
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct MaintenanceCosts {
    pub labor: Option<Decimal>,
    pub parts: Option<Decimal>,
    pub external: Option<Decimal>,
}

/// Complete maintenance request
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct CompleteMaintenance {
    #[validate(length(max = 2000))]
    pub work_performed: Option<String>,
    pub next_maintenance_date: Option<DateTime<Utc>>,
    pub cost: Option<MaintenanceCosts>,
}

/// Cancel maintenance request
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CancelMaintenance {
    pub reason: Option<String>,
}
