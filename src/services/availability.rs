//! Equipment availability projection and status release

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    clock::Clock,
    error::AppResult,
    models::{equipment::AvailabilityQuote, EquipmentStatus, Period},
    repository::Stores,
};

/// Record that stops occupying a piece of equipment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occupant {
    Reservation(Uuid),
    Maintenance(Uuid),
}

#[derive(Clone)]
pub struct AvailabilityService {
    stores: Stores,
    clock: Arc<dyn Clock>,
}

impl AvailabilityService {
    pub fn new(stores: Stores, clock: Arc<dyn Clock>) -> Self {
        Self { stores, clock }
    }

    /// Whether `[start, end)` overlaps an approved or active reservation of the equipment
    pub async fn has_conflict(
        &self,
        equipment_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> AppResult<bool> {
        let period = Period::new(start, end)?;
        self.stores
            .reservations
            .has_blocking_overlap(equipment_id, &period, exclude)
            .await
    }

    pub async fn is_available(&self, equipment_id: Uuid, period: Option<Period>) -> AppResult<bool> {
        let equipment = self.stores.equipment.get(equipment_id).await?;
        if !equipment.is_available() {
            return Ok(false);
        }
        match period {
            None => Ok(true),
            Some(period) => Ok(!self
                .stores
                .reservations
                .has_blocking_overlap(equipment_id, &period, None)
                .await?),
        }
    }

    /// Availability and price estimate; both dates must be given for a period quote
    pub async fn quote(
        &self,
        equipment_id: Uuid,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> AppResult<AvailabilityQuote> {
        let equipment = self.stores.equipment.get(equipment_id).await?;

        let period = match (start, end) {
            (Some(start), Some(end)) => Some(Period::new(start, end)?),
            _ => None,
        };

        let conflicts = match &period {
            Some(period) => {
                self.stores
                    .reservations
                    .has_blocking_overlap(equipment_id, period, None)
                    .await?
            }
            None => false,
        };

        let days = period.map(|p| p.days());
        Ok(AvailabilityQuote {
            equipment_id,
            status: equipment.status,
            available: equipment.is_available() && !conflicts,
            conflicts,
            days,
            estimated_cost: days.map(|d| Decimal::from(d) * equipment.daily_rate),
        })
    }

    /// Recompute equipment status after `occupant` stopped occupying it.
    ///
    /// A reservation only releases rented equipment; maintenance releases
    /// rented or in-maintenance equipment. The returned status is the one
    /// written, if any.
    pub async fn release(
        &self,
        equipment_id: Uuid,
        occupant: Occupant,
    ) -> AppResult<Option<EquipmentStatus>> {
        let equipment = self.stores.equipment.get(equipment_id).await?;
        let releasable = match occupant {
            Occupant::Reservation(_) => equipment.status == EquipmentStatus::Rented,
            Occupant::Maintenance(_) => matches!(
                equipment.status,
                EquipmentStatus::Rented | EquipmentStatus::Maintenance
            ),
        };
        if !releasable {
            return Ok(None);
        }

        let (exclude_reservation, exclude_maintenance) = match occupant {
            Occupant::Reservation(id) => (Some(id), None),
            Occupant::Maintenance(id) => (None, Some(id)),
        };

        let next = if self
            .stores
            .maintenance
            .has_other_in_progress(equipment_id, exclude_maintenance)
            .await?
        {
            EquipmentStatus::Maintenance
        } else if self
            .stores
            .reservations
            .has_other_occupying(equipment_id, exclude_reservation, self.clock.now())
            .await?
        {
            EquipmentStatus::Rented
        } else {
            EquipmentStatus::Available
        };

        if next == equipment.status {
            return Ok(None);
        }

        self.stores.equipment.set_status(equipment_id, next).await?;
        tracing::info!(
            "Equipment {} released by {:?}: {} -> {}",
            equipment_id,
            occupant,
            equipment.status,
            next
        );
        Ok(Some(next))
    }
}
