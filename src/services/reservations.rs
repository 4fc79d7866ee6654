//! Reservation lifecycle service

use std::sync::Arc;

use rust_decimal::Decimal;
use uuid::Uuid;
use validator::Validate;

use super::{
    availability::{AvailabilityService, Occupant},
    email::Notifier,
};
use crate::{
    clock::Clock,
    error::{AppError, AppResult},
    models::{
        reservation::{CreateReservation, NewReservation},
        EquipmentStatus, Period, Reservation, ReservationStatus, UserClaims,
    },
    repository::Stores,
};

#[derive(Clone)]
pub struct ReservationsService {
    stores: Stores,
    availability: AvailabilityService,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    delivery_cost: Decimal,
}

impl ReservationsService {
    pub fn new(
        stores: Stores,
        availability: AvailabilityService,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        delivery_cost: Decimal,
    ) -> Self {
        Self {
            stores,
            availability,
            notifier,
            clock,
            delivery_cost,
        }
    }

    /// Get a reservation visible to the caller
    pub async fn get(&self, id: Uuid, claims: &UserClaims) -> AppResult<Reservation> {
        let reservation = self.stores.reservations.get(id).await?;
        if !claims.can_access(reservation.client_id) {
            return Err(AppError::NotFound(format!("Reservation {} not found", id)));
        }
        Ok(reservation)
    }

    /// Reservations running right now
    pub async fn active(&self) -> AppResult<Vec<Reservation>> {
        self.stores.reservations.find_active_at(self.clock.now()).await
    }

    /// Open a pending reservation for `client_id`
    pub async fn create(&self, client_id: Uuid, data: CreateReservation) -> AppResult<Reservation> {
        data.validate()?;
        let period = Period::new(data.start_date, data.end_date)?;

        let equipment = self.stores.equipment.get(data.equipment_id).await?;
        let client = self.stores.users.get(client_id).await?;

        let days = period.days();
        if days < equipment.minimum_rental_days || days > equipment.maximum_rental_days {
            return Err(AppError::Validation(format!(
                "Rental length must be between {} and {} days (requested {})",
                equipment.minimum_rental_days, equipment.maximum_rental_days, days
            )));
        }

        if !equipment.is_available() {
            return Err(AppError::unavailable(format!(
                "Equipment {} is {}",
                equipment.id, equipment.status
            )));
        }

        if self
            .availability
            .has_conflict(equipment.id, period.start, period.end, None)
            .await?
        {
            return Err(AppError::dates_conflict(format!(
                "Equipment {} is already booked between {} and {}",
                equipment.id, period.start, period.end
            )));
        }

        let reservation = Reservation::pending(
            NewReservation {
                equipment_id: equipment.id,
                client_id,
                period,
                delivery_required: data.delivery_required,
                delivery_address: data.delivery_address,
                notes: data.notes,
            },
            equipment.daily_rate,
            self.delivery_cost,
            self.clock.now(),
        );
        self.stores.reservations.insert(&reservation).await?;
        tracing::info!(
            "Reservation {} created for equipment {} by client {} ({} days, total {})",
            reservation.id,
            equipment.id,
            client_id,
            reservation.number_of_days,
            reservation.total_cost
        );

        if let Err(e) = self
            .notifier
            .reservation_created(&client, &equipment, &reservation)
            .await
        {
            tracing::warn!(
                "Failed to send confirmation for reservation {}: {}",
                reservation.id,
                e
            );
        }

        Ok(reservation)
    }

    pub async fn approve(&self, id: Uuid, approver_id: Uuid) -> AppResult<Reservation> {
        let now = self.clock.now();
        let mut reservation = self.stores.reservations.get(id).await?;
        reservation.transition(ReservationStatus::Approved, now)?;

        if self
            .availability
            .has_conflict(
                reservation.equipment_id,
                reservation.start_date,
                reservation.end_date,
                Some(reservation.id),
            )
            .await?
        {
            tracing::warn!(
                "Approval of reservation {} refused: equipment {} already booked",
                reservation.id,
                reservation.equipment_id
            );
            return Err(AppError::dates_conflict(format!(
                "Equipment {} is already booked for these dates",
                reservation.equipment_id
            )));
        }

        reservation.approved_by = Some(approver_id);
        reservation.approved_at = Some(now);
        self.stores.reservations.save(&reservation).await?;
        tracing::info!("Reservation {} approved by {}", reservation.id, approver_id);

        if reservation.period().contains(now) {
            self.occupy(&reservation).await?;
        }

        Ok(reservation)
    }

    pub async fn reject(&self, id: Uuid, reason: Option<String>) -> AppResult<Reservation> {
        let mut reservation = self.stores.reservations.get(id).await?;
        reservation.transition(ReservationStatus::Rejected, self.clock.now())?;
        reservation.rejection_reason = reason;
        self.stores.reservations.save(&reservation).await?;
        tracing::info!("Reservation {} rejected", reservation.id);
        Ok(reservation)
    }

    /// Cancel a pending or approved reservation; clients only reach their own
    pub async fn cancel(
        &self,
        id: Uuid,
        reason: Option<String>,
        requested_by: &UserClaims,
    ) -> AppResult<Reservation> {
        let mut reservation = self.get(id, requested_by).await?;
        reservation.transition(ReservationStatus::Cancelled, self.clock.now())?;
        reservation.cancellation_reason = reason;
        self.stores.reservations.save(&reservation).await?;
        tracing::info!(
            "Reservation {} cancelled by {}",
            reservation.id,
            requested_by.user_id
        );

        self.release(&reservation).await?;
        Ok(reservation)
    }

    /// Close an active reservation and release its equipment
    pub async fn complete(&self, id: Uuid) -> AppResult<Reservation> {
        let mut reservation = self.stores.reservations.get(id).await?;
        reservation.transition(ReservationStatus::Completed, self.clock.now())?;
        self.stores.reservations.save(&reservation).await?;
        tracing::info!("Reservation {} completed", reservation.id);

        self.release(&reservation).await?;
        Ok(reservation)
    }

    /// Start an approved reservation; its equipment becomes rented
    pub async fn activate(&self, id: Uuid) -> AppResult<Reservation> {
        let mut reservation = self.stores.reservations.get(id).await?;
        reservation.transition(ReservationStatus::Active, self.clock.now())?;
        self.stores.reservations.save(&reservation).await?;
        tracing::info!("Reservation {} activated", reservation.id);

        self.occupy(&reservation).await?;
        Ok(reservation)
    }

    async fn occupy(&self, reservation: &Reservation) -> AppResult<()> {
        self.stores
            .equipment
            .set_status(reservation.equipment_id, EquipmentStatus::Rented)
            .await
            .map_err(|e| {
                tracing::warn!(
                    "Reservation {} is {} but equipment {} could not be marked rented: {}",
                    reservation.id,
                    reservation.status,
                    reservation.equipment_id,
                    e
                );
                e
            })
    }

    async fn release(&self, reservation: &Reservation) -> AppResult<()> {
        self.availability
            .release(reservation.equipment_id, Occupant::Reservation(reservation.id))
            .await
            .map(|_| ())
            .map_err(|e| {
                tracing::warn!(
                    "Reservation {} is {} but equipment {} could not be released: {}",
                    reservation.id,
                    reservation.status,
                    reservation.equipment_id,
                    e
                );
                e
            })
    }
}
