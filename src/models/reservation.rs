//! Reservation model, derived pricing and request types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::enums::{PaymentStatus, ReservationStatus};
use crate::error::{AppError, AppResult};

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Started days in a span, rejecting counts that do not fit the `number_of_days` column
fn day_count(millis: i64) -> AppResult<i32> {
    let whole = millis / MILLIS_PER_DAY;
    let days = if millis % MILLIS_PER_DAY > 0 { whole + 1 } else { whole };
    i32::try_from(days)
        .map_err(|_| AppError::Validation("Rental period is too long".to_string()))
}

/// Half-open interval `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Period {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Period {
    /// Fails with a validation error unless `start < end`
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> AppResult<Self> {
        if end <= start {
            return Err(AppError::Validation(
                "End date must be after start date".to_string(),
            ));
        }
        let period = Self { start, end };
        period.checked_days()?;
        Ok(period)
    }

    /// Touching periods (one ends when the other starts) do not overlap
    pub fn overlaps(&self, other: &Period) -> bool {
        self.start < other.end && self.end > other.start
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at <= self.end
    }

    /// Number of started days; saturates for periods not built through `new`
    pub fn days(&self) -> i32 {
        self.checked_days().unwrap_or(i32::MAX)
    }

    fn checked_days(&self) -> AppResult<i32> {
        day_count((self.end - self.start).num_milliseconds())
    }
}

/// Price breakdown for a period at a daily rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct Pricing {
    pub number_of_days: i32,
    pub daily_rate: Decimal,
    pub delivery_cost: Decimal,
    pub total_cost: Decimal,
}

impl Pricing {
    pub fn compute(period: &Period, daily_rate: Decimal, delivery_cost: Decimal) -> Self {
        let number_of_days = period.days();
        Self {
            number_of_days,
            daily_rate,
            delivery_cost,
            total_cost: Decimal::from(number_of_days) * daily_rate + delivery_cost,
        }
    }
}

/// Reservation record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Reservation {
    pub id: Uuid,
    pub equipment_id: Uuid,
    pub client_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: ReservationStatus,
    pub daily_rate: Decimal,
    pub number_of_days: i32,
    pub delivery_required: bool,
    pub delivery_cost: Decimal,
    pub total_cost: Decimal,
    pub delivery_street: Option<String>,
    pub delivery_city: Option<String>,
    pub delivery_postal_code: Option<String>,
    pub notes: Option<String>,
    pub admin_notes: Option<String>,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub cancellation_reason: Option<String>,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Everything needed to open a pending reservation
#[derive(Debug, Clone)]
pub struct NewReservation {
    pub equipment_id: Uuid,
    pub client_id: Uuid,
    pub period: Period,
    pub delivery_required: bool,
    pub delivery_address: Option<DeliveryAddress>,
    pub notes: Option<String>,
}

impl Reservation {
    /// Open a pending reservation priced at the given rate
    pub fn pending(
        data: NewReservation,
        daily_rate: Decimal,
        delivery_cost: Decimal,
        now: DateTime<Utc>,
    ) -> Self {
        let delivery_cost = if data.delivery_required {
            delivery_cost
        } else {
            Decimal::ZERO
        };
        let address = data.delivery_address.unwrap_or_default();
        let mut reservation = Self {
            id: Uuid::new_v4(),
            equipment_id: data.equipment_id,
            client_id: data.client_id,
            start_date: data.period.start,
            end_date: data.period.end,
            status: ReservationStatus::Pending,
            daily_rate,
            number_of_days: 0,
            delivery_required: data.delivery_required,
            delivery_cost,
            total_cost: Decimal::ZERO,
            delivery_street: address.street,
            delivery_city: address.city,
            delivery_postal_code: address.postal_code,
            notes: data.notes,
            admin_notes: None,
            approved_by: None,
            approved_at: None,
            rejection_reason: None,
            cancellation_reason: None,
            payment_status: PaymentStatus::Unpaid,
            created_at: now,
            updated_at: now,
        };
        reservation.reprice();
        reservation
    }

    pub fn period(&self) -> Period {
        Period {
            start: self.start_date,
            end: self.end_date,
        }
    }

    /// Recompute day count and total from dates, rate and delivery cost
    pub fn reprice(&mut self) {
        let pricing = Pricing::compute(&self.period(), self.daily_rate, self.delivery_cost);
        self.number_of_days = pricing.number_of_days;
        self.total_cost = pricing.total_cost;
    }

    /// Move the reservation to `to`, enforcing the lifecycle graph
    pub fn transition(&mut self, to: ReservationStatus, now: DateTime<Utc>) -> AppResult<()> {
        use ReservationStatus::*;

        let allowed = matches!(
            (self.status, to),
            (Pending, Approved)
                | (Pending, Rejected)
                | (Pending, Cancelled)
                | (Approved, Active)
                | (Approved, Cancelled)
                | (Active, Completed)
        );
        if !allowed {
            return Err(AppError::InvalidState(format!(
                "Reservation {} cannot go from {} to {}",
                self.id, self.status, to
            )));
        }
        self.status = to;
        self.updated_at = now;
        Ok(())
    }
}

/// Delivery address supplied with a reservation request
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct DeliveryAddress {
    pub street: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
}

/// Create reservation request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateReservation {
    pub equipment_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub delivery_required: bool,
    pub delivery_address: Option<DeliveryAddress>,
    #[validate(length(max = 500, message = "Notes cannot exceed 500 characters"))]
    pub notes: Option<String>,
}

/// Reject reservation request
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct RejectReservation {
    #[validate(length(max = 500))]
    pub rejection_reason: Option<String>,
}

/// Cancel reservation request
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct CancelReservation {
    #[validate(length(max = 500))]
    pub cancellation_reason: Option<String>,
}
