//! Equipment model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::enums::{EquipmentCategory, EquipmentStatus};

/// Rentable machine
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Equipment {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: EquipmentCategory,
    pub brand: String,
    pub model: String,
    pub year: Option<i32>,
    /// Price per started day
    pub daily_rate: Decimal,
    pub city: Option<String>,
    pub status: EquipmentStatus,
    pub minimum_rental_days: i32,
    pub maximum_rental_days: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create equipment request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_rental_days_create"))]
pub struct CreateEquipment {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 1000, message = "Description must be 1-1000 characters"))]
    pub description: String,
    pub category: EquipmentCategory,
    #[validate(length(min = 1, message = "Brand is required"))]
    pub brand: String,
    #[validate(length(min = 1, message = "Model is required"))]
    pub model: String,
    #[validate(range(min = 1950, message = "Year must be 1950 or later"))]
    pub year: Option<i32>,
    #[validate(custom(function = "non_negative"))]
    pub daily_rate: Decimal,
    pub city: Option<String>,
    #[validate(range(min = 1))]
    pub minimum_rental_days: Option<i32>,
    #[validate(range(min = 1))]
    pub maximum_rental_days: Option<i32>,
}

/// Update equipment request
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_rental_days_update"))]
pub struct UpdateEquipment {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 1000, message = "Description must be 1-1000 characters"))]
    pub description: Option<String>,
    pub category: Option<EquipmentCategory>,
    pub brand: Option<String>,
    pub model: Option<String>,
    #[validate(range(min = 1950, message = "Year must be 1950 or later"))]
    pub year: Option<i32>,
    #[validate(custom(function = "non_negative"))]
    pub daily_rate: Option<Decimal>,
    pub city: Option<String>,
    pub status: Option<EquipmentStatus>,
    #[validate(range(min = 1))]
    pub minimum_rental_days: Option<i32>,
    #[validate(range(min = 1))]
    pub maximum_rental_days: Option<i32>,
}

/// Equipment listing filter
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct EquipmentQuery {
    pub status: Option<EquipmentStatus>,
    pub category: Option<EquipmentCategory>,
}

/// Availability check parameters
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AvailabilityQuery {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

/// Availability answer for one equipment, optionally over a period
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AvailabilityQuote {
    pub equipment_id: Uuid,
    pub status: EquipmentStatus,
    pub available: bool,
    /// Whether an approved or active reservation overlaps the period
    pub conflicts: bool,
    pub days: Option<i32>,
    /// Rental cost without delivery
    pub estimated_cost: Option<Decimal>,
}

fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() {
        return Err(ValidationError::new("daily_rate must not be negative"));
    }
    Ok(())
}

fn check_rental_days(min: Option<i32>, max: Option<i32>) -> Result<(), ValidationError> {
    match (min, max) {
        (Some(min), Some(max)) if min > max => Err(ValidationError::new(
            "minimum_rental_days must not exceed maximum_rental_days",
        )),
        _ => Ok(()),
    }
}

fn validate_rental_days_create(data: &CreateEquipment) -> Result<(), ValidationError> {
    check_rental_days(data.minimum_rental_days, data.maximum_rental_days)
}

fn validate_rental_days_update(data: &UpdateEquipment) -> Result<(), ValidationError> {
    check_rental_days(data.minimum_rental_days, data.maximum_rental_days)
}

impl Equipment {
    pub fn is_available(&self) -> bool {
        self.status == EquipmentStatus::Available
    }

    /// Build a new record from a create request
    pub fn from_request(data: &CreateEquipment, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: data.name.clone(),
            description: data.description.clone(),
            category: data.category,
            brand: data.brand.clone(),
            model: data.model.clone(),
            year: data.year,
            daily_rate: data.daily_rate,
            city: data.city.clone(),
            status: EquipmentStatus::Available,
            minimum_rental_days: data.minimum_rental_days.unwrap_or(1),
            maximum_rental_days: data.maximum_rental_days.unwrap_or(30),
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update in place
    pub fn apply(&mut self, data: &UpdateEquipment, now: DateTime<Utc>) {
        macro_rules! set_field {
            ($field:ident) => {
                if let Some(ref value) = data.$field {
                    self.$field = value.clone();
                }
            };
        }

        set_field!(name);
        set_field!(description);
        set_field!(category);
        set_field!(brand);
        set_field!(model);
        set_field!(daily_rate);
        set_field!(status);
        set_field!(minimum_rental_days);
        set_field!(maximum_rental_days);
        if data.year.is_some() {
            self.year = data.year;
        }
        if data.city.is_some() {
            self.city = data.city.clone();
        }
        self.updated_at = now;
    }
}
