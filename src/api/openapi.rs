//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, equipment, health, maintenance, reservations};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Equipment Rental API",
        version = "1.0.0",
        description = "Construction equipment rental REST API"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::register,
        auth::login,
        auth::me,
        // Equipment
        equipment::list_equipment,
        equipment::get_equipment,
        equipment::check_availability,
        equipment::create_equipment,
        equipment::update_equipment,
        equipment::delete_equipment,
        // Reservations
        reservations::create_reservation,
        reservations::get_reservation,
        reservations::list_active,
        reservations::approve_reservation,
        reservations::reject_reservation,
        reservations::cancel_reservation,
        reservations::complete_reservation,
        // Maintenance
        maintenance::create_maintenance,
        maintenance::get_maintenance,
        maintenance::update_maintenance,
        maintenance::start_maintenance,
        maintenance::complete_maintenance,
        maintenance::cancel_maintenance,
        maintenance::list_overdue,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            auth::UserInfo,
            crate::models::user::RegisterUser,
            crate::models::Role,
            // Equipment
            crate::models::equipment::Equipment,
            crate::models::equipment::CreateEquipment,
            crate::models::equipment::UpdateEquipment,
            crate::models::equipment::EquipmentQuery,
            crate::models::equipment::AvailabilityQuote,
            crate::models::EquipmentCategory,
            crate::models::EquipmentStatus,
            // Reservations
            crate::models::reservation::Reservation,
            crate::models::reservation::CreateReservation,
            crate::models::reservation::RejectReservation,
            crate::models::reservation::CancelReservation,
            crate::models::reservation::DeliveryAddress,
            crate::models::ReservationStatus,
            crate::models::PaymentStatus,
            // Maintenance
            crate::models::maintenance::Maintenance,
            crate::models::maintenance::CreateMaintenance,
            crate::models::maintenance::UpdateMaintenance,
            crate::models::maintenance::StartMaintenance,
            crate::models::maintenance::CompleteMaintenance,
            crate::models::maintenance::CancelMaintenance,
            crate::models::maintenance::MaintenanceCosts,
            crate::models::MaintenanceStatus,
            crate::models::MaintenanceType,
            crate::models::MaintenancePriority,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "equipment", description = "Equipment catalogue and availability"),
        (name = "reservations", description = "Reservation lifecycle"),
        (name = "maintenance", description = "Maintenance scheduling")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
