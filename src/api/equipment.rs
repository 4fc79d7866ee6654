//! Equipment API endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::equipment::{
        AvailabilityQuery, AvailabilityQuote, CreateEquipment, Equipment, EquipmentQuery,
        UpdateEquipment,
    },
};

use super::AuthenticatedUser;

/// List equipment, optionally filtered by status or category
#[utoipa::path(
    get,
    path = "/equipment",
    tag = "equipment",
    params(EquipmentQuery),
    responses(
        (status = 200, description = "Equipment list", body = Vec<Equipment>)
    )
)]
pub async fn list_equipment(
    State(state): State<crate::AppState>,
    Query(query): Query<EquipmentQuery>,
) -> AppResult<Json<Vec<Equipment>>> {
    let equipment = state.services.equipment.list(&query).await?;
    Ok(Json(equipment))
}

/// Get equipment by ID
#[utoipa::path(
    get,
    path = "/equipment/{id}",
    tag = "equipment",
    params(("id" = Uuid, Path, description = "Equipment ID")),
    responses(
        (status = 200, description = "Equipment details", body = Equipment),
        (status = 404, description = "Equipment not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_equipment(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Equipment>> {
    let equipment = state.services.equipment.get_by_id(id).await?;
    Ok(Json(equipment))
}

/// Check availability and estimate the price over a period
#[utoipa::path(
    get,
    path = "/equipment/{id}/availability",
    tag = "equipment",
    params(("id" = Uuid, Path, description = "Equipment ID"), AvailabilityQuery),
    responses(
        (status = 200, description = "Availability", body = AvailabilityQuote),
        (status = 400, description = "End date not after start date", body = crate::error::ErrorResponse),
        (status = 404, description = "Equipment not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn check_availability(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<AvailabilityQuery>,
) -> AppResult<Json<AvailabilityQuote>> {
    let quote = state
        .services
        .availability
        .quote(id, query.start_date, query.end_date)
        .await?;
    Ok(Json(quote))
}

/// Create equipment
#[utoipa::path(
    post,
    path = "/equipment",
    tag = "equipment",
    security(("bearer_auth" = [])),
    request_body = CreateEquipment,
    responses(
        (status = 201, description = "Equipment created", body = Equipment),
        (status = 400, description = "Invalid data", body = crate::error::ErrorResponse),
        (status = 403, description = "Admin only", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_equipment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateEquipment>,
) -> AppResult<(StatusCode, Json<Equipment>)> {
    claims.require_admin()?;
    let equipment = state.services.equipment.create(&data).await?;
    Ok((StatusCode::CREATED, Json(equipment)))
}

/// Update equipment
#[utoipa::path(
    put,
    path = "/equipment/{id}",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Equipment ID")),
    request_body = UpdateEquipment,
    responses(
        (status = 200, description = "Equipment updated", body = Equipment),
        (status = 404, description = "Equipment not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_equipment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(data): Json<UpdateEquipment>,
) -> AppResult<Json<Equipment>> {
    claims.require_admin()?;
    let equipment = state.services.equipment.update(id, &data).await?;
    Ok(Json(equipment))
}

/// Delete equipment
#[utoipa::path(
    delete,
    path = "/equipment/{id}",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Equipment ID")),
    responses(
        (status = 204, description = "Equipment deleted"),
        (status = 409, description = "Equipment has approved or active reservations", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_equipment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;
    state.services.equipment.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
