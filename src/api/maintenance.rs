//! Maintenance endpoints (admin only)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        maintenance::{
            CancelMaintenance, CompleteMaintenance, CreateMaintenance, StartMaintenance,
            UpdateMaintenance,
        },
        Maintenance,
    },
};

use super::AuthenticatedUser;

/// Schedule maintenance
#[utoipa::path(
    post,
    path = "/maintenance",
    tag = "maintenance",
    security(("bearer_auth" = [])),
    request_body = CreateMaintenance,
    responses(
        (status = 201, description = "Maintenance scheduled", body = Maintenance),
        (status = 404, description = "Equipment or technician not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_maintenance(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateMaintenance>,
) -> AppResult<(StatusCode, Json<Maintenance>)> {
    claims.require_admin()?;
    let maintenance = state
        .services
        .maintenance
        .create(claims.user_id, data)
        .await?;
    Ok((StatusCode::CREATED, Json(maintenance)))
}

/// Get maintenance by ID
#[utoipa::path(
    get,
    path = "/maintenance/{id}",
    tag = "maintenance",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Maintenance ID")),
    responses(
        (status = 200, description = "Maintenance", body = Maintenance),
        (status = 404, description = "Maintenance not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_maintenance(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Maintenance>> {
    claims.require_admin()?;
    let maintenance = state.services.maintenance.get(id).await?;
    Ok(Json(maintenance))
}

/// Edit scheduled maintenance
#[utoipa::path(
    put,
    path = "/maintenance/{id}",
    tag = "maintenance",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Maintenance ID")),
    request_body = UpdateMaintenance,
    responses(
        (status = 200, description = "Maintenance updated", body = Maintenance),
        (status = 404, description = "Maintenance or technician not found", body = crate::error::ErrorResponse),
        (status = 409, description = "No longer scheduled", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_maintenance(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(data): Json<UpdateMaintenance>,
) -> AppResult<Json<Maintenance>> {
    claims.require_admin()?;
    let maintenance = state.services.maintenance.update(id, data).await?;
    Ok(Json(maintenance))
}

/// Start scheduled maintenance
#[utoipa::path(
    patch,
    path = "/maintenance/{id}/start",
    tag = "maintenance",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Maintenance ID")),
    request_body = StartMaintenance,
    responses(
        (status = 200, description = "Maintenance started", body = Maintenance),
        (status = 409, description = "Not scheduled", body = crate::error::ErrorResponse)
    )
)]
pub async fn start_maintenance(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    body: Option<Json<StartMaintenance>>,
) -> AppResult<Json<Maintenance>> {
    claims.require_admin()?;
    let data = body.map(|Json(data)| data).unwrap_or_default();
    let maintenance = state
        .services
        .maintenance
        .start(id, data.technician_id, claims.user_id)
        .await?;
    Ok(Json(maintenance))
}

/// Complete maintenance in progress
#[utoipa::path(
    patch,
    path = "/maintenance/{id}/complete",
    tag = "maintenance",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Maintenance ID")),
    request_body = CompleteMaintenance,
    responses(
        (status = 200, description = "Maintenance completed", body = Maintenance),
        (status = 409, description = "Not in progress", body = crate::error::ErrorResponse)
    )
)]
pub async fn complete_maintenance(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    body: Option<Json<CompleteMaintenance>>,
) -> AppResult<Json<Maintenance>> {
    claims.require_admin()?;
    let data = body.map(|Json(data)| data).unwrap_or_default();
    let maintenance = state.services.maintenance.complete(id, data).await?;
    Ok(Json(maintenance))
}

/// Cancel scheduled or running maintenance
#[utoipa::path(
    patch,
    path = "/maintenance/{id}/cancel",
    tag = "maintenance",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Maintenance ID")),
    request_body = CancelMaintenance,
    responses(
        (status = 200, description = "Maintenance cancelled", body = Maintenance),
        (status = 409, description = "Already completed or cancelled", body = crate::error::ErrorResponse)
    )
)]
pub async fn cancel_maintenance(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    body: Option<Json<CancelMaintenance>>,
) -> AppResult<Json<Maintenance>> {
    claims.require_admin()?;
    let data = body.map(|Json(data)| data).unwrap_or_default();
    let maintenance = state.services.maintenance.cancel(id, data).await?;
    Ok(Json(maintenance))
}

/// Scheduled maintenance whose date has passed
#[utoipa::path(
    get,
    path = "/maintenance/overdue",
    tag = "maintenance",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Overdue maintenance", body = Vec<Maintenance>)
    )
)]
pub async fn list_overdue(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Maintenance>>> {
    claims.require_admin()?;
    let overdue = state.services.maintenance.overdue().await?;
    Ok(Json(overdue))
}
