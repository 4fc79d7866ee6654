//! Reservation endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        reservation::{CancelReservation, CreateReservation, RejectReservation},
        Reservation,
    },
};

use super::AuthenticatedUser;

/// Request a reservation for the calling user
#[utoipa::path(
    post,
    path = "/reservations",
    tag = "reservations",
    security(("bearer_auth" = [])),
    request_body = CreateReservation,
    responses(
        (status = 201, description = "Reservation created (pending)", body = Reservation),
        (status = 400, description = "Invalid dates or rental length", body = crate::error::ErrorResponse),
        (status = 404, description = "Equipment not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Dates taken or equipment unavailable", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_reservation(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateReservation>,
) -> AppResult<(StatusCode, Json<Reservation>)> {
    let reservation = state
        .services
        .reservations
        .create(claims.user_id, data)
        .await?;
    Ok((StatusCode::CREATED, Json(reservation)))
}

/// Get a reservation (owner or admin)
#[utoipa::path(
    get,
    path = "/reservations/{id}",
    tag = "reservations",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Reservation", body = Reservation),
        (status = 404, description = "Reservation not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_reservation(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Reservation>> {
    let reservation = state.services.reservations.get(id, &claims).await?;
    Ok(Json(reservation))
}

/// Reservations running now
#[utoipa::path(
    get,
    path = "/reservations/active",
    tag = "reservations",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Active reservations", body = Vec<Reservation>),
        (status = 403, description = "Admin only", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_active(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Reservation>>> {
    claims.require_admin()?;
    let reservations = state.services.reservations.active().await?;
    Ok(Json(reservations))
}

/// Approve a pending reservation
#[utoipa::path(
    patch,
    path = "/reservations/{id}/approve",
    tag = "reservations",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Reservation approved", body = Reservation),
        (status = 409, description = "Not pending or dates taken", body = crate::error::ErrorResponse)
    )
)]
pub async fn approve_reservation(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Reservation>> {
    claims.require_admin()?;
    let reservation = state
        .services
        .reservations
        .approve(id, claims.user_id)
        .await?;
    Ok(Json(reservation))
}

/// Reject a pending reservation
#[utoipa::path(
    patch,
    path = "/reservations/{id}/reject",
    tag = "reservations",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Reservation ID")),
    request_body = RejectReservation,
    responses(
        (status = 200, description = "Reservation rejected", body = Reservation),
        (status = 409, description = "Not pending", body = crate::error::ErrorResponse)
    )
)]
pub async fn reject_reservation(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    body: Option<Json<RejectReservation>>,
) -> AppResult<Json<Reservation>> {
    claims.require_admin()?;
    let data = body.map(|Json(data)| data).unwrap_or_default();
    data.validate()?;
    let reservation = state
        .services
        .reservations
        .reject(id, data.rejection_reason)
        .await?;
    Ok(Json(reservation))
}

/// Cancel a pending or approved reservation
#[utoipa::path(
    patch,
    path = "/reservations/{id}/cancel",
    tag = "reservations",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Reservation ID")),
    request_body = CancelReservation,
    responses(
        (status = 200, description = "Reservation cancelled", body = Reservation),
        (status = 404, description = "Reservation not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Already active or terminal", body = crate::error::ErrorResponse)
    )
)]
pub async fn cancel_reservation(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    body: Option<Json<CancelReservation>>,
) -> AppResult<Json<Reservation>> {
    let data = body.map(|Json(data)| data).unwrap_or_default();
    data.validate()?;
    let reservation = state
        .services
        .reservations
        .cancel(id, data.cancellation_reason, &claims)
        .await?;
    Ok(Json(reservation))
}

/// Complete an active reservation
#[utoipa::path(
    patch,
    path = "/reservations/{id}/complete",
    tag = "reservations",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Reservation completed", body = Reservation),
        (status = 409, description = "Not active", body = crate::error::ErrorResponse)
    )
)]
pub async fn complete_reservation(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Reservation>> {
    claims.require_admin()?;
    let reservation = state.services.reservations.complete(id).await?;
    Ok(Json(reservation))
}
