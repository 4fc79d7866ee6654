//! Error types for the rental server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error codes returned in every error payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    NotAuthorized = 2,
    DbFailure = 3,
    NotFound = 4,
    BadValue = 5,
    InvalidTransition = 6,
    DatesConflict = 7,
    EquipmentUnavailable = 8,
    Duplicate = 9,
}

/// Why a request collided with existing bookings or equipment state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// The requested interval overlaps an approved or active reservation
    DatesOverlap,
    /// The equipment itself cannot be booked (rented, in maintenance, disabled)
    EquipmentUnavailable,
    /// A unique value (account email) is already taken
    Duplicate,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Conflict: {1}")]
    Conflict(ConflictKind, String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn dates_conflict(msg: impl Into<String>) -> Self {
        AppError::Conflict(ConflictKind::DatesOverlap, msg.into())
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        AppError::Conflict(ConflictKind::EquipmentUnavailable, msg.into())
    }

    pub fn duplicate(msg: impl Into<String>) -> Self {
        AppError::Conflict(ConflictKind::Duplicate, msg.into())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Authentication(msg) => {
                (StatusCode::UNAUTHORIZED, ErrorCode::NotAuthorized, msg.clone())
            }
            AppError::Authorization(msg) => {
                (StatusCode::FORBIDDEN, ErrorCode::NotAuthorized, msg.clone())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorCode::NotFound, msg.clone()),
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone())
            }
            AppError::InvalidState(msg) => {
                (StatusCode::CONFLICT, ErrorCode::InvalidTransition, msg.clone())
            }
            AppError::Conflict(ConflictKind::DatesOverlap, msg) => {
                (StatusCode::CONFLICT, ErrorCode::DatesConflict, msg.clone())
            }
            AppError::Conflict(ConflictKind::EquipmentUnavailable, msg) => {
                (StatusCode::CONFLICT, ErrorCode::EquipmentUnavailable, msg.clone())
            }
            AppError::Conflict(ConflictKind::Duplicate, msg) => {
                (StatusCode::CONFLICT, ErrorCode::Duplicate, msg.clone())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::DbFailure,
                    "Database error".to_string(),
                )
            }
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone())
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Failure,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
