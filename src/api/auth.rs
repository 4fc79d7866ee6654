//! Authentication endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppResult,
    models::{RegisterUser, Role, User},
};

use super::AuthenticatedUser;

/// Login request
#[derive(Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Public view of the logged-in user
#[derive(Serialize, ToSchema)]
pub struct UserInfo {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            role: user.role,
        }
    }
}

/// Login response
#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    /// JWT bearer token
    pub token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub user: UserInfo,
}

/// Authenticate with email and password
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<crate::AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    request.validate()?;
    let (token, user) = state
        .services
        .auth
        .authenticate(&request.email, &request.password)
        .await?;

    Ok(Json(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_in: state.config.auth.jwt_expiration_hours * 3600,
        user: user.into(),
    }))
}

/// Create a client account and return a session for it
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = RegisterUser,
    responses(
        (status = 201, description = "Account created", body = LoginResponse),
        (status = 400, description = "Invalid registration data", body = crate::error::ErrorResponse),
        (status = 409, description = "Email already registered", body = crate::error::ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<crate::AppState>,
    Json(request): Json<RegisterUser>,
) -> AppResult<(StatusCode, Json<LoginResponse>)> {
    let (token, user) = state.services.auth.register(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(LoginResponse {
            token,
            token_type: "Bearer".to_string(),
            expires_in: state.config.auth.jwt_expiration_hours * 3600,
            user: user.into(),
        }),
    ))
}

/// Current user
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = UserInfo),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn me(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<UserInfo>> {
    let user = state.services.auth.get_user(claims.user_id).await?;
    Ok(Json(user.into()))
}
