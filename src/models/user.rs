//! User model and authentication claims

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::enums::Role;
use crate::error::AppError;

/// User account
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    /// Argon2 hash
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Self-service client registration
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterUser {
    #[validate(length(min = 1, max = 50, message = "First name must be 1-50 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 50, message = "Last name must be 1-50 characters"))]
    pub last_name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    /// At least 8 characters with lower and upper case letters, a digit and a symbol
    #[validate(
        length(min = 8, message = "Password must be at least 8 characters"),
        custom(function = "strong_password")
    )]
    pub password: String,
    #[validate(custom(function = "phone_number"))]
    pub phone: Option<String>,
}

fn strong_password(password: &str) -> Result<(), ValidationError> {
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password.chars().any(|c| "@$!%*?&".contains(c));
    if has_lower && has_upper && has_digit && has_symbol {
        Ok(())
    } else {
        Err(ValidationError::new(
            "password needs a lower case letter, an upper case letter, a digit and one of @$!%*?&",
        ))
    }
}

fn phone_number(phone: &str) -> Result<(), ValidationError> {
    let digits = phone.trim_start_matches('+');
    if !digits.is_empty()
        && digits
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '-' | '(' | ')' | ' '))
    {
        Ok(())
    } else {
        Err(ValidationError::new("invalid phone number"))
    }
}

/// JWT claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: Uuid,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Require admin privileges
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Authorization("Administrator privileges required".to_string()))
        }
    }

    /// Admins see everything, clients only what they own
    pub fn can_access(&self, owner_id: Uuid) -> bool {
        self.is_admin() || self.user_id == owner_id
    }
}
