//! Authentication service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::{RegisterUser, Role, User, UserClaims},
    repository::Stores,
};

#[derive(Clone)]
pub struct AuthService {
    stores: Stores,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(stores: Stores, config: AuthConfig) -> Self {
        Self { stores, config }
    }

    /// Authenticate by email and password, returning a JWT and the user
    pub async fn authenticate(&self, email: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .stores
            .users
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid email or password".to_string()))?;

        if !verify_password(&user, password)? {
            tracing::info!("Failed login for {}", email);
            return Err(AppError::Authentication("Invalid email or password".to_string()));
        }

        if !user.is_active {
            return Err(AppError::Authentication("Account is disabled".to_string()));
        }

        let token = self.create_token_for_user(&user)?;
        tracing::info!("User {} logged in", user.id);
        Ok((token, user))
    }

    /// Open a client account and log it in
    pub async fn register(&self, data: RegisterUser) -> AppResult<(String, User)> {
        data.validate()?;
        let email = data.email.trim().to_lowercase();
        if self.stores.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::duplicate(format!(
                "An account already exists for {}",
                email
            )));
        }

        let user = User {
            id: Uuid::new_v4(),
            email,
            password_hash: hash_password(&data.password)?,
            first_name: data.first_name.trim().to_string(),
            last_name: data.last_name.trim().to_string(),
            phone: data.phone,
            role: Role::Client,
            is_active: true,
            created_at: Utc::now(),
        };
        self.stores.users.insert(&user).await?;
        tracing::info!("Registered client {} ({})", user.email, user.id);

        let token = self.create_token_for_user(&user)?;
        Ok((token, user))
    }

    /// Create the configured admin account unless that email is already taken
    pub async fn bootstrap_admin(&self) -> AppResult<()> {
        let (Some(email), Some(password)) = (&self.config.admin_email, &self.config.admin_password)
        else {
            return Ok(());
        };
        if self.stores.users.find_by_email(email).await?.is_some() {
            return Ok(());
        }

        let admin = User {
            id: Uuid::new_v4(),
            email: email.clone(),
            password_hash: hash_password(password)?,
            first_name: "Admin".to_string(),
            last_name: String::new(),
            phone: None,
            role: Role::Admin,
            is_active: true,
            created_at: Utc::now(),
        };
        self.stores.users.insert(&admin).await?;
        tracing::info!("Created admin account {} ({})", admin.email, admin.id);
        Ok(())
    }

    pub async fn get_user(&self, id: Uuid) -> AppResult<User> {
        self.stores.users.get(id).await
    }

    fn create_token_for_user(&self, user: &User) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let claims = UserClaims {
            sub: user.email.clone(),
            user_id: user.id,
            role: user.role,
            exp: now + (self.config.jwt_expiration_hours as i64 * 3600),
            iat: now,
        };
        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }
}

fn verify_password(user: &User, password: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Hash a password using Argon2
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}
