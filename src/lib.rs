//! Equipment Rental Server
//!
//! REST JSON API for renting construction equipment: catalogue, reservations
//! with date-conflict checks, maintenance, and a daily lifecycle sweeper.

use std::sync::Arc;

pub mod api;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
    pub repository: repository::Repository,
}
