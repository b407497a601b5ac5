//! Tourism Visitors Server
//!
//! Check-in logging for tourist sites and the visitor statistics built on
//! top of it: daily and monthly counts, period reports and CSV exports,
//! served as a REST JSON API.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod engine;
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
}
