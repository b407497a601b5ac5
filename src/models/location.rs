//! Tourism location model

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::{AppError, AppResult};

static LOCATION_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z0-9]{2,10}$").unwrap());

/// Normalize a location code (trim + uppercase) and check its shape
pub fn normalize_location_code(code: &str) -> AppResult<String> {
    let code = code.trim().to_uppercase();
    if code.is_empty() {
        return Err(AppError::Validation("location_code is required".to_string()));
    }
    if !LOCATION_CODE.is_match(&code) {
        return Err(AppError::Validation(format!(
            "Invalid location_code '{}' (2-10 characters, A-Z and 0-9)",
            code
        )));
    }
    Ok(code)
}

/// A tourist site where visitors check in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Location {
    /// Unique uppercase code (primary key)
    #[sqlx(rename = "location_code")]
    pub code: String,
    /// Display name
    pub name: String,
    pub address: Option<String>,
    /// Inactive locations accept no new check-ins
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Create location request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateLocation {
    pub code: String,
    #[validate(length(min = 1, max = 255, message = "name must be 1-255 characters"))]
    pub name: String,
    pub address: Option<String>,
}

/// Update location request
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateLocation {
    #[validate(length(min = 1, max = 255, message = "name must be 1-255 characters"))]
    pub name: Option<String>,
    pub address: Option<String>,
    pub is_active: Option<bool>,
}

/// Query parameters for listing locations
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct LocationQuery {
    /// Include soft-deleted locations
    #[serde(default)]
    pub include_inactive: bool,
}

/// QR payload for a location's public form
#[derive(Debug, Serialize, ToSchema)]
pub struct QrPayload {
    pub location_code: String,
    pub location_name: String,
    pub form_type: String,
    /// URL to encode in the QR image
    pub url: String,
}
