//! Visitor check-in record model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::enums::{FormType, Gender, RecordSource, VisitorType};
use crate::error::{AppError, AppResult};

/// A single logged visit at a location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct VisitorRecord {
    pub id: i64,
    pub record_uuid: Uuid,
    pub location_code: String,
    /// Resolved from the location directory when the record is read
    #[sqlx(default)]
    pub location_name: Option<String>,
    /// Empty for anonymous group entries
    pub visitor_name: String,
    pub male_count: i32,
    pub female_count: i32,
    /// Raw category as stored (`domestic` or `international`)
    pub visitor_type: String,
    pub check_in_time: DateTime<Utc>,
    pub notes: Option<String>,
    #[sqlx(try_from = "String")]
    pub source: RecordSource,
}

impl VisitorRecord {
    /// Number of people covered by this check-in
    pub fn total_visitors(&self) -> i64 {
        i64::from(self.male_count) + i64::from(self.female_count)
    }

    /// Parsed visitor category; unknown values are reported, never coerced
    pub fn category(&self) -> AppResult<VisitorType> {
        VisitorType::parse(&self.visitor_type).ok_or_else(|| AppError::InvalidVisitorType {
            record_id: self.id,
            value: self.visitor_type.clone(),
        })
    }
}

impl From<String> for RecordSource {
    fn from(v: String) -> Self {
        RecordSource::from(v.as_str())
    }
}

/// Create visitor record request (manual entry)
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateVisitorRecord {
    pub location_code: String,
    #[validate(length(max = 255, message = "visitor_name is too long"))]
    pub visitor_name: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0, message = "male_count must not be negative"))]
    pub male_count: i32,
    #[serde(default)]
    #[validate(range(min = 0, message = "female_count must not be negative"))]
    pub female_count: i32,
    /// `domestic` (default) or `international`
    pub visitor_type: Option<String>,
    #[validate(length(max = 1000, message = "notes are too long"))]
    pub notes: Option<String>,
}

/// Update visitor record request; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateVisitorRecord {
    pub location_code: Option<String>,
    #[validate(length(max = 255, message = "visitor_name is too long"))]
    pub visitor_name: Option<String>,
    #[validate(range(min = 0, message = "male_count must not be negative"))]
    pub male_count: Option<i32>,
    #[validate(range(min = 0, message = "female_count must not be negative"))]
    pub female_count: Option<i32>,
    pub visitor_type: Option<String>,
    #[validate(length(max = 1000, message = "notes are too long"))]
    pub notes: Option<String>,
}

/// Public QR form submission
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct QrCheckIn {
    pub location_code: String,
    pub form_type: FormType,
    #[validate(length(max = 255, message = "visitor_name is too long"))]
    pub visitor_name: Option<String>,
    #[validate(length(max = 255, message = "group_name is too long"))]
    pub group_name: Option<String>,
    pub gender: Option<Gender>,
    #[validate(range(min = 0, message = "male_count must not be negative"))]
    pub male_count: Option<i32>,
    #[validate(range(min = 0, message = "female_count must not be negative"))]
    pub female_count: Option<i32>,
    pub identity_number: Option<String>,
    pub passport_number: Option<String>,
    #[validate(length(max = 1000, message = "notes are too long"))]
    pub notes: Option<String>,
}

/// Response to a QR check-in
#[derive(Debug, Serialize, ToSchema)]
pub struct QrCheckInResponse {
    pub id: i64,
    pub location_code: String,
    pub form_type: FormType,
}

/// Validated record ready for insertion; the store assigns the id
#[derive(Debug, Clone, PartialEq)]
pub struct NewVisitorRecord {
    pub record_uuid: Uuid,
    pub location_code: String,
    pub visitor_name: String,
    pub male_count: i32,
    pub female_count: i32,
    pub visitor_type: VisitorType,
    pub check_in_time: DateTime<Utc>,
    pub notes: Option<String>,
    pub source: RecordSource,
}

/// Validated set of edits; `None` keeps the stored value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordChanges {
    pub location_code: Option<String>,
    pub visitor_name: Option<String>,
    pub male_count: Option<i32>,
    pub female_count: Option<i32>,
    pub visitor_type: Option<VisitorType>,
    /// `Some(None)` clears the notes
    pub notes: Option<Option<String>>,
}

impl RecordChanges {
    /// Apply the edits to a stored record. `id`, `check_in_time` and `source` never change.
    pub fn apply_to(&self, record: &mut VisitorRecord) {
        if let Some(ref code) = self.location_code {
            record.location_code = code.clone();
        }
        if let Some(ref name) = self.visitor_name {
            record.visitor_name = name.clone();
        }
        if let Some(male) = self.male_count {
            record.male_count = male;
        }
        if let Some(female) = self.female_count {
            record.female_count = female;
        }
        if let Some(vt) = self.visitor_type {
            record.visitor_type = vt.as_str().to_string();
        }
        if let Some(ref notes) = self.notes {
            record.notes = notes.clone();
        }
    }
}
