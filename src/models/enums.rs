//! Shared domain enums

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;

// ---------------------------------------------------------------------------
// VisitorType
// ---------------------------------------------------------------------------

/// Visitor category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum VisitorType {
    Domestic,
    International,
}

impl VisitorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VisitorType::Domestic => "domestic",
            VisitorType::International => "international",
        }
    }

    /// Strict parse; no default is guessed for unknown values
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "domestic" => Some(VisitorType::Domestic),
            "international" => Some(VisitorType::International),
            _ => None,
        }
    }
}

impl std::fmt::Display for VisitorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for VisitorType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VisitorType::parse(s)
            .ok_or_else(|| AppError::Validation(format!("Unknown visitor type '{}'", s)))
    }
}

// ---------------------------------------------------------------------------
// RecordSource
// ---------------------------------------------------------------------------

/// Provenance of a check-in record (informational only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RecordSource {
    Manual,
    Qr,
}

impl RecordSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordSource::Manual => "manual",
            RecordSource::Qr => "qr",
        }
    }
}

impl From<&str> for RecordSource {
    fn from(v: &str) -> Self {
        match v {
            "qr" | "qr_form" => RecordSource::Qr,
            _ => RecordSource::Manual,
        }
    }
}

// ---------------------------------------------------------------------------
// FormType / Gender (public QR form)
// ---------------------------------------------------------------------------

/// Public QR form variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FormType {
    Individual,
    Group,
    Foreign,
}

impl FormType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormType::Individual => "individual",
            FormType::Group => "group",
            FormType::Foreign => "foreign",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Caller role supplied by the identity layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Staff,
    Admin,
}
