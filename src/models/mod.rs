//! Data models for the visitor statistics server

pub mod enums;
pub mod location;
pub mod user;
pub mod visitor_record;

// Re-export commonly used types
pub use enums::{FormType, Gender, RecordSource, Role, VisitorType};
pub use location::Location;
pub use user::UserClaims;
pub use visitor_record::VisitorRecord;
