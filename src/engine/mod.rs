//! Aggregation and reporting over record snapshots.
//!
//! Everything here is synchronous and side-effect free: callers fetch a
//! snapshot of records and locations from the stores and pass it in.

pub mod aggregate;
pub mod directory;
pub mod export;
pub mod filter;

pub use aggregate::{DailyStats, MonthlyStats, PeriodFilter, PeriodReport};
pub use directory::LocationDirectory;
pub use export::ReportTable;
pub use filter::{RecordFilter, RecordPage};
