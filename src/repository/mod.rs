//! Record store access.
//!
//! Services talk to storage only through the [`RecordStore`] and
//! [`LocationStore`] traits, which are injected through [`Repository`].

pub mod locations;
pub mod memory;
pub mod visitor_records;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{
        location::{CreateLocation, Location, UpdateLocation},
        visitor_record::{NewVisitorRecord, RecordChanges, VisitorRecord},
    },
};

/// Keyed storage of check-in records
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Consistent snapshot of every record
    async fn list_all(&self) -> AppResult<Vec<VisitorRecord>>;

    async fn get(&self, id: i64) -> AppResult<Option<VisitorRecord>>;

    /// Persist a new record; the store assigns the id
    async fn insert(&self, record: &NewVisitorRecord) -> AppResult<VisitorRecord>;

    /// Apply edits atomically; `None` when the id does not exist
    async fn update(&self, id: i64, changes: &RecordChanges) -> AppResult<Option<VisitorRecord>>;

    /// `false` when the id does not exist
    async fn delete(&self, id: i64) -> AppResult<bool>;

    async fn count(&self) -> AppResult<i64>;
}

/// Keyed storage of tourism locations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LocationStore: Send + Sync {
    async fn list(&self, include_inactive: bool) -> AppResult<Vec<Location>>;

    /// Lookup by code, active or not
    async fn get(&self, code: &str) -> AppResult<Option<Location>>;

    /// Fails with `Conflict` when the code is taken
    async fn insert(&self, code: &str, data: &CreateLocation) -> AppResult<Location>;

    async fn update(&self, code: &str, data: &UpdateLocation) -> AppResult<Option<Location>>;

    /// Soft delete; `false` when the code does not exist
    async fn deactivate(&self, code: &str) -> AppResult<bool>;
}

/// Store handles shared by all services
#[derive(Clone)]
pub struct Repository {
    pub records: Arc<dyn RecordStore>,
    pub locations: Arc<dyn LocationStore>,
}

impl Repository {
    pub fn new(records: Arc<dyn RecordStore>, locations: Arc<dyn LocationStore>) -> Self {
        Self { records, locations }
    }

    /// PostgreSQL-backed stores
    pub fn postgres(pool: Pool<Postgres>) -> Self {
        Self {
            records: Arc::new(visitor_records::PgRecordStore::new(pool.clone())),
            locations: Arc::new(locations::PgLocationStore::new(pool)),
        }
    }

    /// Process-local stores, empty at start
    pub fn in_memory() -> Self {
        Self {
            records: Arc::new(memory::MemoryRecordStore::default()),
            locations: Arc::new(memory::MemoryLocationStore::default()),
        }
    }
}
