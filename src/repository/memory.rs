//! In-process stores for demo mode and tests

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use indexmap::IndexMap;
use tokio::sync::RwLock;

use super::{LocationStore, RecordStore};
use crate::{
    error::{AppError, AppResult},
    models::{
        location::{CreateLocation, Location, UpdateLocation},
        visitor_record::{NewVisitorRecord, RecordChanges, VisitorRecord},
    },
};

#[derive(Default)]
struct RecordTable {
    next_id: i64,
    rows: BTreeMap<i64, VisitorRecord>,
}

/// Records held in a map behind a single lock; every mutation is atomic
#[derive(Default)]
pub struct MemoryRecordStore {
    table: RwLock<RecordTable>,
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn list_all(&self) -> AppResult<Vec<VisitorRecord>> {
        let table = self.table.read().await;
        Ok(table.rows.values().cloned().collect())
    }

    async fn get(&self, id: i64) -> AppResult<Option<VisitorRecord>> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn insert(&self, record: &NewVisitorRecord) -> AppResult<VisitorRecord> {
        let mut table = self.table.write().await;
        table.next_id += 1;
        let stored = VisitorRecord {
            id: table.next_id,
            record_uuid: record.record_uuid,
            location_code: record.location_code.clone(),
            location_name: None,
            visitor_name: record.visitor_name.clone(),
            male_count: record.male_count,
            female_count: record.female_count,
            visitor_type: record.visitor_type.as_str().to_string(),
            check_in_time: record.check_in_time,
            notes: record.notes.clone(),
            source: record.source,
        };
        table.rows.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, id: i64, changes: &RecordChanges) -> AppResult<Option<VisitorRecord>> {
        let mut table = self.table.write().await;
        Ok(table.rows.get_mut(&id).map(|record| {
            changes.apply_to(record);
            record.clone()
        }))
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        Ok(self.table.write().await.rows.remove(&id).is_some())
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.table.read().await.rows.len() as i64)
    }
}

/// Locations keyed by code, in insertion order
#[derive(Default)]
pub struct MemoryLocationStore {
    rows: RwLock<IndexMap<String, Location>>,
}

#[async_trait]
impl LocationStore for MemoryLocationStore {
    async fn list(&self, include_inactive: bool) -> AppResult<Vec<Location>> {
        let rows = self.rows.read().await;
        let mut locations: Vec<Location> = rows
            .values()
            .filter(|l| include_inactive || l.is_active)
            .cloned()
            .collect();
        locations.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(locations)
    }

    async fn get(&self, code: &str) -> AppResult<Option<Location>> {
        Ok(self.rows.read().await.get(code).cloned())
    }

    async fn insert(&self, code: &str, data: &CreateLocation) -> AppResult<Location> {
        let mut rows = self.rows.write().await;
        if rows.contains_key(code) {
            return Err(AppError::Conflict(format!(
                "Location code {} is already in use",
                code
            )));
        }
        let location = Location {
            code: code.to_string(),
            name: data.name.clone(),
            address: data.address.clone(),
            is_active: true,
            created_at: Utc::now(),
        };
        rows.insert(code.to_string(), location.clone());
        Ok(location)
    }

    async fn update(&self, code: &str, data: &UpdateLocation) -> AppResult<Option<Location>> {
        let mut rows = self.rows.write().await;
        Ok(rows.get_mut(code).map(|location| {
            if let Some(ref name) = data.name {
                location.name = name.clone();
            }
            if let Some(ref address) = data.address {
                location.address = Some(address.clone());
            }
            if let Some(active) = data.is_active {
                location.is_active = active;
            }
            location.clone()
        }))
    }

    async fn deactivate(&self, code: &str) -> AppResult<bool> {
        let mut rows = self.rows.write().await;
        Ok(match rows.get_mut(code) {
            Some(location) => {
                location.is_active = false;
                true
            }
            None => false,
        })
    }
}
