//! PostgreSQL visitor record store

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use super::RecordStore;
use crate::{
    error::AppResult,
    models::visitor_record::{NewVisitorRecord, RecordChanges, VisitorRecord},
};

const RECORD_COLUMNS: &str = r#"
    r.id, r.record_uuid, r.location_code, l.name AS location_name, r.visitor_name,
    r.male_count, r.female_count, r.visitor_type, r.check_in_time, r.notes, r.source
"#;

#[derive(Clone)]
pub struct PgRecordStore {
    pool: Pool<Postgres>,
}

impl PgRecordStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn list_all(&self) -> AppResult<Vec<VisitorRecord>> {
        let query = format!(
            r#"
            SELECT {}
            FROM visitor_records r
            LEFT JOIN tourism_locations l ON l.location_code = r.location_code
            ORDER BY r.check_in_time DESC, r.id DESC
            "#,
            RECORD_COLUMNS
        );
        let rows = sqlx::query_as::<_, VisitorRecord>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn get(&self, id: i64) -> AppResult<Option<VisitorRecord>> {
        let query = format!(
            r#"
            SELECT {}
            FROM visitor_records r
            LEFT JOIN tourism_locations l ON l.location_code = r.location_code
            WHERE r.id = $1
            "#,
            RECORD_COLUMNS
        );
        let row = sqlx::query_as::<_, VisitorRecord>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn insert(&self, record: &NewVisitorRecord) -> AppResult<VisitorRecord> {
        let query = format!(
            r#"
            WITH r AS (
                INSERT INTO visitor_records
                    (record_uuid, location_code, visitor_name, male_count, female_count,
                     visitor_type, check_in_time, notes, source)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                RETURNING *
            )
            SELECT {}
            FROM r
            LEFT JOIN tourism_locations l ON l.location_code = r.location_code
            "#,
            RECORD_COLUMNS
        );
        let row = sqlx::query_as::<_, VisitorRecord>(&query)
            .bind(record.record_uuid)
            .bind(&record.location_code)
            .bind(&record.visitor_name)
            .bind(record.male_count)
            .bind(record.female_count)
            .bind(record.visitor_type.as_str())
            .bind(record.check_in_time)
            .bind(&record.notes)
            .bind(record.source.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update(&self, id: i64, changes: &RecordChanges) -> AppResult<Option<VisitorRecord>> {
        // check_in_time, record_uuid and source are never touched
        let query = format!(
            r#"
            WITH r AS (
                UPDATE visitor_records SET
                    location_code = COALESCE($2, location_code),
                    visitor_name = COALESCE($3, visitor_name),
                    male_count = COALESCE($4, male_count),
                    female_count = COALESCE($5, female_count),
                    visitor_type = COALESCE($6, visitor_type),
                    notes = CASE WHEN $7 THEN $8 ELSE notes END
                WHERE id = $1
                RETURNING *
            )
            SELECT {}
            FROM r
            LEFT JOIN tourism_locations l ON l.location_code = r.location_code
            "#,
            RECORD_COLUMNS
        );
        let row = sqlx::query_as::<_, VisitorRecord>(&query)
            .bind(id)
            .bind(&changes.location_code)
            .bind(&changes.visitor_name)
            .bind(changes.male_count)
            .bind(changes.female_count)
            .bind(changes.visitor_type.map(|vt| vt.as_str()))
            .bind(changes.notes.is_some())
            .bind(changes.notes.clone().flatten())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM visitor_records WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> AppResult<i64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM visitor_records")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }
}
