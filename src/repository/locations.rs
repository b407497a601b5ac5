//! PostgreSQL location store

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use super::LocationStore;
use crate::{
    error::{AppError, AppResult},
    models::location::{CreateLocation, Location, UpdateLocation},
};

#[derive(Clone)]
pub struct PgLocationStore {
    pool: Pool<Postgres>,
}

impl PgLocationStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LocationStore for PgLocationStore {
    async fn list(&self, include_inactive: bool) -> AppResult<Vec<Location>> {
        let rows = sqlx::query_as::<_, Location>(
            r#"
            SELECT location_code, name, address, is_active, created_at
            FROM tourism_locations
            WHERE is_active = TRUE OR $1
            ORDER BY name
            "#,
        )
        .bind(include_inactive)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get(&self, code: &str) -> AppResult<Option<Location>> {
        let row = sqlx::query_as::<_, Location>(
            "SELECT location_code, name, address, is_active, created_at FROM tourism_locations WHERE location_code = $1",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert(&self, code: &str, data: &CreateLocation) -> AppResult<Location> {
        sqlx::query_as::<_, Location>(
            r#"
            INSERT INTO tourism_locations (location_code, name, address)
            VALUES ($1, $2, $3)
            ON CONFLICT (location_code) DO NOTHING
            RETURNING location_code, name, address, is_active, created_at
            "#,
        )
        .bind(code)
        .bind(&data.name)
        .bind(&data.address)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::Conflict(format!("Location code {} is already in use", code)))
    }

    async fn update(&self, code: &str, data: &UpdateLocation) -> AppResult<Option<Location>> {
        let row = sqlx::query_as::<_, Location>(
            r#"
            UPDATE tourism_locations SET
                name = COALESCE($2, name),
                address = COALESCE($3, address),
                is_active = COALESCE($4, is_active)
            WHERE location_code = $1
            RETURNING location_code, name, address, is_active, created_at
            "#,
        )
        .bind(code)
        .bind(&data.name)
        .bind(&data.address)
        .bind(data.is_active)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn deactivate(&self, code: &str) -> AppResult<bool> {
        let result = sqlx::query("UPDATE tourism_locations SET is_active = FALSE WHERE location_code = $1")
            .bind(code)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
