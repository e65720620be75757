//! Location repository

use crate::db::DynDatabasePool;
use crate::models::{CreateLocationInput, Location};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

#[async_trait]
pub trait LocationRepository: Send + Sync {
    async fn create(&self, input: &CreateLocationInput) -> Result<Location>;

    async fn get_by_id(&self, id: i64) -> Result<Option<Location>>;

    /// All locations ordered by name
    async fn list(&self) -> Result<Vec<Location>>;

    /// Returns `None` if the location does not exist
    async fn set_published(&self, id: i64, is_published: bool) -> Result<Option<Location>>;
}

pub struct SqlxLocationRepository {
    pool: DynDatabasePool,
}

impl SqlxLocationRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn LocationRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl LocationRepository for SqlxLocationRepository {
    async fn create(&self, input: &CreateLocationInput) -> Result<Location> {
        let now = Utc::now();
        let is_published = input.is_published.unwrap_or(true);

        let result = sqlx::query(
            "INSERT INTO locations (name, is_published, created_at) VALUES (?, ?, ?)",
        )
        .bind(&input.name)
        .bind(is_published)
        .bind(now)
        .execute(self.pool.sqlite())
        .await
        .context("Failed to create location")?;

        Ok(Location {
            id: result.last_insert_rowid(),
            name: input.name.clone(),
            is_published,
            created_at: now,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Location>> {
        get_location_sqlite(self.pool.sqlite(), id).await
    }

    async fn list(&self) -> Result<Vec<Location>> {
        let rows = sqlx::query(
            "SELECT id, name, is_published, created_at FROM locations ORDER BY name ASC, id ASC",
        )
        .fetch_all(self.pool.sqlite())
        .await
        .context("Failed to list locations")?;

        Ok(rows.iter().map(row_to_location_sqlite).collect())
    }

    async fn set_published(&self, id: i64, is_published: bool) -> Result<Option<Location>> {
        let pool = self.pool.sqlite();
        let result = sqlx::query("UPDATE locations SET is_published = ? WHERE id = ?")
            .bind(is_published)
            .bind(id)
            .execute(pool)
            .await
            .context("Failed to update location")?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        get_location_sqlite(pool, id).await
    }
}

async fn get_location_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Location>> {
    let row = sqlx::query("SELECT id, name, is_published, created_at FROM locations WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get location by ID")?;

    Ok(row.as_ref().map(row_to_location_sqlite))
}

fn row_to_location_sqlite(row: &sqlx::sqlite::SqliteRow) -> Location {
    Location {
        id: row.get("id"),
        name: row.get("name"),
        is_published: row.get("is_published"),
        created_at: row.get("created_at"),
    }
}
