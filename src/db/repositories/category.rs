//! Category repository
//!
//! Database operations for categories.
//!
//! This module provides:
//! - `CategoryRepository` trait defining the interface for category data access
//! - `SqlxCategoryRepository` implementing the trait on the SQLite pool

use crate::db::DynDatabasePool;
use crate::models::{Category, CreateCategoryInput};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Category repository trait
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Create a new category
    async fn create(&self, input: &CreateCategoryInput) -> Result<Category>;

    /// Get category by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Category>>;

    /// Get category by slug
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>>;

    /// List all categories ordered by title
    async fn list(&self) -> Result<Vec<Category>>;

    /// Publish or hide a category. Returns `None` if it does not exist.
    async fn set_published(&self, id: i64, is_published: bool) -> Result<Option<Category>>;

    /// Delete a category; its posts keep existing without a category.
    /// Returns whether a row was removed.
    async fn delete(&self, id: i64) -> Result<bool>;
}

/// SQLx-based category repository implementation
pub struct SqlxCategoryRepository {
    pool: DynDatabasePool,
}

impl SqlxCategoryRepository {
    /// Create a new SQLx category repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn CategoryRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CategoryRepository for SqlxCategoryRepository {
    async fn create(&self, input: &CreateCategoryInput) -> Result<Category> {
        create_category_sqlite(self.pool.sqlite(), input).await
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Category>> {
        get_category_by_id_sqlite(self.pool.sqlite(), id).await
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        get_category_by_slug_sqlite(self.pool.sqlite(), slug).await
    }

    async fn list(&self) -> Result<Vec<Category>> {
        list_categories_sqlite(self.pool.sqlite()).await
    }

    async fn set_published(&self, id: i64, is_published: bool) -> Result<Option<Category>> {
        let pool = self.pool.sqlite();
        let result = sqlx::query("UPDATE categories SET is_published = ? WHERE id = ?")
            .bind(is_published)
            .bind(id)
            .execute(pool)
            .await
            .context("Failed to update category")?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        get_category_by_id_sqlite(pool, id).await
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(self.pool.sqlite())
            .await
            .context("Failed to delete category")?;

        Ok(result.rows_affected() > 0)
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_category_sqlite(pool: &SqlitePool, input: &CreateCategoryInput) -> Result<Category> {
    let now = Utc::now();
    let is_published = input.is_published.unwrap_or(true);

    let result = sqlx::query(
        r#"
        INSERT INTO categories (title, description, slug, is_published, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&input.title)
    .bind(&input.description)
    .bind(&input.slug)
    .bind(is_published)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create category")?;

    Ok(Category {
        id: result.last_insert_rowid(),
        title: input.title.clone(),
        description: input.description.clone(),
        slug: input.slug.clone(),
        is_published,
        created_at: now,
    })
}

async fn get_category_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Category>> {
    let row = sqlx::query(
        r#"
        SELECT id, title, description, slug, is_published, created_at
        FROM categories
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get category by ID")?;

    Ok(row.as_ref().map(row_to_category_sqlite))
}

async fn get_category_by_slug_sqlite(pool: &SqlitePool, slug: &str) -> Result<Option<Category>> {
    let row = sqlx::query(
        r#"
        SELECT id, title, description, slug, is_published, created_at
        FROM categories
        WHERE slug = ?
        "#,
    )
    .bind(slug)
    .fetch_optional(pool)
    .await
    .context("Failed to get category by slug")?;

    Ok(row.as_ref().map(row_to_category_sqlite))
}

async fn list_categories_sqlite(pool: &SqlitePool) -> Result<Vec<Category>> {
    let rows = sqlx::query(
        r#"
        SELECT id, title, description, slug, is_published, created_at
        FROM categories
        ORDER BY title ASC, id ASC
        "#,
    )
    .fetch_all(pool)
    .await
    .context("Failed to list categories")?;

    Ok(rows.iter().map(row_to_category_sqlite).collect())
}

fn row_to_category_sqlite(row: &sqlx::sqlite::SqliteRow) -> Category {
    Category {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        slug: row.get("slug"),
        is_published: row.get("is_published"),
        created_at: row.get("created_at"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup_test_repo() -> SqlxCategoryRepository {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        SqlxCategoryRepository::new(pool)
    }

    #[tokio::test]
    async fn test_create_and_get_by_slug() {
        let repo = setup_test_repo().await;
        let created = repo
            .create(&CreateCategoryInput::new("Travel", "travel"))
            .await
            .unwrap();

        assert!(created.id > 0);
        assert!(created.is_published);

        let found = repo.get_by_slug("travel").await.unwrap().unwrap();
        assert_eq!(found, created);
        assert!(repo.get_by_slug("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_published() {
        let repo = setup_test_repo().await;
        let created = repo
            .create(&CreateCategoryInput::new("Draft", "draft").with_published(false))
            .await
            .unwrap();
        assert!(!created.is_published);

        let updated = repo.set_published(created.id, true).await.unwrap().unwrap();
        assert!(updated.is_published);
        assert!(repo.set_published(9999, true).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_and_delete() {
        let repo = setup_test_repo().await;
        let b = repo.create(&CreateCategoryInput::new("B", "b")).await.unwrap();
        repo.create(&CreateCategoryInput::new("A", "a")).await.unwrap();

        let titles: Vec<String> = repo.list().await.unwrap().into_iter().map(|c| c.title).collect();
        assert_eq!(titles, vec!["A", "B"]);

        assert!(repo.delete(b.id).await.unwrap());
        assert!(!repo.delete(b.id).await.unwrap());
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }
}
