//! Comment repository
//!
//! Database operations for comments. Comments of a post are always listed
//! oldest first.

use crate::db::DynDatabasePool;
use crate::models::{AuthorInfo, Comment};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Comment repository trait
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Create a comment on `post_id` written by `author_id`
    async fn create(&self, post_id: i64, author_id: i64, text: &str) -> Result<Comment>;

    /// Get comment by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Comment>>;

    /// All comments of a post, `created_at` ascending
    async fn list_by_post(&self, post_id: i64) -> Result<Vec<Comment>>;

    /// Number of comments of a post
    async fn count_by_post(&self, post_id: i64) -> Result<i64>;

    /// Replace the text. Returns `None` if the comment does not exist.
    async fn update_text(&self, id: i64, text: &str) -> Result<Option<Comment>>;

    /// Returns whether a row was removed
    async fn delete(&self, id: i64) -> Result<bool>;
}

/// SQLx-based comment repository implementation
pub struct SqlxCommentRepository {
    pool: DynDatabasePool,
}

impl SqlxCommentRepository {
    /// Create a new SQLx comment repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn CommentRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CommentRepository for SqlxCommentRepository {
    async fn create(&self, post_id: i64, author_id: i64, text: &str) -> Result<Comment> {
        create_comment_sqlite(self.pool.sqlite(), post_id, author_id, text).await
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Comment>> {
        get_comment_by_id_sqlite(self.pool.sqlite(), id).await
    }

    async fn list_by_post(&self, post_id: i64) -> Result<Vec<Comment>> {
        list_comments_by_post_sqlite(self.pool.sqlite(), post_id).await
    }

    async fn count_by_post(&self, post_id: i64) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM comments WHERE post_id = ?")
            .bind(post_id)
            .fetch_one(self.pool.sqlite())
            .await
            .context("Failed to count comments")?;

        Ok(row.get("count"))
    }

    async fn update_text(&self, id: i64, text: &str) -> Result<Option<Comment>> {
        let pool = self.pool.sqlite();
        let result = sqlx::query("UPDATE comments SET text = ? WHERE id = ?")
            .bind(text)
            .bind(id)
            .execute(pool)
            .await
            .context("Failed to update comment")?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        get_comment_by_id_sqlite(pool, id).await
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id)
            .execute(self.pool.sqlite())
            .await
            .context("Failed to delete comment")?;

        Ok(result.rows_affected() > 0)
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

const COMMENT_SELECT: &str = r#"
    SELECT cm.id, cm.text, cm.post_id, cm.created_at,
           cm.author_id, u.username AS author_username
    FROM comments cm
    JOIN users u ON u.id = cm.author_id
"#;

async fn create_comment_sqlite(
    pool: &SqlitePool,
    post_id: i64,
    author_id: i64,
    text: &str,
) -> Result<Comment> {
    let result = sqlx::query(
        r#"
        INSERT INTO comments (text, post_id, author_id, created_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(text)
    .bind(post_id)
    .bind(author_id)
    .bind(Utc::now())
    .execute(pool)
    .await
    .context("Failed to create comment")?;

    get_comment_by_id_sqlite(pool, result.last_insert_rowid())
        .await?
        .ok_or_else(|| anyhow::anyhow!("Comment not found after insert"))
}

async fn get_comment_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Comment>> {
    let sql = format!("{} WHERE cm.id = ?", COMMENT_SELECT);
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get comment by ID")?;

    Ok(row.as_ref().map(row_to_comment_sqlite))
}

async fn list_comments_by_post_sqlite(pool: &SqlitePool, post_id: i64) -> Result<Vec<Comment>> {
    let sql = format!(
        "{} WHERE cm.post_id = ? ORDER BY cm.created_at ASC, cm.id ASC",
        COMMENT_SELECT
    );
    let rows = sqlx::query(&sql)
        .bind(post_id)
        .fetch_all(pool)
        .await
        .context("Failed to list comments")?;

    Ok(rows.iter().map(row_to_comment_sqlite).collect())
}

fn row_to_comment_sqlite(row: &sqlx::sqlite::SqliteRow) -> Comment {
    Comment {
        id: row.get("id"),
        text: row.get("text"),
        post_id: row.get("post_id"),
        author: AuthorInfo {
            id: row.get("author_id"),
            username: row.get("author_username"),
        },
        created_at: row.get("created_at"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{PostRepository, SqlxPostRepository, SqlxUserRepository, UserRepository};
    use crate::db::{create_test_pool, migrations};
    use crate::models::{CreatePostInput, User};

    async fn setup() -> (SqlxCommentRepository, i64, i64) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool).await.unwrap();
        let user = SqlxUserRepository::new(pool.clone())
            .create(&User::new("c".into(), "c@example.com".into(), "h".into()))
            .await
            .unwrap();
        let post = SqlxPostRepository::new(pool.clone())
            .create(user.id, &CreatePostInput::new("Post", "Body"))
            .await
            .unwrap();
        (SqlxCommentRepository::new(pool), post.id, user.id)
    }

    #[tokio::test]
    async fn test_create_and_list_in_order() {
        let (repo, post_id, user_id) = setup().await;
        let first = repo.create(post_id, user_id, "first").await.unwrap();
        let second = repo.create(post_id, user_id, "second").await.unwrap();

        assert_eq!(first.author.username, "c");
        let listed = repo.list_by_post(post_id).await.unwrap();
        assert_eq!(
            listed.iter().map(|c| c.id).collect::<Vec<_>>(),
            vec![first.id, second.id]
        );
        assert_eq!(repo.count_by_post(post_id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_update_text_and_delete() {
        let (repo, post_id, user_id) = setup().await;
        let comment = repo.create(post_id, user_id, "typo").await.unwrap();

        let edited = repo.update_text(comment.id, "fixed").await.unwrap().unwrap();
        assert_eq!(edited.text, "fixed");
        assert_eq!(edited.created_at, comment.created_at);

        assert!(repo.delete(comment.id).await.unwrap());
        assert!(repo.update_text(comment.id, "gone").await.unwrap().is_none());
        assert_eq!(repo.count_by_post(post_id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_post_rejected() {
        let (repo, post_id, user_id) = setup().await;
        assert!(repo.create(post_id + 100, user_id, "orphan").await.is_err());
    }
}
