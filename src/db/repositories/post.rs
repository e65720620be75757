//! Post repository
//!
//! Database operations for posts.
//!
//! Listings are driven by a [`PostQuery`]: the whole filter, annotation,
//! ordering and window specification is turned into one SQL statement with
//! `sqlx::QueryBuilder` and bound parameters.

use crate::db::DynDatabasePool;
use crate::models::{
    AuthorInfo, CategoryInfo, CreatePostInput, LocationInfo, Post, PostAnnotation, PostFilter,
    PostOrder, PostQuery, PostSummary, UpdatePostInput,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use std::sync::Arc;

/// Post repository trait
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Create a new post written by `author_id`
    async fn create(&self, author_id: i64, input: &CreatePostInput) -> Result<Post>;

    /// Get post by ID, regardless of visibility
    async fn get_by_id(&self, id: i64) -> Result<Option<Post>>;

    /// Run a listing query
    async fn query(&self, query: &PostQuery) -> Result<Vec<PostSummary>>;

    /// Count posts matching all filters
    async fn count(&self, filters: &[PostFilter]) -> Result<i64>;

    /// Apply a partial update. Returns `None` if the post does not exist.
    async fn update(&self, id: i64, input: &UpdatePostInput) -> Result<Option<Post>>;

    /// Delete a post and, through the foreign key, its comments.
    /// Returns whether a row was removed.
    async fn delete(&self, id: i64) -> Result<bool>;
}

/// SQLx-based post repository implementation
pub struct SqlxPostRepository {
    pool: DynDatabasePool,
}

impl SqlxPostRepository {
    /// Create a new SQLx post repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn PostRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl PostRepository for SqlxPostRepository {
    async fn create(&self, author_id: i64, input: &CreatePostInput) -> Result<Post> {
        create_post_sqlite(self.pool.sqlite(), author_id, input).await
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Post>> {
        get_post_by_id_sqlite(self.pool.sqlite(), id).await
    }

    async fn query(&self, query: &PostQuery) -> Result<Vec<PostSummary>> {
        query_posts_sqlite(self.pool.sqlite(), query).await
    }

    async fn count(&self, filters: &[PostFilter]) -> Result<i64> {
        count_posts_sqlite(self.pool.sqlite(), filters).await
    }

    async fn update(&self, id: i64, input: &UpdatePostInput) -> Result<Option<Post>> {
        update_post_sqlite(self.pool.sqlite(), id, input).await
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(self.pool.sqlite())
            .await
            .context("Failed to delete post")?;

        Ok(result.rows_affected() > 0)
    }
}

// ============================================================================
// Query building
// ============================================================================

const POST_COLUMNS: &str = r#"
    p.id, p.title, p.text, p.pub_date, p.is_published, p.image, p.created_at,
    p.author_id, u.username AS author_username,
    p.category_id, c.slug AS category_slug, c.title AS category_title,
    c.is_published AS category_is_published,
    p.location_id, l.name AS location_name, l.is_published AS location_is_published
"#;

const POST_JOINS: &str = r#"
    FROM posts p
    JOIN users u ON u.id = p.author_id
    LEFT JOIN categories c ON c.id = p.category_id
    LEFT JOIN locations l ON l.id = p.location_id
"#;

/// Public-visibility predicate; the caller binds `now` right after
const PUBLIC_PREDICATE: &str = "p.is_published = 1 AND c.is_published = 1 AND p.pub_date <= ";

fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, filters: &[PostFilter]) {
    qb.push(" WHERE 1 = 1");

    for filter in filters {
        match filter {
            PostFilter::AuthorUsername(username) => {
                qb.push(" AND u.username = ").push_bind(username.clone());
            }
            PostFilter::CategorySlug(slug) => {
                qb.push(" AND c.slug = ").push_bind(slug.clone());
            }
            PostFilter::CategoryPublished => {
                qb.push(" AND c.is_published = 1");
            }
            PostFilter::PubliclyVisible { now } => {
                qb.push(" AND (")
                    .push(PUBLIC_PREDICATE)
                    .push_bind(*now)
                    .push(")");
            }
            PostFilter::VisibleTo { viewer_id, now } => {
                qb.push(" AND (p.author_id = ")
                    .push_bind(*viewer_id)
                    .push(" OR (")
                    .push(PUBLIC_PREDICATE)
                    .push_bind(*now)
                    .push("))");
            }
        }
    }
}

/// Build the full SELECT for a listing query
pub(crate) fn build_post_query(query: &PostQuery) -> QueryBuilder<'static, Sqlite> {
    let mut qb = QueryBuilder::new("SELECT ");
    qb.push(POST_COLUMNS);

    if query.has_annotation(PostAnnotation::CommentCount) {
        qb.push(", (SELECT COUNT(*) FROM comments cm WHERE cm.post_id = p.id) AS comment_count");
    }

    qb.push(POST_JOINS);
    push_filters(&mut qb, &query.filters);

    match query.order {
        PostOrder::PubDateDesc => qb.push(" ORDER BY p.pub_date DESC, p.id DESC"),
    };

    if let Some(limit) = query.limit {
        qb.push(" LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(query.offset);
    }

    qb
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_post_sqlite(
    pool: &SqlitePool,
    author_id: i64,
    input: &CreatePostInput,
) -> Result<Post> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO posts (title, text, pub_date, is_published, author_id,
                           category_id, location_id, image, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&input.title)
    .bind(&input.text)
    .bind(input.pub_date.unwrap_or(now))
    .bind(input.is_published.unwrap_or(true))
    .bind(author_id)
    .bind(input.category_id)
    .bind(input.location_id)
    .bind(&input.image)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create post")?;

    let id = result.last_insert_rowid();
    get_post_by_id_sqlite(pool, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Post not found after insert"))
}

async fn get_post_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Post>> {
    let sql = format!("SELECT {} {} WHERE p.id = ?", POST_COLUMNS, POST_JOINS);
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get post by ID")?;

    row.as_ref().map(row_to_post_sqlite).transpose()
}

async fn query_posts_sqlite(pool: &SqlitePool, query: &PostQuery) -> Result<Vec<PostSummary>> {
    let annotated = query.has_annotation(PostAnnotation::CommentCount);
    let rows = build_post_query(query)
        .build()
        .fetch_all(pool)
        .await
        .context("Failed to query posts")?;

    rows.iter()
        .map(|row| -> Result<PostSummary> {
            Ok(PostSummary {
                post: row_to_post_sqlite(row)?,
                comment_count: if annotated {
                    Some(row.try_get("comment_count")?)
                } else {
                    None
                },
            })
        })
        .collect()
}

async fn count_posts_sqlite(pool: &SqlitePool, filters: &[PostFilter]) -> Result<i64> {
    let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) AS count ");
    qb.push(POST_JOINS);
    push_filters(&mut qb, filters);

    let row = qb
        .build()
        .fetch_one(pool)
        .await
        .context("Failed to count posts")?;

    Ok(row.get("count"))
}

async fn update_post_sqlite(
    pool: &SqlitePool,
    id: i64,
    input: &UpdatePostInput,
) -> Result<Option<Post>> {
    let Some(current) = get_post_by_id_sqlite(pool, id).await? else {
        return Ok(None);
    };

    let title = input.title.as_ref().unwrap_or(&current.title);
    let text = input.text.as_ref().unwrap_or(&current.text);
    let pub_date: DateTime<Utc> = input.pub_date.unwrap_or(current.pub_date);
    let is_published = input.is_published.unwrap_or(current.is_published);
    let category_id = input
        .category_id
        .unwrap_or_else(|| current.category.as_ref().map(|c| c.id));
    let location_id = input
        .location_id
        .unwrap_or_else(|| current.location.as_ref().map(|l| l.id));
    let image = input.image.clone().unwrap_or_else(|| current.image.clone());

    sqlx::query(
        r#"
        UPDATE posts
        SET title = ?, text = ?, pub_date = ?, is_published = ?,
            category_id = ?, location_id = ?, image = ?
        WHERE id = ?
        "#,
    )
    .bind(title)
    .bind(text)
    .bind(pub_date)
    .bind(is_published)
    .bind(category_id)
    .bind(location_id)
    .bind(image)
    .bind(id)
    .execute(pool)
    .await
    .context("Failed to update post")?;

    get_post_by_id_sqlite(pool, id).await
}

fn row_to_post_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Post> {
    let category = match row.try_get::<Option<i64>, _>("category_id")? {
        Some(id) => Some(CategoryInfo {
            id,
            slug: row.try_get("category_slug")?,
            title: row.try_get("category_title")?,
            is_published: row.try_get("category_is_published")?,
        }),
        None => None,
    };

    let location = match row.try_get::<Option<i64>, _>("location_id")? {
        Some(id) => Some(LocationInfo {
            id,
            name: row.try_get("location_name")?,
            is_published: row.try_get("location_is_published")?,
        }),
        None => None,
    };

    Ok(Post {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        text: row.try_get("text")?,
        pub_date: row.try_get("pub_date")?,
        is_published: row.try_get("is_published")?,
        author: AuthorInfo {
            id: row.try_get("author_id")?,
            username: row.try_get("author_username")?,
        },
        category,
        location,
        image: row.try_get("image")?,
        created_at: row.try_get("created_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{
        CategoryRepository, CommentRepository, SqlxCategoryRepository, SqlxCommentRepository,
        SqlxUserRepository, UserRepository,
    };
    use crate::db::{create_test_pool, migrations};
    use crate::models::{CreateCategoryInput, User};
    use chrono::Duration;

    struct Fixture {
        repo: SqlxPostRepository,
        comments: SqlxCommentRepository,
        author_id: i64,
        other_id: i64,
        open_cat: i64,
        closed_cat: i64,
    }

    async fn setup() -> Fixture {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let users = SqlxUserRepository::new(pool.clone());
        let author = users
            .create(&User::new("author".into(), "author@example.com".into(), "h".into()))
            .await
            .unwrap();
        let other = users
            .create(&User::new("other".into(), "other@example.com".into(), "h".into()))
            .await
            .unwrap();

        let categories = SqlxCategoryRepository::new(pool.clone());
        let open_cat = categories
            .create(&CreateCategoryInput::new("Open", "open"))
            .await
            .unwrap();
        let closed_cat = categories
            .create(&CreateCategoryInput::new("Closed", "closed").with_published(false))
            .await
            .unwrap();

        Fixture {
            repo: SqlxPostRepository::new(pool.clone()),
            comments: SqlxCommentRepository::new(pool),
            author_id: author.id,
            other_id: other.id,
            open_cat: open_cat.id,
            closed_cat: closed_cat.id,
        }
    }

    fn input(title: &str, category_id: i64, pub_date: DateTime<Utc>) -> CreatePostInput {
        CreatePostInput::new(title, "body")
            .with_category(category_id)
            .with_pub_date(pub_date)
    }

    #[tokio::test]
    async fn test_create_and_get_joins_relations() {
        let f = setup().await;
        let post = f
            .repo
            .create(f.author_id, &CreatePostInput::new("Hello", "World").with_category(f.open_cat))
            .await
            .unwrap();

        assert!(post.id > 0);
        assert_eq!(post.author.username, "author");
        assert_eq!(post.category.as_ref().map(|c| c.slug.as_str()), Some("open"));
        assert!(post.is_published);
        assert!(post.location.is_none());

        let fetched = f.repo.get_by_id(post.id).await.unwrap().unwrap();
        assert_eq!(fetched, post);
        assert!(f.repo.get_by_id(post.id + 100).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_public_filter_excludes_hidden_posts() {
        let f = setup().await;
        let now = Utc::now();
        let past = now - Duration::hours(1);

        f.repo.create(f.author_id, &input("visible", f.open_cat, past)).await.unwrap();
        f.repo
            .create(f.author_id, &input("future", f.open_cat, now + Duration::days(1)))
            .await
            .unwrap();
        f.repo.create(f.author_id, &input("closed", f.closed_cat, past)).await.unwrap();
        f.repo
            .create(f.author_id, &input("draft", f.open_cat, past).with_published(false))
            .await
            .unwrap();
        f.repo
            .create(f.author_id, &CreatePostInput::new("orphan", "body").with_pub_date(past))
            .await
            .unwrap();

        let public = [PostFilter::PubliclyVisible { now }];
        let rows = f
            .repo
            .query(&PostQuery::new().filter(public[0].clone()))
            .await
            .unwrap();
        let titles: Vec<&str> = rows.iter().map(|s| s.post.title.as_str()).collect();

        assert_eq!(titles, vec!["visible"]);
        assert_eq!(f.repo.count(&public).await.unwrap(), 1);

        let own = [PostFilter::VisibleTo {
            viewer_id: f.author_id,
            now,
        }];
        assert_eq!(f.repo.count(&own).await.unwrap(), 5);

        let stranger = [PostFilter::VisibleTo {
            viewer_id: f.other_id,
            now,
        }];
        assert_eq!(f.repo.count(&stranger).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_order_window_and_comment_count() {
        let f = setup().await;
        let base = Utc::now() - Duration::days(30);

        let mut ids = Vec::new();
        for i in 0..5 {
            let post = f
                .repo
                .create(
                    f.author_id,
                    &input(&format!("p{}", i), f.open_cat, base + Duration::hours(i)),
                )
                .await
                .unwrap();
            ids.push(post.id);
        }
        for _ in 0..3 {
            f.comments.create(ids[4], f.other_id, "hi").await.unwrap();
        }

        let query = PostQuery::new()
            .annotate(PostAnnotation::CommentCount)
            .window(2, 0);
        let first = f.repo.query(&query).await.unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].post.title, "p4");
        assert_eq!(first[0].comment_count, Some(3));
        assert_eq!(first[1].post.title, "p3");
        assert_eq!(first[1].comment_count, Some(0));

        let last = f.repo.query(&query.clone().window(2, 4)).await.unwrap();
        assert_eq!(last.len(), 1);
        assert_eq!(last[0].post.title, "p0");

        let plain = f.repo.query(&PostQuery::new()).await.unwrap();
        assert_eq!(plain.len(), 5);
        assert!(plain.iter().all(|s| s.comment_count.is_none()));
    }

    #[tokio::test]
    async fn test_author_and_category_filters() {
        let f = setup().await;
        let past = Utc::now() - Duration::hours(1);
        f.repo.create(f.author_id, &input("a1", f.open_cat, past)).await.unwrap();
        f.repo.create(f.other_id, &input("o1", f.open_cat, past)).await.unwrap();
        f.repo.create(f.other_id, &input("o2", f.closed_cat, past)).await.unwrap();

        let by_author = [PostFilter::AuthorUsername("other".to_string())];
        assert_eq!(f.repo.count(&by_author).await.unwrap(), 2);

        let in_closed = [
            PostFilter::CategorySlug("closed".to_string()),
            PostFilter::CategoryPublished,
        ];
        assert_eq!(f.repo.count(&in_closed).await.unwrap(), 0);

        let in_open = [
            PostFilter::CategorySlug("open".to_string()),
            PostFilter::CategoryPublished,
        ];
        assert_eq!(f.repo.count(&in_open).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_update_partial_and_clear_category() {
        let f = setup().await;
        let post = f
            .repo
            .create(f.author_id, &CreatePostInput::new("Old", "Body").with_category(f.open_cat))
            .await
            .unwrap();

        let updated = f
            .repo
            .update(post.id, &UpdatePostInput::new().with_title("New"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, "New");
        assert_eq!(updated.text, "Body");
        assert!(updated.category.is_some());

        let cleared = f
            .repo
            .update(post.id, &UpdatePostInput::new().with_category(None))
            .await
            .unwrap()
            .unwrap();
        assert!(cleared.category.is_none());

        assert!(f
            .repo
            .update(post.id + 100, &UpdatePostInput::new().with_title("x"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_delete_cascades_comments() {
        let f = setup().await;
        let post = f
            .repo
            .create(f.author_id, &CreatePostInput::new("Doomed", "Body"))
            .await
            .unwrap();
        let comment = f.comments.create(post.id, f.other_id, "bye").await.unwrap();

        assert!(f.repo.delete(post.id).await.unwrap());
        assert!(!f.repo.delete(post.id).await.unwrap());
        assert!(f.comments.get_by_id(comment.id).await.unwrap().is_none());
    }
}
