//! Profile repository

use crate::db::DynDatabasePool;
use crate::models::Profile;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Get the profile of a user
    async fn get_by_user(&self, user_id: i64) -> Result<Option<Profile>>;

    /// Insert or replace the profile row
    async fn upsert(&self, profile: &Profile) -> Result<Profile>;
}

pub struct SqlxProfileRepository {
    pool: DynDatabasePool,
}

impl SqlxProfileRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn ProfileRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl ProfileRepository for SqlxProfileRepository {
    async fn get_by_user(&self, user_id: i64) -> Result<Option<Profile>> {
        get_profile_sqlite(self.pool.sqlite(), user_id).await
    }

    async fn upsert(&self, profile: &Profile) -> Result<Profile> {
        upsert_profile_sqlite(self.pool.sqlite(), profile).await
    }
}

async fn get_profile_sqlite(pool: &SqlitePool, user_id: i64) -> Result<Option<Profile>> {
    let row = sqlx::query("SELECT user_id, bio, avatar, updated_at FROM profiles WHERE user_id = ?")
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .context("Failed to get profile")?;

    Ok(row.map(|row| Profile {
        user_id: row.get("user_id"),
        bio: row.get("bio"),
        avatar: row.get("avatar"),
        updated_at: row.get("updated_at"),
    }))
}

async fn upsert_profile_sqlite(pool: &SqlitePool, profile: &Profile) -> Result<Profile> {
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO profiles (user_id, bio, avatar, updated_at)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(user_id) DO UPDATE SET
            bio = excluded.bio,
            avatar = excluded.avatar,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(profile.user_id)
    .bind(&profile.bio)
    .bind(&profile.avatar)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to save profile")?;

    Ok(Profile {
        updated_at: now,
        ..profile.clone()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{SqlxUserRepository, UserRepository};
    use crate::db::{create_test_pool, migrations};
    use crate::models::User;

    #[tokio::test]
    async fn test_upsert_then_update() {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        let user = SqlxUserRepository::new(pool.clone())
            .create(&User::new("p".into(), "p@example.com".into(), "h".into()))
            .await
            .unwrap();
        let repo = SqlxProfileRepository::new(pool);

        assert!(repo.get_by_user(user.id).await.unwrap().is_none());

        repo.upsert(&Profile::empty(user.id)).await.unwrap();
        let mut profile = repo.get_by_user(user.id).await.unwrap().unwrap();
        assert_eq!(profile.bio, "");

        profile.bio = "Writes about trains".to_string();
        profile.avatar = Some("avatars/p.png".to_string());
        repo.upsert(&profile).await.unwrap();

        let stored = repo.get_by_user(user.id).await.unwrap().unwrap();
        assert_eq!(stored.bio, "Writes about trains");
        assert_eq!(stored.avatar.as_deref(), Some("avatars/p.png"));
    }
}
