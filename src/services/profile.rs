//! Profile service
//!
//! Public profile lookup and self-service profile editing. The edited user
//! is always the viewer; there is no way to name another account.

use crate::db::repositories::{ProfileRepository, UserRepository};
use crate::models::{Profile, UpdateProfileInput, UpdateUserInput, User};
use crate::policy::Viewer;
use crate::services::error::{require_text, ServiceError};
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

const NAME_MAX_CHARS: usize = 150;

/// What anyone may see about a user
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProfileView {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub avatar: Option<String>,
    pub joined_at: DateTime<Utc>,
}

impl ProfileView {
    fn new(user: &User, profile: Option<Profile>) -> Self {
        let profile = profile.unwrap_or_else(|| Profile::empty(user.id));
        Self {
            id: user.id,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            bio: profile.bio,
            avatar: profile.avatar,
            joined_at: user.created_at,
        }
    }
}

pub struct ProfileService {
    user_repo: Arc<dyn UserRepository>,
    profile_repo: Arc<dyn ProfileRepository>,
}

impl ProfileService {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        profile_repo: Arc<dyn ProfileRepository>,
    ) -> Self {
        Self {
            user_repo,
            profile_repo,
        }
    }

    /// Look up a profile by username
    pub async fn get(&self, username: &str) -> Result<ProfileView, ServiceError> {
        let user = self
            .user_repo
            .get_by_username(username)
            .await
            .context("Failed to get user by username")?
            .ok_or_else(|| ServiceError::not_found(format!("user '{}'", username)))?;

        let profile = self
            .profile_repo
            .get_by_user(user.id)
            .await
            .context("Failed to get profile")?;

        Ok(ProfileView::new(&user, profile))
    }

    /// Edit the viewer's own account and profile
    pub async fn update(
        &self,
        viewer: &Viewer,
        user_input: UpdateUserInput,
        profile_input: UpdateProfileInput,
    ) -> Result<ProfileView, ServiceError> {
        let mut user = self
            .user_repo
            .get_by_id(viewer.id)
            .await
            .context("Failed to get user")?
            .ok_or_else(|| ServiceError::not_found(format!("user {}", viewer.id)))?;

        if let Some(username) = user_input.username {
            let username = username.trim().to_string();
            require_text("Username", &username, Some(NAME_MAX_CHARS))?;
            if username != user.username {
                let taken = self
                    .user_repo
                    .get_by_username(&username)
                    .await
                    .context("Failed to check username")?;
                if taken.is_some() {
                    return Err(ServiceError::validation(format!(
                        "Username '{}' is already taken",
                        username
                    )));
                }
            }
            user.username = username;
        }

        if let Some(email) = user_input.email {
            let email = email.trim().to_string();
            require_text("Email", &email, Some(254))?;
            if !email.contains('@') {
                return Err(ServiceError::validation("Invalid email format"));
            }
            if email != user.email {
                let taken = self
                    .user_repo
                    .get_by_email(&email)
                    .await
                    .context("Failed to check email")?;
                if taken.is_some() {
                    return Err(ServiceError::validation(format!(
                        "Email '{}' is already registered",
                        email
                    )));
                }
            }
            user.email = email;
        }

        if let Some(first_name) = user_input.first_name {
            if first_name.chars().count() > NAME_MAX_CHARS {
                return Err(ServiceError::validation("First name is too long"));
            }
            user.first_name = first_name;
        }

        if let Some(last_name) = user_input.last_name {
            if last_name.chars().count() > NAME_MAX_CHARS {
                return Err(ServiceError::validation("Last name is too long"));
            }
            user.last_name = last_name;
        }

        let user = self
            .user_repo
            .update(&user)
            .await
            .context("Failed to update user")?;

        let mut profile = self
            .profile_repo
            .get_by_user(user.id)
            .await
            .context("Failed to get profile")?
            .unwrap_or_else(|| Profile::empty(user.id));

        if let Some(bio) = profile_input.bio {
            profile.bio = bio;
        }
        if let Some(avatar) = profile_input.avatar {
            profile.avatar = avatar;
        }

        let profile = self
            .profile_repo
            .upsert(&profile)
            .await
            .context("Failed to save profile")?;

        tracing::info!(user_id = user.id, "Profile updated");

        Ok(ProfileView::new(&user, Some(profile)))
    }
}
