//! Post service
//!
//! Create, read, update and delete posts with the visibility and ownership
//! rules applied. A post the viewer cannot see is reported as `NotFound`
//! even when the viewer also lacks the right to change it.

use crate::db::repositories::{
    CategoryRepository, CommentRepository, LocationRepository, PostRepository,
};
use crate::models::{Comment, CreatePostInput, Post, UpdatePostInput};
use crate::policy::{is_visible, OwnershipPolicy, Viewer};
use crate::services::error::{require_text, Redirect, ServiceError};
use anyhow::Context;
use serde::Serialize;
use std::sync::Arc;

const TITLE_MAX_CHARS: usize = 256;

/// A post with its comments, oldest comment first
#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    pub post: Post,
    pub comments: Vec<Comment>,
    pub comment_count: i64,
}

/// Result of creating a post
#[derive(Debug, Clone, Serialize)]
pub struct CreatedPost {
    pub post: Post,
    /// The author's profile
    pub redirect: Redirect,
}

pub struct PostService {
    post_repo: Arc<dyn PostRepository>,
    comment_repo: Arc<dyn CommentRepository>,
    category_repo: Arc<dyn CategoryRepository>,
    location_repo: Arc<dyn LocationRepository>,
    policy: OwnershipPolicy,
}

impl PostService {
    pub fn new(
        post_repo: Arc<dyn PostRepository>,
        comment_repo: Arc<dyn CommentRepository>,
        category_repo: Arc<dyn CategoryRepository>,
        location_repo: Arc<dyn LocationRepository>,
        policy: OwnershipPolicy,
    ) -> Self {
        Self {
            post_repo,
            comment_repo,
            category_repo,
            location_repo,
            policy,
        }
    }

    /// Create a post authored by the viewer
    pub async fn create(
        &self,
        viewer: &Viewer,
        input: CreatePostInput,
    ) -> Result<CreatedPost, ServiceError> {
        require_text("Title", &input.title, Some(TITLE_MAX_CHARS))?;
        require_text("Text", &input.text, None)?;
        self.check_relations(input.category_id, input.location_id)
            .await?;

        let post = self
            .post_repo
            .create(viewer.id, &input)
            .await
            .context("Failed to create post")?;

        tracing::info!(post_id = post.id, author_id = viewer.id, "Post created");

        Ok(CreatedPost {
            post,
            redirect: Redirect::profile(viewer.username.clone()),
        })
    }

    /// Post detail with comments
    pub async fn get_detail(
        &self,
        viewer: Option<&Viewer>,
        post_id: i64,
    ) -> Result<PostDetail, ServiceError> {
        let post = self.load_visible(viewer, post_id).await?;

        let comments = self
            .comment_repo
            .list_by_post(post_id)
            .await
            .context("Failed to list comments")?;

        Ok(PostDetail {
            comment_count: comments.len() as i64,
            post,
            comments,
        })
    }

    /// Apply a partial update. Author only.
    pub async fn update(
        &self,
        viewer: &Viewer,
        post_id: i64,
        input: UpdatePostInput,
    ) -> Result<Post, ServiceError> {
        let post = self.load(post_id).await?;

        if !self.policy.can_modify(viewer, &post) {
            return Err(deny(
                viewer,
                &post,
                "Only the author can edit this post",
                Redirect::post(post_id),
            ));
        }

        if let Some(title) = &input.title {
            require_text("Title", title, Some(TITLE_MAX_CHARS))?;
        }
        if let Some(text) = &input.text {
            require_text("Text", text, None)?;
        }
        self.check_relations(input.category_id.flatten(), input.location_id.flatten())
            .await?;

        let updated = self
            .post_repo
            .update(post_id, &input)
            .await
            .context("Failed to update post")?
            .ok_or_else(|| ServiceError::not_found(format!("post {}", post_id)))?;

        tracing::info!(post_id, "Post updated");
        Ok(updated)
    }

    /// Delete a post and its comments
    pub async fn delete(&self, viewer: &Viewer, post_id: i64) -> Result<Redirect, ServiceError> {
        let post = self.load(post_id).await?;

        if !self.policy.can_delete_post(viewer, &post) {
            return Err(deny(
                viewer,
                &post,
                "You cannot delete this post",
                Redirect::Index,
            ));
        }

        self.post_repo
            .delete(post_id)
            .await
            .context("Failed to delete post")?;

        tracing::info!(post_id, viewer_id = viewer.id, "Post deleted");
        Ok(Redirect::Index)
    }

    async fn load(&self, post_id: i64) -> Result<Post, ServiceError> {
        self.post_repo
            .get_by_id(post_id)
            .await
            .context("Failed to get post")?
            .ok_or_else(|| ServiceError::not_found(format!("post {}", post_id)))
    }

    async fn load_visible(
        &self,
        viewer: Option<&Viewer>,
        post_id: i64,
    ) -> Result<Post, ServiceError> {
        let post = self.load(post_id).await?;
        if is_visible(viewer, &post) {
            Ok(post)
        } else {
            Err(ServiceError::not_found(format!("post {}", post_id)))
        }
    }

    async fn check_relations(
        &self,
        category_id: Option<i64>,
        location_id: Option<i64>,
    ) -> Result<(), ServiceError> {
        if let Some(id) = category_id {
            let found = self
                .category_repo
                .get_by_id(id)
                .await
                .context("Failed to get category")?;
            if found.is_none() {
                return Err(ServiceError::validation(format!("Unknown category {}", id)));
            }
        }

        if let Some(id) = location_id {
            let found = self
                .location_repo
                .get_by_id(id)
                .await
                .context("Failed to get location")?;
            if found.is_none() {
                return Err(ServiceError::validation(format!("Unknown location {}", id)));
            }
        }

        Ok(())
    }
}

/// Denied mutation: hidden posts stay hidden
fn deny(viewer: &Viewer, post: &Post, message: &str, redirect: Redirect) -> ServiceError {
    if is_visible(Some(viewer), post) {
        tracing::warn!(viewer_id = viewer.id, post_id = post.id, "{}", message);
        ServiceError::forbidden(message, redirect)
    } else {
        ServiceError::not_found(format!("post {}", post.id))
    }
}
