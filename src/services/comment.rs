//! Comment workflow
//!
//! Create, edit and delete comments for an authenticated viewer:
//! - create: the post must exist and be visible to the viewer
//! - edit: comment author only
//! - delete: comment author or staff
//!
//! A comment addressed through the wrong post id is `NotFound`, and so is any
//! comment under a post hidden from the viewer. Denied mutations on a visible
//! post are `Forbidden` with a redirect to the post detail.

use crate::db::repositories::{CommentRepository, PostRepository};
use crate::models::{Comment, CommentInput, Post};
use crate::policy::{is_visible, OwnershipPolicy, Viewer};
use crate::services::error::{require_text, Redirect, ServiceError};
use anyhow::Context;
use std::sync::Arc;

pub struct CommentService {
    post_repo: Arc<dyn PostRepository>,
    comment_repo: Arc<dyn CommentRepository>,
    policy: OwnershipPolicy,
}

impl CommentService {
    pub fn new(
        post_repo: Arc<dyn PostRepository>,
        comment_repo: Arc<dyn CommentRepository>,
        policy: OwnershipPolicy,
    ) -> Self {
        Self {
            post_repo,
            comment_repo,
            policy,
        }
    }

    /// Add a comment to a post
    pub async fn create(
        &self,
        viewer: &Viewer,
        post_id: i64,
        input: CommentInput,
    ) -> Result<Comment, ServiceError> {
        let post = self.load_post(post_id).await?;
        if !is_visible(Some(viewer), &post) {
            return Err(ServiceError::not_found(format!("post {}", post_id)));
        }

        require_text("Comment", &input.text, None)?;

        let comment = self
            .comment_repo
            .create(post_id, viewer.id, &input.text)
            .await
            .context("Failed to create comment")?;

        tracing::info!(comment_id = comment.id, post_id, author_id = viewer.id, "Comment created");
        Ok(comment)
    }

    /// Replace the text of a comment
    pub async fn edit(
        &self,
        viewer: &Viewer,
        post_id: i64,
        comment_id: i64,
        input: CommentInput,
    ) -> Result<Comment, ServiceError> {
        let comment = self.load_comment(viewer, post_id, comment_id).await?;

        if !self.policy.can_modify(viewer, &comment) {
            tracing::warn!(viewer_id = viewer.id, comment_id, "Comment edit denied");
            return Err(ServiceError::forbidden(
                "Only the author can edit this comment",
                Redirect::post(post_id),
            ));
        }

        require_text("Comment", &input.text, None)?;

        let updated = self
            .comment_repo
            .update_text(comment_id, &input.text)
            .await
            .context("Failed to update comment")?
            .ok_or_else(|| ServiceError::not_found(format!("comment {}", comment_id)))?;

        tracing::info!(comment_id, post_id, "Comment edited");
        Ok(updated)
    }

    /// Remove a comment, returning what was deleted. The post is untouched.
    pub async fn delete(
        &self,
        viewer: &Viewer,
        post_id: i64,
        comment_id: i64,
    ) -> Result<Comment, ServiceError> {
        let comment = self.load_comment(viewer, post_id, comment_id).await?;

        if !self.policy.can_delete_comment(viewer, &comment) {
            tracing::warn!(viewer_id = viewer.id, comment_id, "Comment delete denied");
            return Err(ServiceError::forbidden(
                "You cannot delete this comment",
                Redirect::post(post_id),
            ));
        }

        self.comment_repo
            .delete(comment_id)
            .await
            .context("Failed to delete comment")?;

        tracing::info!(comment_id, post_id, viewer_id = viewer.id, "Comment deleted");
        Ok(comment)
    }

    async fn load_post(&self, post_id: i64) -> Result<Post, ServiceError> {
        self.post_repo
            .get_by_id(post_id)
            .await
            .context("Failed to get post")?
            .ok_or_else(|| ServiceError::not_found(format!("post {}", post_id)))
    }

    /// Load a comment through its post. A post hidden from the viewer reads as absent.
    async fn load_comment(
        &self,
        viewer: &Viewer,
        post_id: i64,
        comment_id: i64,
    ) -> Result<Comment, ServiceError> {
        let comment = self
            .comment_repo
            .get_by_id(comment_id)
            .await
            .context("Failed to get comment")?
            .filter(|c| c.post_id == post_id)
            .ok_or_else(|| ServiceError::not_found(format!("comment {}", comment_id)))?;

        let post = self.load_post(post_id).await?;
        if !is_visible(Some(viewer), &post) {
            return Err(ServiceError::not_found(format!("post {}", post_id)));
        }
        Ok(comment)
    }
}
