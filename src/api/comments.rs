//! Comment API endpoints
//!
//! - POST /api/v1/posts/{post_id}/comments - Add comment
//! - PUT /api/v1/posts/{post_id}/comments/{comment_id} - Edit comment (author only)
//! - DELETE /api/v1/posts/{post_id}/comments/{comment_id} - Delete comment (author or staff)
//!
//! All routes require authentication.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::{Comment, CommentInput};
use crate::services::Redirect;

/// Comment plus the post view the client should return to
#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub comment: Comment,
    pub redirect: String,
}

impl From<Comment> for CommentResponse {
    fn from(comment: Comment) -> Self {
        Self {
            redirect: Redirect::post(comment.post_id).path(),
            comment,
        }
    }
}

/// POST /api/v1/posts/{post_id}/comments
pub async fn create_comment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(post_id): Path<i64>,
    Json(body): Json<CommentInput>,
) -> Result<impl IntoResponse, ApiError> {
    let comment = state
        .comment_service
        .create(&user.viewer(), post_id, body)
        .await?;

    Ok((StatusCode::CREATED, Json(CommentResponse::from(comment))))
}

/// PUT /api/v1/posts/{post_id}/comments/{comment_id}
pub async fn update_comment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((post_id, comment_id)): Path<(i64, i64)>,
    Json(body): Json<CommentInput>,
) -> Result<Json<CommentResponse>, ApiError> {
    let comment = state
        .comment_service
        .edit(&user.viewer(), post_id, comment_id, body)
        .await?;

    Ok(Json(comment.into()))
}

/// DELETE /api/v1/posts/{post_id}/comments/{comment_id}
pub async fn delete_comment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((post_id, comment_id)): Path<(i64, i64)>,
) -> Result<Json<CommentResponse>, ApiError> {
    let comment = state
        .comment_service
        .delete(&user.viewer(), post_id, comment_id)
        .await?;

    Ok(Json(comment.into()))
}
