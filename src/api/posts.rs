//! Post API endpoints
//!
//! Handles HTTP requests for posts:
//! - GET /api/v1/posts - Global feed
//! - POST /api/v1/posts - Create post (auth)
//! - GET /api/v1/posts/{post_id} - Post detail with comments
//! - PUT /api/v1/posts/{post_id} - Edit post (author only)
//! - DELETE /api/v1/posts/{post_id} - Delete post

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::common::{double_option, PageQuery};
use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::api::responses::{FeedResponse, RedirectResponse};
use crate::models::{CreatePostInput, Post, UpdatePostInput};
use crate::services::{FeedContext, PostDetail};

/// Request body for editing a post. Every field is optional; `null` clears
/// the nullable ones.
#[derive(Debug, Default, Deserialize)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub text: Option<String>,
    pub pub_date: Option<DateTime<Utc>>,
    pub is_published: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub category_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub location_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub image: Option<Option<String>>,
}

impl From<UpdatePostRequest> for UpdatePostInput {
    fn from(req: UpdatePostRequest) -> Self {
        Self {
            title: req.title,
            text: req.text,
            pub_date: req.pub_date,
            is_published: req.is_published,
            category_id: req.category_id,
            location_id: req.location_id,
            image: req.image,
        }
    }
}

/// Response for a newly created post
#[derive(Debug, Serialize)]
pub struct CreatePostResponse {
    pub post: Post,
    /// The author's profile
    pub redirect: String,
}

/// GET /api/v1/posts - Global feed
pub async fn list_posts(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
    Query(query): Query<PageQuery>,
) -> Result<Json<FeedResponse>, ApiError> {
    let viewer = user.map(|u| u.viewer());

    let page = state
        .feed_service
        .build_feed(&FeedContext::Global, viewer.as_ref(), query.request())
        .await?;

    Ok(Json(page.into()))
}

/// POST /api/v1/posts - Create post
pub async fn create_post(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<CreatePostInput>,
) -> Result<impl IntoResponse, ApiError> {
    let created = state.post_service.create(&user.viewer(), body).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatePostResponse {
            post: created.post,
            redirect: created.redirect.path(),
        }),
    ))
}

/// GET /api/v1/posts/{post_id} - Post detail
///
/// Hidden posts are reported as missing unless the viewer wrote them.
pub async fn get_post(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
    Path(post_id): Path<i64>,
) -> Result<Json<PostDetail>, ApiError> {
    let viewer = user.map(|u| u.viewer());
    let detail = state.post_service.get_detail(viewer.as_ref(), post_id).await?;
    Ok(Json(detail))
}

/// PUT /api/v1/posts/{post_id} - Edit post
pub async fn update_post(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(post_id): Path<i64>,
    Json(body): Json<UpdatePostRequest>,
) -> Result<Json<Post>, ApiError> {
    let post = state
        .post_service
        .update(&user.viewer(), post_id, body.into())
        .await?;
    Ok(Json(post))
}

/// DELETE /api/v1/posts/{post_id} - Delete post and its comments
pub async fn delete_post(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(post_id): Path<i64>,
) -> Result<Json<RedirectResponse>, ApiError> {
    let redirect = state.post_service.delete(&user.viewer(), post_id).await?;
    Ok(Json(redirect.into()))
}
