//! Category API endpoints
//!
//! Handles HTTP requests for category listings:
//! - GET /api/v1/category/{slug} - Posts in a published category

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Serialize;

use crate::api::common::PageQuery;
use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::api::responses::FeedResponse;
use crate::models::Category;
use crate::services::FeedContext;

/// Category page: the category plus one page of its posts
#[derive(Debug, Serialize)]
pub struct CategoryFeedResponse {
    pub category: Category,
    pub posts: FeedResponse,
}

/// GET /api/v1/category/{slug} - Category feed
///
/// Unknown and unpublished categories are both 404.
pub async fn get_category_feed(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<CategoryFeedResponse>, ApiError> {
    let category = state.category_service.get_published_by_slug(&slug).await?;
    let viewer = user.map(|u| u.viewer());

    let page = state
        .feed_service
        .build_feed(
            &FeedContext::Category(category.slug.clone()),
            viewer.as_ref(),
            query.request(),
        )
        .await?;

    Ok(Json(CategoryFeedResponse {
        category,
        posts: page.into(),
    }))
}
