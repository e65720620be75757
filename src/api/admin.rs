//! Admin API endpoints
//!
//! Staff-only management of categories, locations and staff membership:
//! - GET/POST /api/v1/admin/categories
//! - PUT/DELETE /api/v1/admin/categories/{id}
//! - GET/POST /api/v1/admin/locations
//! - PUT /api/v1/admin/locations/{id}
//! - PUT /api/v1/admin/users/{id}/staff (superuser)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;

use crate::api::auth::UserResponse;
use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::{Category, CreateCategoryInput, CreateLocationInput, Location};

/// Request for publishing or hiding a category or location
#[derive(Debug, Deserialize)]
pub struct PublishRequest {
    pub is_published: bool,
}

/// Request for granting or revoking staff rights
#[derive(Debug, Deserialize)]
pub struct StaffRequest {
    pub is_staff: bool,
}

/// Build the admin router
pub fn router() -> Router<AppState> {
    Router::new()
        // Category management
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/{id}",
            put(update_category).delete(delete_category),
        )
        // Location management
        .route("/locations", get(list_locations).post(create_location))
        .route("/locations/{id}", put(update_location))
        // Staff management
        .route("/users/{id}/staff", put(set_staff))
}

/// GET /api/v1/admin/categories - All categories, published or not
async fn list_categories(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<Category>>, ApiError> {
    let categories = state.category_service.list_categories(&user.viewer()).await?;
    Ok(Json(categories))
}

/// POST /api/v1/admin/categories - Create category
async fn create_category(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<CreateCategoryInput>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    let category = state
        .category_service
        .create_category(&user.viewer(), body)
        .await?;

    Ok((StatusCode::CREATED, Json(category)))
}

/// PUT /api/v1/admin/categories/{id} - Publish or hide a category
async fn update_category(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(body): Json<PublishRequest>,
) -> Result<Json<Category>, ApiError> {
    let category = state
        .category_service
        .set_category_published(&user.viewer(), id, body.is_published)
        .await?;

    Ok(Json(category))
}

/// DELETE /api/v1/admin/categories/{id} - Delete category
///
/// Posts in the category are kept without a category.
async fn delete_category(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state
        .category_service
        .delete_category(&user.viewer(), id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/admin/locations
async fn list_locations(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<Location>>, ApiError> {
    let locations = state.category_service.list_locations(&user.viewer()).await?;
    Ok(Json(locations))
}

/// POST /api/v1/admin/locations
async fn create_location(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<CreateLocationInput>,
) -> Result<(StatusCode, Json<Location>), ApiError> {
    let location = state
        .category_service
        .create_location(&user.viewer(), body)
        .await?;

    Ok((StatusCode::CREATED, Json(location)))
}

/// PUT /api/v1/admin/locations/{id}
async fn update_location(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(body): Json<PublishRequest>,
) -> Result<Json<Location>, ApiError> {
    let location = state
        .category_service
        .set_location_published(&user.viewer(), id, body.is_published)
        .await?;

    Ok(Json(location))
}

/// PUT /api/v1/admin/users/{id}/staff - Grant or revoke staff rights
///
/// Superusers only.
async fn set_staff(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(body): Json<StaffRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let updated = state
        .user_service
        .set_staff(&user.viewer(), id, body.is_staff)
        .await?;

    Ok(Json(updated.into()))
}
