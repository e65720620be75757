//! API layer - HTTP handlers and routing
//!
//! This module contains all HTTP API endpoints for blogicum.
//! It includes:
//! - Post and feed endpoints
//! - Comment endpoints
//! - Category feed endpoint
//! - Profile endpoints
//! - User/Auth endpoints
//! - Admin endpoints

pub mod admin;
pub mod auth;
pub mod categories;
pub mod comments;
pub mod common;
pub mod middleware;
pub mod posts;
pub mod profile;
pub mod responses;

#[cfg(test)]
mod tests;

use anyhow::Context;
use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use middleware::{ApiError, AppState, AuthenticatedUser};

/// Build the main API router
pub fn build_api_router(state: AppState) -> Router<AppState> {
    // Admin routes (need staff role)
    let admin_routes = Router::new()
        .nest("/admin", admin::router())
        .route_layer(axum_middleware::from_fn(middleware::require_staff))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Protected routes (need auth but not staff)
    let protected_routes = Router::new()
        .nest("/auth", auth::protected_router())
        .route("/posts", post(posts::create_post))
        .route(
            "/posts/{post_id}",
            put(posts::update_post).delete(posts::delete_post),
        )
        .route("/posts/{post_id}/comments", post(comments::create_comment))
        .route(
            "/posts/{post_id}/comments/{comment_id}",
            put(comments::update_comment).delete(comments::delete_comment),
        )
        .route("/profile", put(profile::update_profile))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Read routes: anonymous allowed, but a signed-in viewer also sees their own hidden posts
    let read_routes = Router::new()
        .route("/posts", get(posts::list_posts))
        .route("/posts/{post_id}", get(posts::get_post))
        .route("/category/{slug}", get(categories::get_category_feed))
        .route("/profile/{username}", get(profile::get_profile))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::optional_auth,
        ));

    // Public routes
    Router::new()
        .nest("/auth", auth::public_router())
        .merge(read_routes)
        .merge(admin_routes)
        .merge(protected_routes)
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> anyhow::Result<Router> {
    // Cookie auth needs an explicit origin, not a wildcard
    let origin = cors_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid CORS origin '{}'", cors_origin))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
        .allow_credentials(true);

    Ok(Router::new()
        .nest("/api/v1", build_api_router(state.clone()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}
