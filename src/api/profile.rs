//! Profile API endpoints
//!
//! - GET /api/v1/profile/{username} - Public profile with the user's posts
//! - PUT /api/v1/profile - Edit own profile (auth)

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::api::common::{double_option, PageQuery};
use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::api::responses::{FeedResponse, ProfileResponse};
use crate::models::{UpdateProfileInput, UpdateUserInput};
use crate::services::{FeedContext, ProfileView};

/// Request body for editing the current user's profile
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    /// `null` removes the avatar
    #[serde(default, deserialize_with = "double_option")]
    pub avatar: Option<Option<String>>,
}

impl UpdateProfileRequest {
    fn split(self) -> (UpdateUserInput, UpdateProfileInput) {
        (
            UpdateUserInput {
                username: self.username,
                email: self.email,
                first_name: self.first_name,
                last_name: self.last_name,
            },
            UpdateProfileInput {
                bio: self.bio,
                avatar: self.avatar,
            },
        )
    }
}

/// GET /api/v1/profile/{username}
///
/// The owner sees all of their posts; everyone else only the public ones.
pub async fn get_profile(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let profile = state.profile_service.get(&username).await?;
    let viewer = user.map(|u| u.viewer());

    let page = state
        .feed_service
        .build_feed(
            &FeedContext::Profile(profile.username.clone()),
            viewer.as_ref(),
            query.request(),
        )
        .await?;

    Ok(Json(ProfileResponse {
        profile,
        posts: FeedResponse::from(page),
    }))
}

/// PUT /api/v1/profile
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileView>, ApiError> {
    let (user_input, profile_input) = body.split();
    let view = state
        .profile_service
        .update(&user.viewer(), user_input, profile_input)
        .await?;
    Ok(Json(view))
}
