//! Shared API response types
//!
//! Response structures used by more than one endpoint.

use serde::Serialize;

use crate::models::{Page, PostSummary};
use crate::services::{ProfileView, Redirect};

// ============================================================================
// Pagination Response Types
// ============================================================================

/// One page of a feed with pager metadata
#[derive(Debug, Serialize)]
pub struct FeedResponse {
    pub items: Vec<PostSummary>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl From<Page<PostSummary>> for FeedResponse {
    fn from(page: Page<PostSummary>) -> Self {
        Self {
            total_pages: page.total_pages(),
            has_next: page.has_next(),
            has_prev: page.has_prev(),
            total: page.total,
            page: page.page,
            per_page: page.per_page,
            items: page.items,
        }
    }
}

/// Profile page: the user plus their posts
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub profile: ProfileView,
    pub posts: FeedResponse,
}

// ============================================================================
// Redirect Response Types
// ============================================================================

/// Body of a mutation that leads the client to another view
#[derive(Debug, Serialize)]
pub struct RedirectResponse {
    pub redirect: String,
}

impl From<Redirect> for RedirectResponse {
    fn from(redirect: Redirect) -> Self {
        Self {
            redirect: redirect.path(),
        }
    }
}
