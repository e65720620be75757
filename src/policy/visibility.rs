//! Post visibility
//!
//! A post is publicly visible when it is published, sits in a published
//! category and its publication date has passed. Its author always sees it.
//! A post without a category is never publicly visible.
//!
//! Callers report an invisible post as "not found", never as "forbidden".

use chrono::{DateTime, Utc};

use super::Viewer;
use crate::models::Post;

/// Check visibility against the current time
pub fn is_visible(viewer: Option<&Viewer>, post: &Post) -> bool {
    is_visible_at(viewer, post, Utc::now())
}

/// Check visibility at a fixed instant
pub fn is_visible_at(viewer: Option<&Viewer>, post: &Post, now: DateTime<Utc>) -> bool {
    if viewer.is_some_and(|v| v.id == post.author.id) {
        return true;
    }
    is_publicly_visible(post, now)
}

/// The anonymous-viewer rule
pub fn is_publicly_visible(post: &Post, now: DateTime<Utc>) -> bool {
    let category_published = post.category.as_ref().is_some_and(|c| c.is_published);
    post.is_published && category_published && post.pub_date <= now
}
