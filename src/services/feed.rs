//! Feed assembly
//!
//! A feed is a filtered, comment-annotated, newest-first page of posts for
//! one listing context. Filtering, annotation, ordering and the page window
//! are expressed as a single [`PostQuery`] handed to the repository.
//!
//! Visibility inside a feed:
//! - Global and category feeds show publicly visible posts plus the
//!   viewer's own hidden posts.
//! - A profile feed shows everything to the profile owner and only publicly
//!   visible posts to anyone else.
//! - A category feed is empty when the category is unknown or unpublished.

use crate::db::repositories::PostRepository;
use crate::models::{
    Page, PageRequest, PostAnnotation, PostFilter, PostOrder, PostQuery, PostSummary,
    DEFAULT_PER_PAGE,
};
use crate::policy::Viewer;
use crate::services::error::ServiceError;
use anyhow::Context;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Which listing to build
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedContext {
    Global,
    /// Posts in the category with this slug
    Category(String),
    /// Posts by the user with this username
    Profile(String),
}

/// Filters that select the candidate posts of a context for a viewer
pub fn feed_filters(
    context: &FeedContext,
    viewer: Option<&Viewer>,
    now: DateTime<Utc>,
) -> Vec<PostFilter> {
    let visibility = match viewer {
        Some(v) => PostFilter::VisibleTo {
            viewer_id: v.id,
            now,
        },
        None => PostFilter::PubliclyVisible { now },
    };

    match context {
        FeedContext::Global => vec![visibility],
        FeedContext::Category(slug) => vec![
            PostFilter::CategorySlug(slug.clone()),
            PostFilter::CategoryPublished,
            visibility,
        ],
        FeedContext::Profile(username) => {
            let is_owner = viewer.is_some_and(|v| &v.username == username);
            let mut filters = vec![PostFilter::AuthorUsername(username.clone())];
            if !is_owner {
                filters.push(PostFilter::PubliclyVisible { now });
            }
            filters
        }
    }
}

/// Builds paginated feeds
pub struct FeedService {
    post_repo: Arc<dyn PostRepository>,
    per_page: u32,
}

impl FeedService {
    pub fn new(post_repo: Arc<dyn PostRepository>) -> Self {
        Self {
            post_repo,
            per_page: DEFAULT_PER_PAGE,
        }
    }

    /// Override the page size
    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page.max(1);
        self
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Build one page of a feed as of now
    pub async fn build_feed(
        &self,
        context: &FeedContext,
        viewer: Option<&Viewer>,
        page: PageRequest,
    ) -> Result<Page<PostSummary>, ServiceError> {
        self.build_feed_at(context, viewer, page, Utc::now()).await
    }

    /// Build one page of a feed as of `now`.
    ///
    /// The requested page is clamped to the available range, so this never
    /// returns an empty page while matching posts exist.
    pub async fn build_feed_at(
        &self,
        context: &FeedContext,
        viewer: Option<&Viewer>,
        page: PageRequest,
        now: DateTime<Utc>,
    ) -> Result<Page<PostSummary>, ServiceError> {
        let filters = feed_filters(context, viewer, now);

        let total = self
            .post_repo
            .count(&filters)
            .await
            .context("Failed to count feed posts")?;

        let page_no = page.clamp(total, self.per_page);
        let offset = i64::from(page_no - 1) * i64::from(self.per_page);

        let query = PostQuery {
            filters,
            ..PostQuery::default()
        }
        .annotate(PostAnnotation::CommentCount)
        .order_by(PostOrder::PubDateDesc)
        .window(i64::from(self.per_page), offset);

        let items = self
            .post_repo
            .query(&query)
            .await
            .context("Failed to query feed posts")?;

        tracing::debug!(
            ?context,
            viewer_id = viewer.map(|v| v.id),
            requested = page.requested(),
            page = page_no,
            total,
            "Feed assembled"
        );

        Ok(Page::new(items, total, page_no, self.per_page))
    }
}
