//! Post query specification
//!
//! A [`PostQuery`] describes the whole shape of a post listing (filters,
//! annotations, ordering and the page window) as a plain value. The
//! repository turns it into a single SQL statement; services and tests can
//! build and inspect it without touching the database.

use chrono::{DateTime, Utc};

/// A single restriction on the candidate post set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostFilter {
    /// Posts written by the user with this username
    AuthorUsername(String),
    /// Posts in the category with this slug
    CategorySlug(String),
    /// Posts whose category is published
    CategoryPublished,
    /// Published, in a published category, and `pub_date <= now`
    PubliclyVisible { now: DateTime<Utc> },
    /// Publicly visible, or written by `viewer_id`
    VisibleTo { viewer_id: i64, now: DateTime<Utc> },
}

/// Extra computed columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostAnnotation {
    /// Number of comments referencing the post
    CommentCount,
}

/// Result ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PostOrder {
    /// Newest publication date first, ties broken by id descending
    #[default]
    PubDateDesc,
}

/// Complete post listing specification
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PostQuery {
    pub filters: Vec<PostFilter>,
    pub annotations: Vec<PostAnnotation>,
    pub order: PostOrder,
    /// `None` returns every matching row
    pub limit: Option<i64>,
    pub offset: i64,
}

impl PostQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a filter; filters are combined with AND
    pub fn filter(mut self, filter: PostFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn annotate(mut self, annotation: PostAnnotation) -> Self {
        if !self.annotations.contains(&annotation) {
            self.annotations.push(annotation);
        }
        self
    }

    pub fn order_by(mut self, order: PostOrder) -> Self {
        self.order = order;
        self
    }

    /// Restrict to a window of `limit` rows starting at `offset`
    pub fn window(mut self, limit: i64, offset: i64) -> Self {
        self.limit = Some(limit);
        self.offset = offset;
        self
    }

    pub fn has_annotation(&self, annotation: PostAnnotation) -> bool {
        self.annotations.contains(&annotation)
    }
}
