//! Category model
//!
//! A category groups posts. An unpublished category hides every post in it
//! from everyone except the post's author.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    /// Unique identifier
    pub id: i64,
    /// Display title
    pub title: String,
    /// Category description
    pub description: String,
    /// URL identifier: latin letters, digits, hyphen and underscore
    pub slug: String,
    /// Whether posts in this category may be shown publicly
    pub is_published: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new category
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategoryInput {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub slug: String,
    /// Defaults to published
    #[serde(default)]
    pub is_published: Option<bool>,
}

impl CreateCategoryInput {
    pub fn new(title: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            slug: slug.into(),
            is_published: None,
        }
    }

    /// Set the publication flag
    pub fn with_published(mut self, is_published: bool) -> Self {
        self.is_published = Some(is_published);
        self
    }
}
