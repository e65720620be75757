//! Post model
//!
//! A post carries enough of its related rows (author, category, location)
//! for the visibility policy to decide without another lookup.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Author reference embedded in posts and comments
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthorInfo {
    pub id: i64,
    pub username: String,
}

/// Category reference embedded in a post
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryInfo {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub is_published: bool,
}

/// Location reference embedded in a post
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LocationInfo {
    pub id: i64,
    pub name: String,
    pub is_published: bool,
}

/// Post entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Post {
    /// Unique identifier
    pub id: i64,
    /// Post title
    pub title: String,
    /// Post body
    pub text: String,
    /// Publication date; a future date schedules the post
    pub pub_date: DateTime<Utc>,
    /// Author-controlled publish flag
    pub is_published: bool,
    pub author: AuthorInfo,
    /// `None` once the category was deleted
    pub category: Option<CategoryInfo>,
    pub location: Option<LocationInfo>,
    /// Stored image path
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Post as listed in a feed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PostSummary {
    #[serde(flatten)]
    pub post: Post,
    /// Filled when the query asked for the comment-count annotation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment_count: Option<i64>,
}

/// Input for creating a new post
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePostInput {
    pub title: String,
    pub text: String,
    /// Defaults to the creation time
    #[serde(default)]
    pub pub_date: Option<DateTime<Utc>>,
    /// Defaults to published
    #[serde(default)]
    pub is_published: Option<bool>,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub location_id: Option<i64>,
    #[serde(default)]
    pub image: Option<String>,
}

impl CreatePostInput {
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            pub_date: None,
            is_published: None,
            category_id: None,
            location_id: None,
            image: None,
        }
    }

    pub fn with_category(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn with_location(mut self, location_id: i64) -> Self {
        self.location_id = Some(location_id);
        self
    }

    pub fn with_pub_date(mut self, pub_date: DateTime<Utc>) -> Self {
        self.pub_date = Some(pub_date);
        self
    }

    pub fn with_published(mut self, is_published: bool) -> Self {
        self.is_published = Some(is_published);
        self
    }
}

/// Input for updating an existing post.
///
/// The nullable relations use `Option<Option<_>>`: `None` leaves the field
/// alone, `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct UpdatePostInput {
    pub title: Option<String>,
    pub text: Option<String>,
    pub pub_date: Option<DateTime<Utc>>,
    pub is_published: Option<bool>,
    pub category_id: Option<Option<i64>>,
    pub location_id: Option<Option<i64>>,
    pub image: Option<Option<String>>,
}

impl UpdatePostInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_pub_date(mut self, pub_date: DateTime<Utc>) -> Self {
        self.pub_date = Some(pub_date);
        self
    }

    pub fn with_published(mut self, is_published: bool) -> Self {
        self.is_published = Some(is_published);
        self
    }

    pub fn with_category(mut self, category_id: Option<i64>) -> Self {
        self.category_id = Some(category_id);
        self
    }

    /// Check if any field is set
    pub fn has_changes(&self) -> bool {
        self.title.is_some()
            || self.text.is_some()
            || self.pub_date.is_some()
            || self.is_published.is_some()
            || self.category_id.is_some()
            || self.location_id.is_some()
            || self.image.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_input_has_changes() {
        assert!(!UpdatePostInput::new().has_changes());
        assert!(UpdatePostInput::new().with_title("t").has_changes());
        assert!(UpdatePostInput::new().with_category(None).has_changes());
    }

    #[test]
    fn test_summary_flattens_post() {
        let now = Utc::now();
        let summary = PostSummary {
            post: Post {
                id: 3,
                title: "Hello".to_string(),
                text: "World".to_string(),
                pub_date: now,
                is_published: true,
                author: AuthorInfo {
                    id: 1,
                    username: "leo".to_string(),
                },
                category: None,
                location: None,
                image: None,
                created_at: now,
            },
            comment_count: Some(2),
        };

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["comment_count"], 2);
        assert_eq!(json["author"]["username"], "leo");
    }
}
