//! Comment model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::post::AuthorInfo;

/// Comment entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comment {
    pub id: i64,
    pub text: String,
    pub post_id: i64,
    pub author: AuthorInfo,
    pub created_at: DateTime<Utc>,
}

/// Input for creating or editing a comment
#[derive(Debug, Clone, Deserialize)]
pub struct CommentInput {
    pub text: String,
}

impl CommentInput {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}
