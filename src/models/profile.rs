//! Profile model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-user profile, one row per user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub user_id: i64,
    pub bio: String,
    /// Stored avatar path; the file itself lives in external storage
    pub avatar: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Empty profile for a freshly registered user
    pub fn empty(user_id: i64) -> Self {
        Self {
            user_id,
            bio: String::new(),
            avatar: None,
            updated_at: Utc::now(),
        }
    }
}

/// Input for editing a profile
#[derive(Debug, Clone, Default)]
pub struct UpdateProfileInput {
    pub bio: Option<String>,
    /// `Some(None)` clears the avatar
    pub avatar: Option<Option<String>>,
}
