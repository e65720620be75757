//! User model
//!
//! This module defines the User entity for blogicum.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User entity representing a registered author/commenter.
///
/// `is_staff` grants moderation rights (deleting other people's comments);
/// `is_superuser` additionally allows managing who is staff.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Username (unique)
    pub username: String,
    /// Email address (unique)
    pub email: String,
    /// Given name
    #[serde(default)]
    pub first_name: String,
    /// Family name
    #[serde(default)]
    pub last_name: String,
    /// Password hash (argon2)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Moderator flag
    pub is_staff: bool,
    /// Administrator flag
    pub is_superuser: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new User with the given parameters.
    ///
    /// The password should already be hashed, see `services::password::hash_password()`.
    pub fn new(username: String, email: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: 0, // Will be set by the database
            username,
            email,
            first_name: String::new(),
            last_name: String::new(),
            password_hash,
            is_staff: false,
            is_superuser: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Staff or superuser
    pub fn is_privileged(&self) -> bool {
        self.is_staff || self.is_superuser
    }
}

/// Input for updating the user fields of a profile
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserInput {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl UpdateUserInput {
    /// Check if any field is set
    pub fn has_changes(&self) -> bool {
        self.username.is_some()
            || self.email.is_some()
            || self.first_name.is_some()
            || self.last_name.is_some()
    }
}
