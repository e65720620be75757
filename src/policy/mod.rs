//! Access policy
//!
//! Every read and write decision about posts and comments goes through this
//! module. Callers pass the viewer explicitly; there is no ambient request
//! identity.
//!
//! - [`visibility`]: can this viewer read a post?
//! - [`ownership`]: can this viewer edit or delete a post or comment?

pub mod ownership;
pub mod visibility;

use serde::Serialize;

use crate::models::User;

pub use ownership::{Owned, OwnershipPolicy};
pub use visibility::{is_publicly_visible, is_visible, is_visible_at};

/// Identity and privileges of the user making a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Viewer {
    pub id: i64,
    pub username: String,
    pub is_staff: bool,
    pub is_superuser: bool,
}

impl Viewer {
    /// Staff or superuser
    pub fn is_privileged(&self) -> bool {
        self.is_staff || self.is_superuser
    }
}

impl From<&User> for Viewer {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            is_staff: user.is_staff,
            is_superuser: user.is_superuser,
        }
    }
}
