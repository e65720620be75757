//! Mutation rights
//!
//! Only the author may edit a post or a comment. Comments may additionally
//! be deleted by staff. Posts may be deleted by privileged users only when
//! `staff_can_delete_posts` is enabled.

use super::Viewer;
use crate::models::{Comment, Post};

/// Entities that have a single author
pub trait Owned {
    fn author_id(&self) -> i64;
}

impl Owned for Post {
    fn author_id(&self) -> i64 {
        self.author.id
    }
}

impl Owned for Comment {
    fn author_id(&self) -> i64 {
        self.author.id
    }
}

/// Ownership rules with their one configurable knob
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OwnershipPolicy {
    pub staff_can_delete_posts: bool,
}

impl OwnershipPolicy {
    pub fn new(staff_can_delete_posts: bool) -> Self {
        Self {
            staff_can_delete_posts,
        }
    }

    /// Edit right: author only, for every entity kind
    pub fn can_modify<T: Owned>(&self, viewer: &Viewer, entity: &T) -> bool {
        viewer.id == entity.author_id()
    }

    pub fn can_delete_post(&self, viewer: &Viewer, post: &Post) -> bool {
        self.can_modify(viewer, post) || (self.staff_can_delete_posts && viewer.is_privileged())
    }

    pub fn can_delete_comment(&self, viewer: &Viewer, comment: &Comment) -> bool {
        self.can_modify(viewer, comment) || viewer.is_staff
    }
}
