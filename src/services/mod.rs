//! Services layer - Business logic
//!
//! This module contains the blog workflows. Services are responsible for:
//! - Applying the visibility and ownership policy at every call site
//! - Coordinating between repositories
//! - Handling validation and error cases

pub mod category;
pub mod comment;
pub mod error;
pub mod feed;
pub mod password;
pub mod post;
pub mod profile;
pub mod user;

pub use category::{is_valid_slug, CategoryService};
pub use comment::CommentService;
pub use error::{Redirect, ServiceError};
pub use feed::{feed_filters, FeedContext, FeedService};
pub use password::{hash_password, verify_password};
pub use post::{CreatedPost, PostDetail, PostService};
pub use profile::{ProfileService, ProfileView};
pub use user::{LoginInput, RegisterInput, UserService, UserServiceError};
