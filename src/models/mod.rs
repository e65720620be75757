//! Data models
//!
//! This module contains all the data structures used throughout the application.

pub mod category;
pub mod comment;
pub mod location;
pub mod pagination;
pub mod post;
pub mod profile;
pub mod query;
pub mod session;
pub mod user;

pub use category::{Category, CreateCategoryInput};
pub use comment::{Comment, CommentInput};
pub use location::{CreateLocationInput, Location};
pub use pagination::{total_pages, Page, PageRequest, DEFAULT_PER_PAGE};
pub use post::{
    AuthorInfo, CategoryInfo, CreatePostInput, LocationInfo, Post, PostSummary, UpdatePostInput,
};
pub use profile::{Profile, UpdateProfileInput};
pub use query::{PostAnnotation, PostFilter, PostOrder, PostQuery};
pub use session::Session;
pub use user::{UpdateUserInput, User};
