//! Category and location service
//!
//! Public category lookup plus staff-only administration of categories and
//! locations.

use crate::db::repositories::{CategoryRepository, LocationRepository};
use crate::models::{Category, CreateCategoryInput, CreateLocationInput, Location};
use crate::policy::Viewer;
use crate::services::error::{require_text, Redirect, ServiceError};
use anyhow::Context;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

const TITLE_MAX_CHARS: usize = 256;
const SLUG_MAX_CHARS: usize = 64;

static SLUG_RE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").ok());

/// Check that a slug only uses latin letters, digits, hyphen and underscore
pub fn is_valid_slug(slug: &str) -> bool {
    slug.len() <= SLUG_MAX_CHARS && SLUG_RE.as_ref().is_some_and(|re| re.is_match(slug))
}

pub struct CategoryService {
    category_repo: Arc<dyn CategoryRepository>,
    location_repo: Arc<dyn LocationRepository>,
}

impl CategoryService {
    pub fn new(
        category_repo: Arc<dyn CategoryRepository>,
        location_repo: Arc<dyn LocationRepository>,
    ) -> Self {
        Self {
            category_repo,
            location_repo,
        }
    }

    /// Published category by slug; unknown and hidden categories are both `NotFound`
    pub async fn get_published_by_slug(&self, slug: &str) -> Result<Category, ServiceError> {
        self.category_repo
            .get_by_slug(slug)
            .await
            .context("Failed to get category by slug")?
            .filter(|c| c.is_published)
            .ok_or_else(|| ServiceError::not_found(format!("category '{}'", slug)))
    }

    pub async fn list_categories(&self, viewer: &Viewer) -> Result<Vec<Category>, ServiceError> {
        require_staff(viewer)?;
        Ok(self
            .category_repo
            .list()
            .await
            .context("Failed to list categories")?)
    }

    pub async fn create_category(
        &self,
        viewer: &Viewer,
        input: CreateCategoryInput,
    ) -> Result<Category, ServiceError> {
        require_staff(viewer)?;
        require_text("Title", &input.title, Some(TITLE_MAX_CHARS))?;
        if !is_valid_slug(&input.slug) {
            return Err(ServiceError::validation(
                "Slug may only contain latin letters, digits, hyphen and underscore",
            ));
        }

        let existing = self
            .category_repo
            .get_by_slug(&input.slug)
            .await
            .context("Failed to check slug")?;
        if existing.is_some() {
            return Err(ServiceError::validation(format!(
                "Category slug '{}' already exists",
                input.slug
            )));
        }

        let category = self
            .category_repo
            .create(&input)
            .await
            .context("Failed to create category")?;

        tracing::info!(category_id = category.id, slug = %category.slug, "Category created");
        Ok(category)
    }

    pub async fn set_category_published(
        &self,
        viewer: &Viewer,
        id: i64,
        is_published: bool,
    ) -> Result<Category, ServiceError> {
        require_staff(viewer)?;
        let category = self
            .category_repo
            .set_published(id, is_published)
            .await
            .context("Failed to update category")?
            .ok_or_else(|| ServiceError::not_found(format!("category {}", id)))?;

        tracing::info!(category_id = id, is_published, "Category publication changed");
        Ok(category)
    }

    /// Delete a category. Its posts stay, without a category.
    pub async fn delete_category(&self, viewer: &Viewer, id: i64) -> Result<(), ServiceError> {
        require_staff(viewer)?;
        let deleted = self
            .category_repo
            .delete(id)
            .await
            .context("Failed to delete category")?;
        if !deleted {
            return Err(ServiceError::not_found(format!("category {}", id)));
        }

        tracing::info!(category_id = id, "Category deleted");
        Ok(())
    }

    pub async fn list_locations(&self, viewer: &Viewer) -> Result<Vec<Location>, ServiceError> {
        require_staff(viewer)?;
        Ok(self
            .location_repo
            .list()
            .await
            .context("Failed to list locations")?)
    }

    pub async fn create_location(
        &self,
        viewer: &Viewer,
        input: CreateLocationInput,
    ) -> Result<Location, ServiceError> {
        require_staff(viewer)?;
        require_text("Name", &input.name, Some(TITLE_MAX_CHARS))?;

        let location = self
            .location_repo
            .create(&input)
            .await
            .context("Failed to create location")?;

        tracing::info!(location_id = location.id, "Location created");
        Ok(location)
    }

    pub async fn set_location_published(
        &self,
        viewer: &Viewer,
        id: i64,
        is_published: bool,
    ) -> Result<Location, ServiceError> {
        require_staff(viewer)?;
        self.location_repo
            .set_published(id, is_published)
            .await
            .context("Failed to update location")?
            .ok_or_else(|| ServiceError::not_found(format!("location {}", id)))
    }
}

fn require_staff(viewer: &Viewer) -> Result<(), ServiceError> {
    if viewer.is_privileged() {
        Ok(())
    } else {
        tracing::warn!(viewer_id = viewer.id, "Non-staff user attempted administration");
        Err(ServiceError::forbidden(
            "Staff privileges required",
            Redirect::Index,
        ))
    }
}
