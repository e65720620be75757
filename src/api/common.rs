//! Common API utilities and shared types
//!
//! This module contains shared utilities used across multiple API endpoints.

use serde::{Deserialize, Deserializer};

use crate::models::PageRequest;

// ============================================================================
// Pagination Query Types
// ============================================================================

/// `?page=N` on feed endpoints.
///
/// Kept as a raw string so that garbage such as `?page=abc` falls back to the
/// first page instead of failing the request.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: Option<String>,
}

impl PageQuery {
    pub fn request(&self) -> PageRequest {
        PageRequest::parse(self.page.as_deref())
    }
}

// ============================================================================
// Serde helpers
// ============================================================================

/// Distinguish an absent field from an explicit `null`.
///
/// Use with `#[serde(default, deserialize_with = "double_option")]`: a missing
/// field stays `None`, `null` becomes `Some(None)`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "double_option")]
        category_id: Option<Option<i64>>,
    }

    #[test]
    fn test_double_option() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.category_id, None);

        let cleared: Patch = serde_json::from_str(r#"{"category_id": null}"#).unwrap();
        assert_eq!(cleared.category_id, Some(None));

        let set: Patch = serde_json::from_str(r#"{"category_id": 3}"#).unwrap();
        assert_eq!(set.category_id, Some(Some(3)));
    }

    #[test]
    fn test_page_query_fallbacks() {
        let q = PageQuery { page: None };
        assert_eq!(q.request().requested(), 1);

        let q = PageQuery {
            page: Some("abc".to_string()),
        };
        assert_eq!(q.request().requested(), 1);

        let q = PageQuery {
            page: Some("3".to_string()),
        };
        assert_eq!(q.request().requested(), 3);
    }
}
