//! Service error taxonomy
//!
//! `NotFound` is returned both for missing rows and for rows the viewer is
//! not allowed to see. `Forbidden` is only used when the viewer can see the
//! entity but may not change it, and always names a safe view to go back to.

use serde::Serialize;

/// A view the client should navigate to after an operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum Redirect {
    /// Post detail page
    PostDetail { post_id: i64 },
    /// Global feed
    Index,
    /// A user's profile page
    Profile { username: String },
}

impl Redirect {
    pub fn post(post_id: i64) -> Self {
        Self::PostDetail { post_id }
    }

    pub fn profile(username: impl Into<String>) -> Self {
        Self::Profile {
            username: username.into(),
        }
    }

    /// URL path of the target view
    pub fn path(&self) -> String {
        match self {
            Self::PostDetail { post_id } => format!("/posts/{}", post_id),
            Self::Index => "/".to_string(),
            Self::Profile { username } => format!("/profile/{}", username),
        }
    }
}

/// Error types for blog workflow operations
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Entity absent, or hidden from this viewer
    #[error("Not found: {0}")]
    NotFound(String),

    /// Entity visible but the mutation is not allowed
    #[error("Forbidden: {message}")]
    Forbidden { message: String, redirect: Redirect },

    /// Invalid input
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

impl ServiceError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn forbidden(message: impl Into<String>, redirect: Redirect) -> Self {
        Self::Forbidden {
            message: message.into(),
            redirect,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }
}

/// Reject empty or whitespace-only text, and text longer than `max_chars`
pub(crate) fn require_text(
    field: &str,
    value: &str,
    max_chars: Option<usize>,
) -> Result<(), ServiceError> {
    if value.trim().is_empty() {
        return Err(ServiceError::validation(format!("{} cannot be empty", field)));
    }
    if let Some(max) = max_chars {
        if value.chars().count() > max {
            return Err(ServiceError::validation(format!(
                "{} must be at most {} characters",
                field, max
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_paths() {
        assert_eq!(Redirect::post(7).path(), "/posts/7");
        assert_eq!(Redirect::Index.path(), "/");
        assert_eq!(Redirect::profile("leo").path(), "/profile/leo");
    }

    #[test]
    fn test_require_text() {
        assert!(require_text("Title", "ok", Some(5)).is_ok());
        assert!(matches!(
            require_text("Title", "   ", None),
            Err(ServiceError::ValidationError(_))
        ));
        assert!(matches!(
            require_text("Title", "toolong", Some(5)),
            Err(ServiceError::ValidationError(_))
        ));
        // counts characters, not bytes
        assert!(require_text("Title", "привет", Some(6)).is_ok());
    }
}
