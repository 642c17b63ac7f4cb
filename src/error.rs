//! Error types for the catalog core.
//!
//! Fetch failures are values, not panics: the coordinator turns them into a
//! `PageStatus::Failed` so presentation layers can tell them apart from
//! "loading" and "empty".

use thiserror::Error;

/// Errors surfaced by the data source and by session-gated actions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// The requested id or name does not exist upstream.
    #[error("Not found: {what}")]
    NotFound { what: String },

    /// Transport error, non-success status or an undecodable body.
    #[error("Fetch failed: {message}")]
    FetchFailed { message: String },

    /// A session-only action was attempted while anonymous.
    #[error("You need to log in to {action}")]
    Unauthenticated { action: String },
}

impl CatalogError {
    pub fn fetch_failed(message: impl Into<String>) -> Self {
        CatalogError::FetchFailed {
            message: message.into(),
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        CatalogError::NotFound { what: what.into() }
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(e: reqwest::Error) -> Self {
        CatalogError::fetch_failed(e.to_string())
    }
}

/// Reasons a login attempt resolves back to anonymous.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoginError {
    #[error("Incorrect e-mail or password")]
    InvalidCredentials,

    #[error("Already logged in as {email}")]
    AlreadyAuthenticated { email: String },
}
