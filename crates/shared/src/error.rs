//! Errors raised by budget persistence and configuration.

use thiserror::Error;

use crate::types::LocationId;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Failures outside the import pipeline itself.
#[derive(Debug, Error)]
pub enum AppError {
    /// The location has no stored budget.
    #[error("Location not found: {0}")]
    LocationNotFound(LocationId),

    /// The location has no item with this line item number.
    #[error("Line item '{number}' not found in location {location_id}")]
    LineItemNotFound {
        /// Owning location.
        location_id: LocationId,
        /// Requested line item number.
        number: String,
    },

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The backing store rejected or could not complete the operation.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::LocationNotFound(_) | Self::LineItemNotFound { .. } => 404,
            Self::Storage(_) => 503,
            Self::Config(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::LocationNotFound(_) => "LOCATION_NOT_FOUND",
            Self::LineItemNotFound { .. } => "LINE_ITEM_NOT_FOUND",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Storage(_) => "STORAGE_UNAVAILABLE",
        }
    }

    /// True for lookups that found nothing.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::LocationNotFound(_) | Self::LineItemNotFound { .. }
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
