//! Budget import error types.
//!
//! Bad user data never shows up here: row-level problems are accumulated in a
//! `ValidationResult`. These errors cover rejected imports as a whole,
//! misconfigured layouts or settings, and persistence failures.

use sitebudget_shared::AppError;
use thiserror::Error;

use super::layout::Field;
use super::validation::ValidationResult;

/// A non-blank cell that is not a number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid number format: \"{value}\"")]
pub struct NumberFormatError {
    /// The offending cell text, trimmed.
    pub value: String,
}

/// A column layout that cannot be used to map rows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// A field every layout must map is missing.
    #[error("Layout '{layout}' does not map required field {field:?}")]
    MissingField {
        /// Layout name.
        layout: String,
        /// The unmapped field.
        field: Field,
    },

    /// Two fields were assigned the same column.
    #[error("Layout '{layout}' assigns column {index} to both {first:?} and {second:?}")]
    DuplicateIndex {
        /// Layout name.
        layout: String,
        /// The shared column index.
        index: usize,
        /// Field mapped first.
        first: Field,
        /// Field mapped second.
        second: Field,
    },

    /// A field was mapped twice.
    #[error("Layout '{layout}' maps field {field:?} more than once")]
    DuplicateField {
        /// Layout name.
        layout: String,
        /// The repeated field.
        field: Field,
    },
}

/// Errors returned by the import pipeline.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The sheet failed validation; the full report is attached.
    #[error("Import rejected: {} validation error(s)", .0.errors.len())]
    Rejected(ValidationResult),

    /// A configuration value could not be resolved.
    #[error("Invalid {setting} setting: '{value}'")]
    InvalidSetting {
        /// Setting name.
        setting: &'static str,
        /// Rejected value.
        value: String,
    },

    /// Column layout misconfiguration.
    #[error(transparent)]
    Layout(#[from] LayoutError),

    /// The persistence collaborator failed.
    #[error("Budget item store failed: {0}")]
    Store(#[from] AppError),
}

impl ImportError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Rejected(_) => "IMPORT_REJECTED",
            Self::InvalidSetting { .. } => "INVALID_SETTING",
            Self::Layout(_) => "INVALID_LAYOUT",
            Self::Store(_) => "STORE_FAILED",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Rejected(_) => 422,
            Self::InvalidSetting { .. } | Self::Layout(_) => 500,
            Self::Store(err) => err.status_code(),
        }
    }

    /// Returns the validation report if the import was rejected.
    #[must_use]
    pub fn report(&self) -> Option<&ValidationResult> {
        match self {
            Self::Rejected(report) => Some(report),
            _ => None,
        }
    }
}
