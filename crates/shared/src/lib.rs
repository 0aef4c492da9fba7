//! Shared types, errors, and configuration for SiteBudget.
//!
//! This crate provides common types used across all other crates:
//! - `LocationId`, the owner of imported budget items
//! - `AppError` for persistence and configuration failures
//! - Layered configuration (`AppConfig`)

pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, ImportSettings};
pub use error::{AppError, AppResult};
