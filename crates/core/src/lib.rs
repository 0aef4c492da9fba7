//! Core budget import logic for SiteBudget.
//!
//! This crate turns raw spreadsheet cells into validated, fully computed
//! budget line items. It has no file-format or storage dependencies; callers
//! hand it a sheet of [`budget::Cell`] rows and a [`budget::BudgetItemStore`].
//!
//! # Modules
//!
//! - `budget` - Cell normalization, column layouts, validation, formulas and import

pub mod budget;
