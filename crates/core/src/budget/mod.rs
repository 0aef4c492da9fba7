//! Budget import and formula engine.
//!
//! Turns raw spreadsheet rows into typed budget line items:
//! - `layout` maps sheet columns to fields, per layout variant
//! - `numeric` and `cost_code` normalize raw cell values
//! - `mapper` reads one row into a draft
//! - `formula` computes derived fields and keeps actuals consistent
//! - `validation` checks a whole sheet and reports every problem
//! - `service` runs the pipeline and hands items to a `BudgetItemStore`

pub mod cell;
pub mod cost_code;
pub mod error;
pub mod formula;
pub mod layout;
pub mod mapper;
pub mod numeric;
pub mod rollup;
pub mod service;
pub mod store;
pub mod types;
pub mod validation;

#[cfg(test)]
mod props;

pub use cell::{Cell, Row, Sheet};
pub use cost_code::{COST_CODES, is_valid_cost_code, normalize_cost_code};
pub use error::{ImportError, LayoutError, NumberFormatError};
pub use formula::{ActualsEdit, FormulaEngine, FormulaPolicy};
pub use layout::{ColumnLayout, Field, FieldKind, LayoutKind, SheetTemplate, TemplateColumn};
pub use mapper::{BudgetLineDraft, RowMapper};
pub use numeric::{
    NumericPolicy, format_money, normalize, parse_cell, round_money, saturating_sum,
    with_money_scale,
};
pub use rollup::{CostCodeRollup, rollup_by_cost_code};
pub use service::{BudgetImportService, CUSTOM_LAYOUT_NAME, ImportSummary};
pub use store::{BudgetItemStore, InMemoryBudgetItemStore};
pub use types::{BudgetLineItem, ParsedSheet, total_billing, total_budget};
pub use validation::{SheetValidator, ValidationError, ValidationErrorKind, ValidationResult};
