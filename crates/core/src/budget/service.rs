//! Budget import service.
//!
//! Orchestrates the pipeline: validate the raw sheet, map each row, run the
//! formula engine, split category rows from billable items, and hand the items
//! to the persistence collaborator. Everything except the final hand-off is
//! pure and synchronous.

use std::collections::BTreeMap;

use serde::Serialize;
use sitebudget_shared::ImportSettings;
use sitebudget_shared::types::LocationId;
use tracing::{debug, info, warn};

use super::cell::Cell;
use super::error::ImportError;
use super::formula::{ActualsEdit, FormulaEngine, FormulaPolicy};
use super::layout::{ColumnLayout, Field, LayoutKind};
use super::mapper::RowMapper;
use super::store::BudgetItemStore;
use super::types::{BudgetLineItem, ParsedSheet};
use super::validation::{SheetValidator, ValidationResult};

/// Layout name used for a mapping read from configuration.
pub const CUSTOM_LAYOUT_NAME: &str = "custom";

/// Outcome of importing a sheet into a location.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    /// Location that received the items.
    pub location_id: LocationId,
    /// Number of items written to the store.
    pub items_saved: usize,
    /// Category rows, kept for project-level display only.
    pub groups: Vec<BudgetLineItem>,
}

/// Budget import pipeline bound to one layout and formula configuration.
#[derive(Debug, Clone)]
pub struct BudgetImportService {
    layout: ColumnLayout,
    engine: FormulaEngine,
}

impl BudgetImportService {
    /// Creates a service from an explicit layout and engine.
    #[must_use]
    pub fn new(layout: ColumnLayout, engine: FormulaEngine) -> Self {
        Self { layout, engine }
    }

    /// Creates a service from configuration.
    ///
    /// A non-empty `columns` mapping builds a custom layout and takes
    /// precedence over the named layout.
    ///
    /// # Errors
    ///
    /// Returns `ImportError::InvalidSetting` for an unknown layout, policy or
    /// column key, and `ImportError::Layout` for an incomplete or ambiguous
    /// custom mapping.
    pub fn from_settings(settings: &ImportSettings) -> Result<Self, ImportError> {
        let policy: FormulaPolicy =
            settings
                .formula_policy
                .parse()
                .map_err(|_| ImportError::InvalidSetting {
                    setting: "formula_policy",
                    value: settings.formula_policy.clone(),
                })?;

        let layout = if settings.columns.is_empty() {
            settings
                .layout
                .parse::<LayoutKind>()
                .map_err(|_| ImportError::InvalidSetting {
                    setting: "layout",
                    value: settings.layout.clone(),
                })?
                .layout()
        } else {
            custom_layout(&settings.columns)?
        };

        Ok(Self::new(
            layout,
            FormulaEngine::new(settings.labor_rate, policy),
        ))
    }

    /// The active column layout.
    #[must_use]
    pub const fn layout(&self) -> &ColumnLayout {
        &self.layout
    }

    /// The active formula engine.
    #[must_use]
    pub const fn engine(&self) -> &FormulaEngine {
        &self.engine
    }

    /// Validates a raw sheet.
    #[must_use]
    pub fn validate(&self, sheet: &[Vec<Cell>]) -> ValidationResult {
        let result = SheetValidator::new(&self.layout).validate(sheet);
        debug!(
            layout = self.layout.name(),
            rows = result.row_count,
            errors = result.errors.len(),
            warnings = result.warnings.len(),
            "Validated budget sheet"
        );
        result
    }

    /// Maps and computes every data row without validating.
    ///
    /// Unparseable numbers become zero, so any sheet can be parsed.
    #[must_use]
    pub fn parse(&self, sheet: &[Vec<Cell>]) -> ParsedSheet {
        let mapper = RowMapper::new(&self.layout);
        let mut parsed = ParsedSheet::default();

        for row in sheet.iter().skip(1) {
            let Some(draft) = mapper.map_row(row) else {
                continue;
            };
            let item = self.engine.compute_forward(&draft);
            if item.is_group {
                parsed.groups.push(item);
            } else {
                parsed.items.push(item);
            }
        }

        debug!(
            items = parsed.items.len(),
            groups = parsed.groups.len(),
            "Parsed budget sheet"
        );
        parsed
    }

    /// Validates, then parses a sheet.
    ///
    /// # Errors
    ///
    /// Returns `ImportError::Rejected` with the full report when validation fails.
    pub fn import(&self, sheet: &[Vec<Cell>]) -> Result<ParsedSheet, ImportError> {
        let report = self.validate(sheet);
        if !report.is_valid {
            warn!(
                errors = report.errors.len(),
                rows = report.row_count,
                "Budget import rejected"
            );
            return Err(ImportError::Rejected(report));
        }
        Ok(self.parse(sheet))
    }

    /// Imports a sheet and saves its billable items for a location.
    ///
    /// Nothing reaches the store when validation fails.
    ///
    /// # Errors
    ///
    /// Returns `ImportError::Rejected` for an invalid sheet and
    /// `ImportError::Store` when the store fails.
    pub fn import_for_location<S: BudgetItemStore>(
        &self,
        location_id: LocationId,
        sheet: &[Vec<Cell>],
        store: &mut S,
    ) -> Result<ImportSummary, ImportError> {
        let parsed = self.import(sheet)?;
        let items_saved = store.save_location_items(location_id, &parsed.items)?;

        info!(
            location_id = %location_id,
            items = items_saved,
            groups = parsed.groups.len(),
            budget_total = %parsed.budget_total(),
            "Imported budget items"
        );

        Ok(ImportSummary {
            location_id,
            items_saved,
            groups: parsed.groups,
        })
    }

    /// Applies an actuals edit to a stored item and saves the result.
    ///
    /// # Errors
    ///
    /// Returns `ImportError::Store` when the item cannot be loaded or saved.
    pub fn edit_actuals<S: BudgetItemStore>(
        &self,
        store: &mut S,
        location_id: LocationId,
        number: &str,
        edit: ActualsEdit,
    ) -> Result<BudgetLineItem, ImportError> {
        let item = store.load_item(location_id, number)?;
        let updated = FormulaEngine::apply_actuals_edit(&item, edit);
        store.save_location_items(location_id, std::slice::from_ref(&updated))?;

        debug!(
            location_id = %location_id,
            line_item = %updated.line_item_number,
            actual_qty = %updated.actual_qty,
            actual_conv_qty = %updated.actual_conv_qty,
            "Updated actuals"
        );
        Ok(updated)
    }
}

fn custom_layout(columns: &BTreeMap<String, usize>) -> Result<ColumnLayout, ImportError> {
    let entries = columns
        .iter()
        .map(|(key, index)| {
            Field::from_key(key)
                .map(|field| (field, *index))
                .ok_or_else(|| ImportError::InvalidSetting {
                    setting: "columns",
                    value: key.clone(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ColumnLayout::new(CUSTOM_LAYOUT_NAME, entries)?)
}
