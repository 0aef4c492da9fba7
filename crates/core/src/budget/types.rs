//! Budget data types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::numeric::saturating_sum;

/// One row of a location's budget.
///
/// Numeric fields are `Decimal` and serialize as decimal strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetLineItem {
    /// Hierarchical identifier, unique within a sheet (e.g. "3.2").
    pub line_item_number: String,
    /// Description of the work.
    pub line_item_name: String,
    /// Canonical cost code.
    pub cost_code: String,
    /// Unit the quantity is measured in.
    pub unconverted_unit_of_measure: String,
    /// Measured quantity.
    pub unconverted_qty: Decimal,
    /// Unit the quantity is billed in.
    pub converted_unit_of_measure: String,
    /// Billed quantity (`unconverted_qty * conversion_factor`).
    pub converted_qty: Decimal,
    /// Billed units per measured unit.
    pub conversion_factor: Decimal,
    /// Cost per measured unit.
    pub unit_cost: Decimal,
    /// `unconverted_qty * unit_cost`.
    pub unit_total: Decimal,
    /// Labor hours per billed unit.
    pub production_rate: Decimal,
    /// `converted_qty * production_rate`.
    pub hours: Decimal,
    /// `hours * labor rate`.
    pub labor_cost: Decimal,
    /// Equipment cost.
    pub equipment_cost: Decimal,
    /// Trucking cost.
    pub trucking_cost: Decimal,
    /// Dump fees.
    pub dump_fees_cost: Decimal,
    /// Material cost.
    pub material_cost: Decimal,
    /// Subcontractor cost.
    pub subcontractor_cost: Decimal,
    /// Sum of labor and the other cost components.
    pub budget_total: Decimal,
    /// Amount billed; equals `unit_total`.
    pub billing: Decimal,
    /// Actual measured quantity.
    pub actual_qty: Decimal,
    /// Actual billed quantity.
    pub actual_conv_qty: Decimal,
    /// Optional notes.
    pub notes: Option<String>,
    /// Category header row with no quantities.
    pub is_group: bool,
}

impl BudgetLineItem {
    /// Creates an empty line item with the given number.
    #[must_use]
    pub fn new(line_item_number: impl Into<String>) -> Self {
        Self {
            line_item_number: line_item_number.into(),
            line_item_name: String::new(),
            cost_code: String::new(),
            unconverted_unit_of_measure: String::new(),
            unconverted_qty: Decimal::ZERO,
            converted_unit_of_measure: String::new(),
            converted_qty: Decimal::ZERO,
            conversion_factor: Decimal::ONE,
            unit_cost: Decimal::ZERO,
            unit_total: Decimal::ZERO,
            production_rate: Decimal::ZERO,
            hours: Decimal::ZERO,
            labor_cost: Decimal::ZERO,
            equipment_cost: Decimal::ZERO,
            trucking_cost: Decimal::ZERO,
            dump_fees_cost: Decimal::ZERO,
            material_cost: Decimal::ZERO,
            subcontractor_cost: Decimal::ZERO,
            budget_total: Decimal::ZERO,
            billing: Decimal::ZERO,
            actual_qty: Decimal::ZERO,
            actual_conv_qty: Decimal::ZERO,
            notes: None,
            is_group: false,
        }
    }

    /// Number of the parent line item ("3" for "3.2"), if any.
    #[must_use]
    pub fn parent_number(&self) -> Option<&str> {
        self.line_item_number
            .rsplit_once('.')
            .map(|(parent, _)| parent)
            .filter(|parent| !parent.is_empty())
    }

    /// Nesting depth; top-level items are 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.line_item_number.matches('.').count()
    }
}

/// Result of mapping and computing a whole sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedSheet {
    /// Billable line items, in sheet order.
    pub items: Vec<BudgetLineItem>,
    /// Category rows kept for project-level summaries.
    pub groups: Vec<BudgetLineItem>,
}

impl ParsedSheet {
    /// Total of `budget_total` across billable items.
    #[must_use]
    pub fn budget_total(&self) -> Decimal {
        total_budget(&self.items)
    }

    /// Total of `billing` across billable items.
    #[must_use]
    pub fn billing_total(&self) -> Decimal {
        total_billing(&self.items)
    }
}

/// Sum of `budget_total`, saturating at the `Decimal` bounds.
#[must_use]
pub fn total_budget(items: &[BudgetLineItem]) -> Decimal {
    saturating_sum(items.iter().map(|item| item.budget_total))
}

/// Sum of `billing`, saturating at the `Decimal` bounds.
#[must_use]
pub fn total_billing(items: &[BudgetLineItem]) -> Decimal {
    saturating_sum(items.iter().map(|item| item.billing))
}
