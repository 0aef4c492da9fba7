//! Formula engine for derived budget fields.
//!
//! The formula set is fixed:
//!
//! ```text
//! unit_total   = unconverted_qty * unit_cost
//! converted    = unconverted_qty * conversion_factor
//! hours        = converted_qty * production_rate
//! labor_cost   = hours * labor_rate
//! budget_total = labor + equipment + trucking + dump fees + material + subcontractor
//! billing      = unit_total
//! ```
//!
//! Derived fields are rounded to two decimal places as they are computed, and
//! later formulas consume the rounded values. Every function returns a new
//! record and leaves its input untouched.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::layout::Field;
use super::mapper::BudgetLineDraft;
use super::numeric::{round_money, saturating_sum, with_money_scale};
use super::types::BudgetLineItem;

/// Precedence between precomputed sheet values and formulas during import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormulaPolicy {
    /// Always compute derived fields, ignoring the sheet's own values.
    #[default]
    Recompute,
    /// Keep a derived value the sheet provides; compute only blank ones.
    PreferSheet,
}

impl FormulaPolicy {
    /// Configuration name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Recompute => "recompute",
            Self::PreferSheet => "prefer_sheet",
        }
    }
}

impl fmt::Display for FormulaPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FormulaPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "recompute" => Ok(Self::Recompute),
            "prefer_sheet" => Ok(Self::PreferSheet),
            _ => Err(format!("Unknown formula policy: {s}")),
        }
    }
}

/// Which actuals field the user edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum ActualsEdit {
    /// New actual measured quantity.
    ActualQty(Decimal),
    /// New actual billed quantity.
    ActualConvQty(Decimal),
}

/// Computes derived budget fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormulaEngine {
    labor_rate: Decimal,
    policy: FormulaPolicy,
}

impl FormulaEngine {
    /// Creates an engine with an explicit labor rate and sheet-value policy.
    #[must_use]
    pub const fn new(labor_rate: Decimal, policy: FormulaPolicy) -> Self {
        Self { labor_rate, policy }
    }

    /// Labor cost per hour.
    #[must_use]
    pub const fn labor_rate(&self) -> Decimal {
        self.labor_rate
    }

    /// Sheet-value policy.
    #[must_use]
    pub const fn policy(&self) -> FormulaPolicy {
        self.policy
    }

    /// Derives the conversion factor from the two quantities.
    ///
    /// Defaults to 1 when the unconverted quantity is zero.
    #[must_use]
    pub fn derive_conversion_factor(unconverted_qty: Decimal, converted_qty: Decimal) -> Decimal {
        if unconverted_qty.is_zero() {
            return Decimal::ONE;
        }
        converted_qty
            .checked_div(unconverted_qty)
            .map_or(Decimal::ONE, |factor| factor.normalize())
    }

    /// Computes every derived field of a freshly mapped row.
    #[must_use]
    pub fn compute_forward(&self, draft: &BudgetLineDraft) -> BudgetLineItem {
        let source = &draft.item;
        let mut item = source.clone();

        let from_sheet = |field: Field, value: Decimal| {
            (self.policy == FormulaPolicy::PreferSheet && draft.is_provided(field))
                .then(|| round_money(value))
        };

        item.conversion_factor = Self::resolve_conversion_factor(draft);
        item.unit_cost = with_money_scale(source.unit_cost);
        item.production_rate = with_money_scale(source.production_rate);

        item.converted_qty = from_sheet(Field::ConvertedQty, source.converted_qty)
            .unwrap_or_else(|| {
                round_money(source.unconverted_qty.saturating_mul(item.conversion_factor))
            });

        item.unit_total = from_sheet(Field::UnitTotal, source.unit_total)
            .unwrap_or_else(|| round_money(source.unconverted_qty.saturating_mul(source.unit_cost)));

        item.hours = from_sheet(Field::Hours, source.hours)
            .unwrap_or_else(|| round_money(item.converted_qty.saturating_mul(source.production_rate)));

        item.labor_cost = from_sheet(Field::LaborCost, source.labor_cost)
            .unwrap_or_else(|| round_money(item.hours.saturating_mul(self.labor_rate)));

        item.equipment_cost = round_money(source.equipment_cost);
        item.trucking_cost = round_money(source.trucking_cost);
        item.dump_fees_cost = round_money(source.dump_fees_cost);
        item.material_cost = round_money(source.material_cost);
        item.subcontractor_cost = round_money(source.subcontractor_cost);

        item.budget_total = from_sheet(Field::BudgetTotal, source.budget_total).unwrap_or_else(|| {
            round_money(saturating_sum([
                item.labor_cost,
                item.equipment_cost,
                item.trucking_cost,
                item.dump_fees_cost,
                item.material_cost,
                item.subcontractor_cost,
            ]))
        });

        item.billing = from_sheet(Field::Billing, source.billing).unwrap_or(item.unit_total);

        match (
            draft.is_provided(Field::ActualQty),
            draft.is_provided(Field::ActualConvQty),
        ) {
            (true, false) => Self::recompute_from_actual_qty(&item, source.actual_qty),
            (false, true) => Self::recompute_from_actual_conv_qty(&item, source.actual_conv_qty),
            _ => item,
        }
    }

    /// Sheet factor when given and non-zero, else derived from the converted
    /// quantity when that is given, else 1.
    fn resolve_conversion_factor(draft: &BudgetLineDraft) -> Decimal {
        let source = &draft.item;
        if draft.is_provided(Field::ConversionFactor) && !source.conversion_factor.is_zero() {
            source.conversion_factor.normalize()
        } else if draft.is_provided(Field::ConvertedQty) {
            Self::derive_conversion_factor(source.unconverted_qty, source.converted_qty)
        } else {
            Decimal::ONE
        }
    }

    /// Sets the actual quantity and recomputes the actual converted quantity.
    #[must_use]
    pub fn recompute_from_actual_qty(item: &BudgetLineItem, actual_qty: Decimal) -> BudgetLineItem {
        let mut updated = item.clone();
        updated.actual_qty = actual_qty.normalize();
        updated.actual_conv_qty = round_money(actual_qty.saturating_mul(item.conversion_factor));
        updated
    }

    /// Sets the actual converted quantity and recomputes the actual quantity.
    ///
    /// A zero conversion factor yields an actual quantity of 0.
    #[must_use]
    pub fn recompute_from_actual_conv_qty(
        item: &BudgetLineItem,
        actual_conv_qty: Decimal,
    ) -> BudgetLineItem {
        let mut updated = item.clone();
        updated.actual_conv_qty = actual_conv_qty.normalize();
        updated.actual_qty = actual_conv_qty
            .checked_div(item.conversion_factor)
            .map_or(Decimal::ZERO, round_money);
        updated
    }

    /// Applies a user edit to the actuals pair.
    #[must_use]
    pub fn apply_actuals_edit(item: &BudgetLineItem, edit: ActualsEdit) -> BudgetLineItem {
        match edit {
            ActualsEdit::ActualQty(value) => Self::recompute_from_actual_qty(item, value),
            ActualsEdit::ActualConvQty(value) => Self::recompute_from_actual_conv_qty(item, value),
        }
    }
}
