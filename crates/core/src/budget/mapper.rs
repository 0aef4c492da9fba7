//! Spreadsheet row mapper.

use std::collections::BTreeSet;

use super::cell::Cell;
use super::cost_code::normalize_cost_code;
use super::layout::{ColumnLayout, Field};
use super::numeric::normalize;
use super::types::BudgetLineItem;

/// A mapped row before the formula engine runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BudgetLineDraft {
    /// Values read straight from the sheet, numbers normalized leniently.
    pub item: BudgetLineItem,
    /// Fields whose source cell was non-blank.
    pub provided: BTreeSet<Field>,
}

impl BudgetLineDraft {
    /// Whether the sheet supplied a value for `field`.
    #[must_use]
    pub fn is_provided(&self, field: Field) -> bool {
        self.provided.contains(&field)
    }
}

/// Maps raw rows to budget line drafts using a column layout.
#[derive(Debug, Clone)]
pub struct RowMapper<'a> {
    layout: &'a ColumnLayout,
}

impl<'a> RowMapper<'a> {
    /// Creates a mapper over `layout`.
    #[must_use]
    pub const fn new(layout: &'a ColumnLayout) -> Self {
        Self { layout }
    }

    /// Maps one row, or returns `None` when the line item number is blank.
    #[must_use]
    pub fn map_row(&self, row: &[Cell]) -> Option<BudgetLineDraft> {
        let number = self.layout.cell(row, Field::LineItemNumber).text();
        if number.is_empty() {
            return None;
        }

        let provided: BTreeSet<Field> = self
            .layout
            .fields()
            .into_iter()
            .map(|(field, _)| field)
            .filter(|field| !self.layout.cell(row, *field).is_blank())
            .collect();

        let text = |field: Field| self.layout.cell(row, field).text();
        let number_of = |field: Field| normalize(self.layout.cell(row, field));

        let notes = text(Field::Notes);
        let item = BudgetLineItem {
            line_item_number: number,
            line_item_name: text(Field::LineItemName),
            cost_code: normalize_cost_code(&text(Field::CostCode)),
            unconverted_unit_of_measure: text(Field::UnconvertedUnitOfMeasure),
            unconverted_qty: number_of(Field::UnconvertedQty),
            converted_unit_of_measure: text(Field::ConvertedUnitOfMeasure),
            converted_qty: number_of(Field::ConvertedQty),
            conversion_factor: number_of(Field::ConversionFactor),
            unit_cost: number_of(Field::UnitCost),
            unit_total: number_of(Field::UnitTotal),
            production_rate: number_of(Field::ProductionRate),
            hours: number_of(Field::Hours),
            labor_cost: number_of(Field::LaborCost),
            equipment_cost: number_of(Field::EquipmentCost),
            trucking_cost: number_of(Field::TruckingCost),
            dump_fees_cost: number_of(Field::DumpFeesCost),
            material_cost: number_of(Field::MaterialCost),
            subcontractor_cost: number_of(Field::SubcontractorCost),
            budget_total: number_of(Field::BudgetTotal),
            billing: number_of(Field::Billing),
            actual_qty: number_of(Field::ActualQty),
            actual_conv_qty: number_of(Field::ActualConvQty),
            notes: (!notes.is_empty()).then_some(notes),
            is_group: !provided.contains(&Field::UnconvertedQty)
                && !provided.contains(&Field::ConvertedQty),
        };

        Some(BudgetLineDraft { item, provided })
    }
}
