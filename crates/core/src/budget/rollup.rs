//! Cost code rollups for project-level summaries.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::BudgetLineItem;

/// Totals for one cost code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostCodeRollup {
    /// Cost code.
    pub cost_code: String,
    /// Number of line items.
    pub item_count: usize,
    /// Total labor hours.
    pub hours: Decimal,
    /// Total labor cost.
    pub labor_cost: Decimal,
    /// Total budget.
    pub budget_total: Decimal,
    /// Total billing.
    pub billing: Decimal,
}

/// Sums billable items by cost code, ordered by cost code. Group rows are skipped.
#[must_use]
pub fn rollup_by_cost_code(items: &[BudgetLineItem]) -> Vec<CostCodeRollup> {
    let mut totals: BTreeMap<&str, CostCodeRollup> = BTreeMap::new();

    for item in items.iter().filter(|item| !item.is_group) {
        let entry = totals
            .entry(item.cost_code.as_str())
            .or_insert_with(|| CostCodeRollup {
                cost_code: item.cost_code.clone(),
                item_count: 0,
                hours: Decimal::ZERO,
                labor_cost: Decimal::ZERO,
                budget_total: Decimal::ZERO,
                billing: Decimal::ZERO,
            });
        entry.item_count += 1;
        entry.hours = entry.hours.saturating_add(item.hours);
        entry.labor_cost = entry.labor_cost.saturating_add(item.labor_cost);
        entry.budget_total = entry.budget_total.saturating_add(item.budget_total);
        entry.billing = entry.billing.saturating_add(item.billing);
    }

    totals.into_values().collect()
}
