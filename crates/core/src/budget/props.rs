//! Property-based tests for the budget import engine.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::cell::Cell;
use super::formula::FormulaEngine;
use super::layout::ColumnLayout;
use super::numeric::{normalize_text, round_money};
use super::types::BudgetLineItem;
use super::validation::{SheetValidator, ValidationErrorKind};

/// Strategy for positive two-decimal amounts from 0.01 to 1,000,000.00.
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for non-negative two-decimal amounts.
fn amount() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn item_with_factor(factor: Decimal) -> BudgetLineItem {
    let mut item = BudgetLineItem::new("1");
    item.conversion_factor = factor;
    item
}

fn data_row(number: &str) -> Vec<Cell> {
    ["", "Item", "EA", "1", "", "", "", "Concrete"]
        .iter()
        .enumerate()
        .map(|(i, c)| if i == 0 { Cell::from(number) } else { Cell::from(*c) })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Wrapping a number in parentheses negates it.
    #[test]
    fn prop_parenthesized_is_negated(q in positive_amount()) {
        let plain = q.to_string();
        prop_assert_eq!(
            normalize_text(&format!("({plain})")),
            format!("-{}", normalize_text(&plain))
        );
    }

    /// Currency symbols and thousands separators do not change the value.
    #[test]
    fn prop_currency_formatting_is_ignored(q in positive_amount()) {
        let whole = q.trunc().to_string();
        let mut grouped = String::new();
        for (i, ch) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }
        let fraction = q.fract().to_string();
        let fraction = fraction.trim_start_matches('0');
        let formatted = format!("${grouped}{fraction}");
        prop_assert_eq!(normalize_text(&formatted), q.normalize().to_string());
    }

    /// A derived factor reapplied to the unconverted quantity gives back the
    /// converted quantity at two decimal places.
    #[test]
    fn prop_conversion_factor_round_trip(
        unconverted in positive_amount(),
        converted in amount(),
    ) {
        let factor = FormulaEngine::derive_conversion_factor(unconverted, converted);
        prop_assert_eq!(round_money(unconverted * factor), round_money(converted));
    }

    /// Zero unconverted quantity always yields a factor of one.
    #[test]
    fn prop_zero_quantity_factor_is_one(converted in amount()) {
        prop_assert_eq!(
            FormulaEngine::derive_conversion_factor(Decimal::ZERO, converted),
            Decimal::ONE
        );
    }

    /// One qty -> converted -> qty cycle settles the pair: a second cycle
    /// reproduces it exactly, for any two-decimal factor.
    #[test]
    fn prop_actuals_reach_fixed_point(
        factor_cents in 1i64..100_000,
        qty in amount(),
    ) {
        let factor = Decimal::new(factor_cents, 2);
        let item = item_with_factor(factor);

        let cycle = |start: &BudgetLineItem, qty: Decimal| {
            let forward = FormulaEngine::recompute_from_actual_qty(start, qty);
            FormulaEngine::recompute_from_actual_conv_qty(&forward, forward.actual_conv_qty)
        };

        let first = cycle(&item, qty);
        let second = cycle(&first, first.actual_qty);

        prop_assert_eq!(second.actual_qty, first.actual_qty);
        prop_assert_eq!(second.actual_conv_qty, first.actual_conv_qty);
        if factor >= Decimal::ONE {
            prop_assert_eq!(first.actual_qty, qty);
        }
    }

    /// Applying the same edit twice changes nothing the second time.
    #[test]
    fn prop_actuals_edit_idempotent(
        factor_cents in 1i64..100_000,
        value in amount(),
    ) {
        let item = item_with_factor(Decimal::new(factor_cents, 2));

        let once = FormulaEngine::recompute_from_actual_conv_qty(&item, value);
        let twice = FormulaEngine::recompute_from_actual_conv_qty(&once, value);
        prop_assert_eq!(&once, &twice);

        let once = FormulaEngine::recompute_from_actual_qty(&item, value);
        let twice = FormulaEngine::recompute_from_actual_qty(&once, value);
        prop_assert_eq!(once, twice);
    }

    /// Exactly one duplicate error, on the row that repeats a number.
    #[test]
    fn prop_single_duplicate_detected(
        count in 1usize..30,
        pick in any::<prop::sample::Index>(),
    ) {
        let layout = ColumnLayout::generic();
        let mut sheet = vec![vec![Cell::from("Line Item Number")]];
        for n in 1..=count {
            sheet.push(data_row(&n.to_string()));
        }
        let repeated = pick.index(count) + 1;
        sheet.push(data_row(&format!(" {repeated} ")));

        let result = SheetValidator::new(&layout).validate(&sheet);
        let duplicates: Vec<_> = result
            .errors
            .iter()
            .filter(|e| e.kind == ValidationErrorKind::Duplicate)
            .collect();

        prop_assert_eq!(duplicates.len(), 1);
        prop_assert_eq!(duplicates[0].row, sheet.len());
        prop_assert_eq!(result.row_count, count + 1);
    }

    /// Validation never panics and validity always matches the error list.
    #[test]
    fn prop_validity_matches_errors(
        rows in prop::collection::vec(
            prop::collection::vec("[ a-zA-Z0-9$,().-]{0,8}", 0..22),
            0..12,
        ),
    ) {
        let layout = ColumnLayout::generic();
        let sheet: Vec<Vec<Cell>> = rows
            .iter()
            .map(|row| row.iter().map(|c| Cell::from(c.as_str())).collect())
            .collect();

        let result = SheetValidator::new(&layout).validate(&sheet);
        prop_assert_eq!(result.is_valid, result.errors.is_empty());
        prop_assert!(result.row_count <= sheet.len().saturating_sub(1));
    }
}

mod unit_tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_data_row_shape() {
        let row = data_row("9");
        assert_eq!(row[0], Cell::from("9"));
        assert_eq!(row[7], Cell::from("Concrete"));
    }

    #[test]
    fn test_fixed_point_with_fractional_factor() {
        let item = item_with_factor(dec!(0.5));
        let first = FormulaEngine::recompute_from_actual_qty(&item, dec!(7.25));
        assert_eq!(first.actual_conv_qty, dec!(3.63));
        let back = FormulaEngine::recompute_from_actual_conv_qty(&first, first.actual_conv_qty);
        assert_eq!(back.actual_qty, dec!(7.26));
        let again = FormulaEngine::recompute_from_actual_qty(&back, back.actual_qty);
        assert_eq!(again.actual_conv_qty, dec!(3.63));
    }
}
