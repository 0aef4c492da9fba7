//! Numeric normalization for raw cell values.
//!
//! Every numeric budget field passes through here. Cells may carry accounting
//! negatives (`(123.45)`), currency symbols, and thousands separators; the
//! normalizer strips those and yields a canonical `Decimal`. Binary floats are
//! never involved.
//!
//! The same parser serves two callers with different failure policies: the
//! row mapper coerces unparseable text to zero so a whole sheet can always be
//! mapped, while the validator reports it.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

use super::cell::Cell;
use super::error::NumberFormatError;

/// Decimal places used for every formula-computed and currency field.
pub const MONEY_DECIMAL_PLACES: u32 = 2;

/// What to do when a non-blank cell is not a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericPolicy {
    /// Treat the cell as zero.
    CoerceToZero,
    /// Return a `NumberFormatError`.
    ReportError,
}

/// Parses a cell into a canonical decimal under the given policy.
///
/// Blank cells are zero under either policy.
///
/// # Errors
///
/// Returns `NumberFormatError` only under `NumericPolicy::ReportError` when
/// the cell holds text that is not a number.
pub fn parse_cell(cell: &Cell, policy: NumericPolicy) -> Result<Decimal, NumberFormatError> {
    match cell {
        Cell::Empty => Ok(Decimal::ZERO),
        Cell::Number(value) => Ok(value.normalize()),
        Cell::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Ok(Decimal::ZERO);
            }
            match parse_text(trimmed) {
                Some(value) => Ok(value),
                None => match policy {
                    NumericPolicy::CoerceToZero => Ok(Decimal::ZERO),
                    NumericPolicy::ReportError => Err(NumberFormatError {
                        value: trimmed.to_string(),
                    }),
                },
            }
        }
    }
}

/// Lenient normalization used while mapping rows.
#[must_use]
pub fn normalize(cell: &Cell) -> Decimal {
    parse_cell(cell, NumericPolicy::CoerceToZero).unwrap_or(Decimal::ZERO)
}

/// Normalizes raw text, returning the canonical string form.
///
/// `normalize_text("(1,234.50)")` is `"-1234.5"`; garbage and blanks are `"0"`.
#[must_use]
pub fn normalize_text(raw: &str) -> String {
    normalize(&Cell::from(raw)).to_string()
}

/// Parses trimmed, non-empty text. Returns `None` when it is not a number.
fn parse_text(text: &str) -> Option<Decimal> {
    let cleaned: String = text
        .chars()
        .filter(|c| *c != '$' && *c != ',')
        .collect();
    let cleaned = cleaned.trim();

    if let Some(inner) = cleaned
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
    {
        let inner = inner.trim();
        // "(-5)" is not an accounting negative
        if inner.starts_with(['-', '+']) {
            return None;
        }
        return parse_plain(inner).map(|value| (-value).normalize());
    }

    parse_plain(cleaned)
}

fn parse_plain(text: &str) -> Option<Decimal> {
    if text.is_empty() || text.contains('_') {
        return None;
    }
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
        .map(|value| value.normalize())
}

/// Rounds to exactly two decimal places, midpoint away from zero.
///
/// The result always carries scale 2, so `1000` renders as `1000.00`.
#[must_use]
pub fn round_money(value: Decimal) -> Decimal {
    let mut rounded =
        value.round_dp_with_strategy(MONEY_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(MONEY_DECIMAL_PLACES);
    if rounded.is_zero() {
        rounded.set_sign_positive(true);
    }
    rounded
}

/// Formats a value with exactly two decimal places.
#[must_use]
pub fn format_money(value: Decimal) -> String {
    round_money(value).to_string()
}

/// Pads a value to at least two decimal places without rounding.
///
/// `10` becomes `10.00` and `0.125` is left as is.
#[must_use]
pub fn with_money_scale(value: Decimal) -> Decimal {
    let mut padded = value.normalize();
    if padded.scale() < MONEY_DECIMAL_PLACES {
        padded.rescale(MONEY_DECIMAL_PLACES);
    }
    padded
}

/// Sums values, clamping at the `Decimal` bounds instead of overflowing.
#[must_use]
pub fn saturating_sum<I>(values: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    values.into_iter().fold(Decimal::ZERO, Decimal::saturating_add)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case("", "0")]
    #[case("   ", "0")]
    #[case("123.45", "123.45")]
    #[case("(123.45)", "-123.45")]
    #[case("$1,234.50", "1234.5")]
    #[case("($1,234.50)", "-1234.5")]
    #[case("-$5", "-5")]
    #[case(" 10 ", "10")]
    #[case("1.50", "1.5")]
    #[case("1e3", "1000")]
    #[case("abc", "0")]
    #[case("12abc", "0")]
    #[case("(-5)", "0")]
    #[case("()", "0")]
    #[case("0.00", "0")]
    fn test_normalize_text(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalize_text(raw), expected);
    }

    #[test]
    fn test_empty_and_number_cells() {
        assert_eq!(normalize(&Cell::Empty), Decimal::ZERO);
        assert_eq!(normalize(&Cell::Number(dec!(2.500))), dec!(2.5));
        assert_eq!(normalize(&Cell::Number(dec!(2.500))).to_string(), "2.5");
    }

    #[test]
    fn test_report_error_policy() {
        let err = parse_cell(&Cell::from(" 12x "), NumericPolicy::ReportError).unwrap_err();
        assert_eq!(err.value, "12x");
        assert_eq!(err.to_string(), "Invalid number format: \"12x\"");
    }

    #[test]
    fn test_report_error_policy_accepts_formatted_numbers() {
        let value = parse_cell(&Cell::from("$(2,000)"), NumericPolicy::ReportError).unwrap();
        assert_eq!(value, dec!(-2000));
        let blank = parse_cell(&Cell::from(""), NumericPolicy::ReportError).unwrap();
        assert_eq!(blank, Decimal::ZERO);
    }

    #[test]
    fn test_coerce_policy_never_fails() {
        let value = parse_cell(&Cell::from("n/a"), NumericPolicy::CoerceToZero).unwrap();
        assert_eq!(value, Decimal::ZERO);
    }

    #[test]
    fn test_round_money_scale() {
        assert_eq!(round_money(dec!(1000)).to_string(), "1000.00");
        assert_eq!(round_money(dec!(1.005)).to_string(), "1.01");
        assert_eq!(round_money(dec!(-1.005)).to_string(), "-1.01");
        assert_eq!(round_money(dec!(2.344)).to_string(), "2.34");
        assert_eq!(round_money(dec!(-0.001)).to_string(), "0.00");
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(dec!(12000)), "12000.00");
        assert_eq!(format_money(dec!(0.1)), "0.10");
    }

    #[rstest]
    #[case(dec!(10), "10.00")]
    #[case(dec!(1.5), "1.50")]
    #[case(dec!(0.125), "0.125")]
    #[case(dec!(12.500), "12.50")]
    #[case(dec!(0), "0.00")]
    fn test_with_money_scale(#[case] value: Decimal, #[case] expected: &str) {
        assert_eq!(with_money_scale(value).to_string(), expected);
    }

    #[test]
    fn test_saturating_sum_clamps_at_max() {
        let total = saturating_sum([Decimal::MAX, Decimal::MAX, dec!(1)]);
        assert_eq!(total, Decimal::MAX);
        assert_eq!(saturating_sum([dec!(1.25), dec!(-0.25)]), dec!(1.00));
        assert_eq!(saturating_sum(Vec::new()), Decimal::ZERO);
    }
}
