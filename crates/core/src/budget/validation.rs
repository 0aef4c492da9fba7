//! Whole-sheet validation.
//!
//! The validator reads raw rows directly and never stops at the first problem:
//! every row is checked and every error is collected into one report. It is
//! the only authority on whether an import may proceed.
//!
//! Row numbers in the report are spreadsheet row numbers (the header is row
//! 1). Sheet-level problems are reported against row 0, column "File".

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::cell::{is_blank_row, Cell};
use super::cost_code::{allowed_cost_codes_display, is_valid_cost_code};
use super::layout::{ColumnLayout, Field};
use super::numeric::{parse_cell, NumericPolicy};

/// Column name used for sheet-level errors.
pub const FILE_COLUMN: &str = "File";

/// Category of a validation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorKind {
    /// The sheet has no rows at all.
    EmptySheet,
    /// No row carried a line item number.
    NoDataRows,
    /// A required cell is blank.
    MissingRequired,
    /// The line item number was already used.
    Duplicate,
    /// The cost code is not on the allow-list.
    InvalidCostCode,
    /// A numeric cell is not a number.
    InvalidNumber,
}

/// One problem found in the sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Spreadsheet row number, or 0 for sheet-level errors.
    pub row: usize,
    /// Column header.
    pub column: String,
    /// Human-readable message.
    pub message: String,
    /// Error category.
    pub kind: ValidationErrorKind,
}

impl ValidationError {
    fn new(
        row: usize,
        column: impl Into<String>,
        kind: ValidationErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            row,
            column: column.into(),
            message: message.into(),
            kind,
        }
    }
}

/// Outcome of validating a sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    /// True when `errors` is empty.
    pub is_valid: bool,
    /// Every error, in row order.
    pub errors: Vec<ValidationError>,
    /// Non-fatal findings.
    pub warnings: Vec<String>,
    /// Rows with a line item number.
    pub row_count: usize,
}

impl ValidationResult {
    /// The report for a sheet with no rows.
    #[must_use]
    pub fn empty_sheet() -> Self {
        Self {
            is_valid: false,
            errors: vec![ValidationError::new(
                0,
                FILE_COLUMN,
                ValidationErrorKind::EmptySheet,
                "The file is empty",
            )],
            warnings: Vec::new(),
            row_count: 0,
        }
    }

    /// Errors reported for one spreadsheet row.
    pub fn errors_for_row(&self, row: usize) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter().filter(move |error| error.row == row)
    }

    /// Number of errors of the given kind.
    #[must_use]
    pub fn count_of(&self, kind: ValidationErrorKind) -> usize {
        self.errors.iter().filter(|error| error.kind == kind).count()
    }
}

/// Validates raw sheets against a column layout.
#[derive(Debug, Clone)]
pub struct SheetValidator<'a> {
    layout: &'a ColumnLayout,
}

impl<'a> SheetValidator<'a> {
    /// Creates a validator for `layout`.
    #[must_use]
    pub const fn new(layout: &'a ColumnLayout) -> Self {
        Self { layout }
    }

    /// Validates a whole sheet; row 0 is the header.
    #[must_use]
    pub fn validate(&self, sheet: &[Vec<Cell>]) -> ValidationResult {
        let Some(header) = sheet.first() else {
            return ValidationResult::empty_sheet();
        };

        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        let mut seen = HashSet::new();
        let mut row_count = 0;

        let header_width = header
            .iter()
            .rposition(|cell| !cell.is_blank())
            .map_or(0, |last| last + 1);
        let expected = self.layout.width();
        if header_width < expected {
            warnings.push(format!(
                "Header row has {header_width} columns; the {} layout expects {expected}",
                self.layout.name()
            ));
        }

        let numeric_fields = self.layout.numeric_fields();

        for (index, row) in sheet.iter().enumerate().skip(1) {
            let row_number = index + 1;
            if is_blank_row(row) {
                continue;
            }

            let number_cell = self.layout.cell(row, Field::LineItemNumber);
            if number_cell.is_blank() {
                errors.push(missing(row_number, Field::LineItemNumber));
                continue;
            }

            row_count += 1;

            let number = number_cell.text();
            if !seen.insert(number.clone()) {
                errors.push(ValidationError::new(
                    row_number,
                    Field::LineItemNumber.header(),
                    ValidationErrorKind::Duplicate,
                    format!("Duplicate line item number \"{number}\""),
                ));
            }

            let cost_code = self.layout.cell(row, Field::CostCode);
            if cost_code.is_blank() {
                errors.push(missing(row_number, Field::CostCode));
            } else if !is_valid_cost_code(&cost_code.text()) {
                errors.push(ValidationError::new(
                    row_number,
                    Field::CostCode.header(),
                    ValidationErrorKind::InvalidCostCode,
                    format!(
                        "Invalid cost code \"{}\". Must be one of: {}",
                        cost_code.text(),
                        allowed_cost_codes_display()
                    ),
                ));
            }

            for field in &numeric_fields {
                let cell = self.layout.cell(row, *field);
                if let Err(err) = parse_cell(cell, NumericPolicy::ReportError) {
                    errors.push(ValidationError::new(
                        row_number,
                        field.header(),
                        ValidationErrorKind::InvalidNumber,
                        err.to_string(),
                    ));
                }
            }
        }

        if row_count == 0 {
            errors.push(ValidationError::new(
                0,
                FILE_COLUMN,
                ValidationErrorKind::NoDataRows,
                "No valid data rows found",
            ));
        }

        ValidationResult {
            is_valid: errors.is_empty(),
            errors,
            warnings,
            row_count,
        }
    }
}

fn missing(row: usize, field: Field) -> ValidationError {
    ValidationError::new(
        row,
        field.header(),
        ValidationErrorKind::MissingRequired,
        format!("{} is required but missing", field.header()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<Cell> {
        cells.iter().map(|c| Cell::from(*c)).collect()
    }

    fn header() -> Vec<Cell> {
        ColumnLayout::generic()
            .template_columns()
            .iter()
            .map(|column| Cell::from(column.header))
            .collect()
    }

    fn validate(sheet: &[Vec<Cell>]) -> ValidationResult {
        let layout = ColumnLayout::generic();
        SheetValidator::new(&layout).validate(sheet)
    }

    #[test]
    fn test_empty_sheet() {
        let result = validate(&[]);
        assert!(!result.is_valid);
        assert_eq!(result.row_count, 0);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].row, 0);
        assert_eq!(result.errors[0].column, "File");
        assert!(result.errors[0].message.contains("empty"));
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_valid_sheet() {
        let result = validate(&[
            header(),
            row(&["1", "Mobilize", "LS", "1", "", "5000", "", "Mobilization"]),
            row(&["2", "Slab", "SF", "$1,200", "", "(4.50)", "", "concrete"]),
        ]);
        assert!(result.is_valid, "{:?}", result.errors);
        assert_eq!(result.row_count, 2);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_header_only_has_no_data_rows() {
        let result = validate(&[header()]);
        assert!(!result.is_valid);
        assert_eq!(result.count_of(ValidationErrorKind::NoDataRows), 1);
        assert_eq!(result.errors[0].message, "No valid data rows found");
    }

    #[test]
    fn test_missing_number_with_other_data() {
        let result = validate(&[
            header(),
            row(&["", "Some Name", "EA", "abc", "", "", "", "nonsense"]),
            row(&["1", "Ok", "EA", "1", "", "", "", "Concrete"]),
        ]);
        let row_errors: Vec<_> = result.errors_for_row(2).collect();
        assert_eq!(row_errors.len(), 1);
        assert_eq!(row_errors[0].column, "Line Item Number");
        assert_eq!(row_errors[0].kind, ValidationErrorKind::MissingRequired);
        assert_eq!(result.row_count, 1);
    }

    #[test]
    fn test_blank_separator_rows_are_skipped() {
        let result = validate(&[
            header(),
            row(&["", "", "  "]),
            vec![],
            row(&["1", "Ok", "EA", "1", "", "", "", "Concrete"]),
        ]);
        assert!(result.is_valid);
        assert_eq!(result.row_count, 1);
    }

    #[test]
    fn test_duplicate_reported_on_second_occurrence() {
        let result = validate(&[
            header(),
            row(&["5", "A", "EA", "1", "", "", "", "Concrete"]),
            row(&["6", "B", "EA", "1", "", "", "", "Concrete"]),
            row(&[" 5 ", "C", "EA", "1", "", "", "", "Concrete"]),
        ]);
        assert_eq!(result.count_of(ValidationErrorKind::Duplicate), 1);
        let duplicate = result
            .errors
            .iter()
            .find(|e| e.kind == ValidationErrorKind::Duplicate)
            .unwrap();
        assert_eq!(duplicate.row, 4);
        assert_eq!(result.row_count, 3);
    }

    #[test]
    fn test_cost_code_rules() {
        let result = validate(&[
            header(),
            row(&["1", "A", "EA", "1", "", "", "", ""]),
            row(&["2", "B", "EA", "1", "", "", "", "Rebar"]),
            row(&["3", "C", "EA", "1", "", "", "", " ASPHALT "]),
        ]);
        let missing: Vec<_> = result.errors_for_row(2).collect();
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].message, "Cost Code is required but missing");

        let invalid: Vec<_> = result.errors_for_row(3).collect();
        assert_eq!(invalid.len(), 1);
        assert_eq!(invalid[0].kind, ValidationErrorKind::InvalidCostCode);
        assert!(invalid[0].message.contains("\"Rebar\""));
        assert!(invalid[0].message.contains("Base/Grading"));

        assert_eq!(result.errors_for_row(4).count(), 0);
    }

    #[test]
    fn test_invalid_numbers_are_all_reported() {
        let result = validate(&[
            header(),
            row(&["1", "A", "EA", "ten", "", "12.5x", "", "Concrete", "", "", "", "", "", "$5"]),
        ]);
        let columns: Vec<_> = result
            .errors_for_row(2)
            .filter(|e| e.kind == ValidationErrorKind::InvalidNumber)
            .map(|e| e.column.as_str())
            .collect();
        assert_eq!(columns, vec!["Quantity", "Unit Cost"]);
        assert_eq!(result.errors[0].message, "Invalid number format: \"ten\"");
    }

    #[test]
    fn test_short_header_is_a_warning() {
        let result = validate(&[
            row(&["Line Item Number", "Line Item Name"]),
            row(&["1", "A", "EA", "1", "", "", "", "Concrete"]),
        ]);
        assert!(result.is_valid);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("expects 20"));
    }

    #[test]
    fn test_errors_accumulate_across_rows() {
        let result = validate(&[
            header(),
            row(&["1", "A", "EA", "x", "", "", "", "Concrete"]),
            row(&["", "orphan"]),
            row(&["1", "B", "EA", "1", "", "", "", "bogus"]),
        ]);
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 4);
        assert_eq!(result.row_count, 2);
    }

    #[test]
    fn test_report_serializes_camel_case() {
        let json = serde_json::to_value(validate(&[])).unwrap();
        assert_eq!(json["isValid"], false);
        assert_eq!(json["rowCount"], 0);
        assert_eq!(json["errors"][0]["column"], "File");
        assert_eq!(json["errors"][0]["kind"], "empty_sheet");
    }
}
