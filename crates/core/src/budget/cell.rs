//! Raw spreadsheet cells as handed over by the sheet reader.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One raw cell value.
///
/// Serialized untagged so a JSON sheet can be written as plain arrays of
/// `null`, strings, and numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    /// Blank cell.
    #[default]
    Empty,
    /// Text as typed into the sheet, untrimmed.
    Text(String),
    /// Numeric cell.
    Number(Decimal),
}

/// An ordered sequence of raw cells.
pub type Row = Vec<Cell>;

/// An ordered sequence of rows; row 0 is the header.
pub type Sheet = Vec<Row>;

/// Shared blank cell returned for columns a row does not reach.
pub(crate) static EMPTY_CELL: Cell = Cell::Empty;

impl Cell {
    /// Returns true for empty cells and whitespace-only text.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(text) => text.trim().is_empty(),
            Self::Number(_) => false,
        }
    }

    /// Returns the trimmed textual form of the cell.
    #[must_use]
    pub fn text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(text) => text.trim().to_string(),
            Self::Number(value) => value.normalize().to_string(),
        }
    }
}

/// Returns true if every cell in the row is blank.
#[must_use]
pub fn is_blank_row(row: &[Cell]) -> bool {
    row.iter().all(Cell::is_blank)
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Decimal> for Cell {
    fn from(value: Decimal) -> Self {
        Self::Number(value)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Empty, Into::into)
    }
}
