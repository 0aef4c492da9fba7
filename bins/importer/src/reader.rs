//! Sheet readers.
//!
//! Every supported format is read into the same `Vec<Vec<Cell>>` shape,
//! first worksheet only, header row included.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::str::FromStr;

use calamine::{DataType, Reader, open_workbook_auto};
use csv::ReaderBuilder;
use rust_decimal::Decimal;
use sitebudget_core::budget::{Cell, Sheet};
use thiserror::Error;

/// File formats the importer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    /// Excel or OpenDocument workbook.
    Workbook,
    /// Comma-separated values.
    Csv,
    /// JSON array of row arrays.
    Json,
}

impl SheetFormat {
    /// Picks the format from the file extension.
    pub fn from_path(path: &Path) -> Result<Self, ReadError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(Self::Workbook),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(ReadError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Errors raised while reading a sheet file.
#[derive(Debug, Error)]
pub enum ReadError {
    /// Unknown file extension.
    #[error("Unsupported file type: {0} (expected .xlsx, .xls, .ods, .csv or .json)")]
    UnsupportedFormat(String),

    /// The workbook has no worksheets.
    #[error("Workbook has no worksheets")]
    NoWorksheet,

    /// Workbook could not be opened or parsed.
    #[error("Failed to read workbook: {0}")]
    Workbook(#[from] calamine::Error),

    /// CSV could not be parsed.
    #[error("Failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    /// JSON could not be parsed.
    #[error("Failed to read JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// File could not be opened.
    #[error("Failed to open file: {0}")]
    Io(#[from] std::io::Error),
}

/// Reads the first sheet of `path`.
pub fn read_sheet(path: &Path) -> Result<Sheet, ReadError> {
    match SheetFormat::from_path(path)? {
        SheetFormat::Workbook => read_workbook(path),
        SheetFormat::Csv => read_csv(BufReader::new(File::open(path)?)),
        SheetFormat::Json => read_json(BufReader::new(File::open(path)?)),
    }
}

fn read_workbook(path: &Path) -> Result<Sheet, ReadError> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(ReadError::NoWorksheet)??;

    Ok(range
        .rows()
        .map(|row| row.iter().map(workbook_cell).collect())
        .collect())
}

fn workbook_cell(cell: &DataType) -> Cell {
    match cell {
        DataType::Empty | DataType::Error(_) => Cell::Empty,
        DataType::String(text) => Cell::Text(text.clone()),
        DataType::Int(value) => Cell::Number(Decimal::from(*value)),
        // shortest round-trip text, so 0.1 stays 0.1
        DataType::Float(value) => Decimal::from_str(&value.to_string())
            .map_or_else(|_| Cell::Text(value.to_string()), Cell::Number),
        other => Cell::Text(other.to_string()),
    }
}

/// Reads CSV rows; every row is data, including the header.
pub fn read_csv<R: Read>(input: R) -> Result<Sheet, ReadError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(Cell::from).collect());
    }
    Ok(rows)
}

/// Reads a JSON array of rows. Cells may be strings, numbers or null.
pub fn read_json<R: Read>(input: R) -> Result<Sheet, ReadError> {
    Ok(serde_json::from_reader(input)?)
}
