//! Survey dataset loading and schema validation
//!
//! A `Dataset` is the immutable tabular input every analysis is computed
//! from. Loading reads the whole file up front; nothing is persisted
//! between runs.

use std::io::Read;
use std::path::Path;

use tracing::{debug, info};

use crate::error::AnalysisError;

/// Column holding the color format a participant selected
pub const COLOR_SPACE_COLUMN: &str = "selected_color_space";
/// Column identifying the object the selection was made for
pub const OBJECT_COLUMN: &str = "object";
/// Optional column identifying the participant
pub const PARTICIPANT_COLUMN: &str = "user_id";
/// Optional column carrying the trial index
pub const REPEAT_COLUMN: &str = "repeat";

/// Columns every survey export must carry
pub const REQUIRED_COLUMNS: [&str; 2] = [COLOR_SPACE_COLUMN, OBJECT_COLUMN];

/// True when a cell holds no usable value
pub fn is_null(value: &str) -> bool {
    value.trim().is_empty()
}

/// An ordered sequence of survey records with named columns
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Dataset {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { columns, rows }
    }

    /// Load a dataset from a delimited text file with a header row
    pub fn from_path(path: &Path) -> Result<Self, AnalysisError> {
        info!("Loading survey data from {:?}", path);
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)?;
        Self::from_csv_reader(reader)
    }

    /// Load a dataset from any reader producing delimited text
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, AnalysisError> {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        Self::from_csv_reader(reader)
    }

    fn from_csv_reader<R: Read>(mut reader: csv::Reader<R>) -> Result<Self, AnalysisError> {
        let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        debug!("Loaded {} rows, {} columns", rows.len(), columns.len());
        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All values of one column in record order, nulls included
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let index = self.column_index(name)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(index).map(String::as_str).unwrap_or(""))
                .collect(),
        )
    }

    /// Verify the mandatory columns are present, reporting every absence
    pub fn validate_schema(&self) -> Result<(), AnalysisError> {
        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|name| !self.has_column(name))
            .map(|name| name.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(AnalysisError::MissingColumns(missing))
        }
    }

    /// Whether the dataset carries the columns consistency analysis needs
    pub fn supports_consistency(&self) -> bool {
        self.has_column(PARTICIPANT_COLUMN) && self.has_column(REPEAT_COLUMN)
    }
}
