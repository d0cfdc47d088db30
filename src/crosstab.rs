//! Object x color-format cross-tabulation
//!
//! The table is rectangular by construction: every (object, format) pair
//! gets a cell, with unobserved combinations held at zero. Downstream
//! chi-squared computation relies on that shape.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::dataset::{self, Dataset, COLOR_SPACE_COLUMN, OBJECT_COLUMN};

/// 2-D table of observed counts, objects as rows and color formats as
/// columns, labels in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContingencyTable {
    row_labels: Vec<String>,
    col_labels: Vec<String>,
    cells: Vec<Vec<u64>>,
}

impl ContingencyTable {
    /// Build from (object, color-format) pairs; pairs with a null member
    /// are excluded
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut row_index: IndexMap<String, usize> = IndexMap::new();
        let mut col_index: IndexMap<String, usize> = IndexMap::new();
        let mut observed: Vec<(usize, usize)> = Vec::new();

        for (object, format) in pairs {
            if dataset::is_null(object) || dataset::is_null(format) {
                continue;
            }
            let next = row_index.len();
            let row = *row_index.entry(object.trim().to_string()).or_insert(next);
            let next = col_index.len();
            let col = *col_index.entry(format.trim().to_string()).or_insert(next);
            observed.push((row, col));
        }

        let mut cells = vec![vec![0u64; col_index.len()]; row_index.len()];
        for (row, col) in observed {
            cells[row][col] += 1;
        }

        Self {
            row_labels: row_index.into_keys().collect(),
            col_labels: col_index.into_keys().collect(),
            cells,
        }
    }

    /// Object labels in first-seen order
    pub fn row_labels(&self) -> &[String] {
        &self.row_labels
    }

    /// Color-format labels in first-seen order
    pub fn col_labels(&self) -> &[String] {
        &self.col_labels
    }

    pub fn is_empty(&self) -> bool {
        self.row_labels.is_empty()
    }

    /// Full count matrix, row-major
    pub fn cells(&self) -> &[Vec<u64>] {
        &self.cells
    }

    pub fn get(&self, object: &str, format: &str) -> Option<u64> {
        let row = self.row_labels.iter().position(|l| l == object)?;
        let col = self.col_labels.iter().position(|l| l == format)?;
        Some(self.cells[row][col])
    }

    /// One object's counts across every color format
    pub fn row(&self, object: &str) -> Option<&[u64]> {
        let row = self.row_labels.iter().position(|l| l == object)?;
        Some(&self.cells[row])
    }

    pub fn row_total(&self, object: &str) -> Option<u64> {
        self.row(object).map(|row| row.iter().sum())
    }

    pub fn col_total(&self, format: &str) -> Option<u64> {
        let col = self.col_labels.iter().position(|l| l == format)?;
        Some(self.cells.iter().map(|row| row[col]).sum())
    }

    pub fn grand_total(&self) -> u64 {
        self.cells.iter().flatten().sum()
    }
}

/// Cross-tabulate the object and selection columns of a dataset
pub fn cross_tabulate(dataset: &Dataset) -> ContingencyTable {
    let objects = dataset.column(OBJECT_COLUMN).unwrap_or_default();
    let formats = dataset.column(COLOR_SPACE_COLUMN).unwrap_or_default();
    ContingencyTable::from_pairs(objects.into_iter().zip(formats))
}
