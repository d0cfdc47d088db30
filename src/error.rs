//! Fatal error types for the analysis pipeline
//!
//! Only failures that halt a whole run live here. Per-test failures are
//! tagged outcomes, not errors (see `association::TestOutcome`).

use thiserror::Error;

/// Errors that abort an analysis run
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("The following required columns are missing from the data: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Failed to parse input as tabular data: {0}")]
    Parse(#[from] csv::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_lists_every_name() {
        let err = AnalysisError::MissingColumns(vec![
            "selected_color_space".to_string(),
            "object".to_string(),
        ]);

        let message = err.to_string();
        assert!(message.contains("selected_color_space"));
        assert!(message.contains("object"));
    }

    #[test]
    fn test_parse_error_wraps_csv_error() {
        let result = csv::ReaderBuilder::new()
            .from_reader("a,b\n1\n".as_bytes())
            .into_records()
            .collect::<Result<Vec<_>, _>>();

        let err: AnalysisError = result.unwrap_err().into();
        assert!(err.to_string().contains("tabular data"));
    }
}
