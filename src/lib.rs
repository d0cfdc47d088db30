//! Paleta: statistical analysis for color-format preference surveys
//!
//! The pipeline takes a tabular survey export and derives selection
//! frequencies, an object x color-format contingency table, chi-squared
//! association tests with Cramér's V effect sizes, and a per-participant
//! consistency rate. All results are recomputed fresh per run; nothing
//! persists between analyses.

pub mod association;
pub mod consistency;
pub mod crosstab;
pub mod dataset;
pub mod error;
pub mod frequency;
pub mod pipeline;
pub mod report;

// Re-export key types for convenience
pub use association::{
    AssociationEntry, AssociationResult, TestOutcome, TestSubject, SIGNIFICANCE_LEVEL,
};
pub use consistency::{ConsistencyRecord, ConsistencySummary};
pub use crosstab::ContingencyTable;
pub use dataset::Dataset;
pub use error::AnalysisError;
pub use frequency::FrequencyTable;
pub use pipeline::SurveyAnalysis;
pub use report::{ReportFormat, SurveyReport};
