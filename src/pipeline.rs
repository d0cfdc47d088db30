//! One-way analysis pipeline
//!
//! validate -> aggregate -> cross-tabulate -> association tests -> consistency.
//! Every derived table is freshly computed from the dataset and immutable
//! after construction; re-running the pipeline discards all prior state.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::association::{self, AssociationEntry, TestOutcome, TestSubject};
use crate::consistency::{self, ConsistencySummary};
use crate::crosstab::{self, ContingencyTable};
use crate::dataset::Dataset;
use crate::error::AnalysisError;
use crate::frequency::{self, FrequencyTable};

/// Complete result bundle of one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyAnalysis {
    /// Number of records in the dataset
    pub row_count: usize,
    /// Selection counts per color format
    pub frequencies: FrequencyTable,
    /// Selection share per color format; absent when there is no data
    pub percentages: Option<IndexMap<String, f64>>,
    /// Object x color-format counts
    pub crosstab: ContingencyTable,
    /// Overall test followed by one per-object test, in contingency-table
    /// row order
    pub associations: Vec<AssociationEntry>,
    /// Independence test of object x color format over the whole table
    pub independence: TestOutcome,
    /// Per-participant agreement; absent when the dataset cannot support it
    pub consistency: Option<ConsistencySummary>,
}

impl SurveyAnalysis {
    /// The per-object entries, without the overall test
    pub fn object_tests(&self) -> impl Iterator<Item = &AssociationEntry> {
        self.associations
            .iter()
            .filter(|entry| matches!(entry.subject, TestSubject::Object(_)))
    }

    pub fn overall_test(&self) -> Option<&AssociationEntry> {
        self.associations
            .iter()
            .find(|entry| entry.subject == TestSubject::Overall)
    }
}

/// Run the full pipeline over a validated dataset
pub fn analyze(dataset: &Dataset) -> Result<SurveyAnalysis, AnalysisError> {
    dataset.validate_schema()?;
    info!("Analyzing {} survey records", dataset.len());

    let frequencies = frequency::aggregate(dataset);
    let percentages = frequencies.percentages();
    debug!(
        "Aggregated {} selections over {} color formats",
        frequencies.total(),
        frequencies.len()
    );

    let crosstab = crosstab::cross_tabulate(dataset);
    debug!(
        "Cross-tabulated {} objects × {} color formats",
        crosstab.row_labels().len(),
        crosstab.col_labels().len()
    );

    let mut associations = Vec::with_capacity(crosstab.row_labels().len() + 1);
    associations.push(AssociationEntry {
        subject: TestSubject::Overall,
        outcome: association::test_overall(&frequencies),
    });
    for object in crosstab.row_labels() {
        associations.push(AssociationEntry {
            subject: TestSubject::Object(object.clone()),
            outcome: association::test_object(&crosstab, object),
        });
    }

    let independence = association::test_independence(&crosstab);
    let consistency = consistency::analyze(dataset);
    if consistency.is_none() {
        debug!("Consistency analysis unavailable: participant or repeat column missing");
    }

    Ok(SurveyAnalysis {
        row_count: dataset.len(),
        frequencies,
        percentages,
        crosstab,
        associations,
        independence,
        consistency,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_dataset() -> Dataset {
        Dataset::from_reader(
            "user_id,object,selected_color_space,repeat\n\
             p1,apple,RGB,1\n\
             p1,apple,RGB,2\n\
             p1,sky,CMYK,1\n\
             p2,apple,RGB,1\n\
             p2,sky,CMYK,1\n\
             p2,sky,Pantone,2\n\
             p3,apple,CMYK,1\n\
             p3,sky,CMYK,2\n"
                .as_bytes(),
        )
        .unwrap()
    }

    #[test]
    fn test_analyze_halts_on_missing_columns() {
        let dataset = Dataset::from_reader("user_id,repeat\np1,1\n".as_bytes()).unwrap();

        let err = analyze(&dataset).unwrap_err();
        assert!(matches!(err, AnalysisError::MissingColumns(_)));
    }

    #[test]
    fn test_analyze_produces_full_bundle() {
        let analysis = analyze(&full_dataset()).unwrap();

        assert_eq!(analysis.row_count, 8);
        assert_eq!(analysis.frequencies.total(), 8);
        assert!(analysis.percentages.is_some());
        assert_eq!(analysis.crosstab.grand_total(), 8);
        assert!(analysis.consistency.is_some());
    }

    #[test]
    fn test_associations_cover_overall_and_every_object() {
        let analysis = analyze(&full_dataset()).unwrap();

        assert!(analysis.overall_test().unwrap().outcome.is_computed());
        let objects: Vec<String> = analysis
            .object_tests()
            .map(|entry| entry.subject.to_string())
            .collect();
        assert_eq!(objects, vec!["object apple", "object sky"]);
    }

    #[test]
    fn test_object_order_follows_crosstab_rows() {
        let analysis = analyze(&full_dataset()).unwrap();

        let from_table: Vec<String> = analysis.crosstab.row_labels().to_vec();
        let from_tests: Vec<String> = analysis
            .object_tests()
            .map(|entry| match &entry.subject {
                TestSubject::Object(name) => name.clone(),
                other => panic!("unexpected subject {other:?}"),
            })
            .collect();
        assert_eq!(from_tests, from_table);
    }

    #[test]
    fn test_grand_total_invariant() {
        let analysis = analyze(&full_dataset()).unwrap();

        assert_eq!(
            analysis.crosstab.grand_total(),
            analysis.frequencies.total()
        );
    }

    #[test]
    fn test_consistency_absent_without_optional_columns() {
        let dataset = Dataset::from_reader(
            "object,selected_color_space\napple,RGB\n".as_bytes(),
        )
        .unwrap();

        let analysis = analyze(&dataset).unwrap();
        assert!(analysis.consistency.is_none());
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let dataset = full_dataset();

        let first = analyze(&dataset).unwrap();
        let second = analyze(&dataset).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_dataset_yields_insufficient_tests() {
        let dataset = Dataset::from_reader(
            "object,selected_color_space\n".as_bytes(),
        )
        .unwrap();

        let analysis = analyze(&dataset).unwrap();

        assert_eq!(analysis.row_count, 0);
        assert!(analysis.percentages.is_none());
        assert_eq!(analysis.associations.len(), 1);
        assert!(matches!(
            analysis.overall_test().unwrap().outcome,
            TestOutcome::InsufficientData { .. }
        ));
        assert!(matches!(
            analysis.independence,
            TestOutcome::InsufficientData { .. }
        ));
    }
}
