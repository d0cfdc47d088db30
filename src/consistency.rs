//! Participant consistency across repeated selections
//!
//! Only runs when the dataset identifies participants and trial repeats;
//! otherwise the analysis is unavailable, which is not an error.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::dataset::{
    self, Dataset, COLOR_SPACE_COLUMN, OBJECT_COLUMN, PARTICIPANT_COLUMN,
};

/// The selections one participant made for one object across repeats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyRecord {
    pub participant: String,
    pub object: String,
    pub selections: Vec<String>,
    /// True iff every selection in the group is identical
    pub consistent: bool,
}

/// All per-group records plus the aggregate rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsistencySummary {
    pub records: Vec<ConsistencyRecord>,
    /// Consistent groups / all groups x 100; `None` when there are no
    /// groups to rate
    pub consistency_rate: Option<f64>,
}

impl ConsistencySummary {
    pub fn consistent_count(&self) -> usize {
        self.records.iter().filter(|r| r.consistent).count()
    }
}

/// Group selections by (participant, object) and rate their agreement.
/// Returns `None` when the dataset lacks the participant or repeat column.
pub fn analyze(dataset: &Dataset) -> Option<ConsistencySummary> {
    if !dataset.supports_consistency() {
        return None;
    }

    let participants = dataset.column(PARTICIPANT_COLUMN)?;
    let objects = dataset.column(OBJECT_COLUMN)?;
    let selections = dataset.column(COLOR_SPACE_COLUMN)?;

    let mut groups: IndexMap<(String, String), Vec<String>> = IndexMap::new();
    for ((participant, object), selection) in
        participants.iter().zip(&objects).zip(&selections)
    {
        if dataset::is_null(participant)
            || dataset::is_null(object)
            || dataset::is_null(selection)
        {
            continue;
        }
        groups
            .entry((participant.trim().to_string(), object.trim().to_string()))
            .or_default()
            .push(selection.trim().to_string());
    }

    let records: Vec<ConsistencyRecord> = groups
        .into_iter()
        .map(|((participant, object), selections)| {
            let consistent = selections.windows(2).all(|pair| pair[0] == pair[1]);
            ConsistencyRecord {
                participant,
                object,
                selections,
                consistent,
            }
        })
        .collect();

    let consistency_rate = if records.is_empty() {
        None
    } else {
        let consistent = records.iter().filter(|r| r.consistent).count();
        Some(consistent as f64 / records.len() as f64 * 100.0)
    };

    Some(ConsistencySummary {
        records,
        consistency_rate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(body: &str) -> Dataset {
        let csv = format!("user_id,object,selected_color_space,repeat\n{body}");
        Dataset::from_reader(csv.as_bytes()).unwrap()
    }

    #[test]
    fn test_repeated_identical_selection_is_consistent() {
        let summary = analyze(&dataset("p1,apple,RGB,1\np1,apple,RGB,2\n")).unwrap();

        assert_eq!(summary.records.len(), 1);
        let record = &summary.records[0];
        assert_eq!(record.participant, "p1");
        assert_eq!(record.object, "apple");
        assert_eq!(record.selections, vec!["RGB", "RGB"]);
        assert!(record.consistent);
        assert_eq!(summary.consistency_rate, Some(100.0));
    }

    #[test]
    fn test_changed_selection_is_inconsistent() {
        let summary = analyze(&dataset("p1,apple,RGB,1\np1,apple,CMYK,2\n")).unwrap();

        assert!(!summary.records[0].consistent);
        assert_eq!(summary.consistency_rate, Some(0.0));
    }

    #[test]
    fn test_groups_are_per_participant_and_object() {
        let summary = analyze(&dataset(
            "p1,apple,RGB,1\n\
             p1,apple,RGB,2\n\
             p1,sky,CMYK,1\n\
             p2,apple,Pantone,1\n\
             p2,apple,RGB,2\n",
        ))
        .unwrap();

        assert_eq!(summary.records.len(), 3);
        assert_eq!(summary.consistent_count(), 2);
        let rate = summary.consistency_rate.unwrap();
        assert!((rate - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_selection_group_counts_as_consistent() {
        let summary = analyze(&dataset("p1,apple,RGB,1\n")).unwrap();

        assert!(summary.records[0].consistent);
        assert_eq!(summary.consistency_rate, Some(100.0));
    }

    #[test]
    fn test_unavailable_without_participant_column() {
        let csv = "object,selected_color_space,repeat\napple,RGB,1\n";
        let dataset = Dataset::from_reader(csv.as_bytes()).unwrap();

        assert!(analyze(&dataset).is_none());
    }

    #[test]
    fn test_unavailable_without_repeat_column() {
        let csv = "user_id,object,selected_color_space\np1,apple,RGB\n";
        let dataset = Dataset::from_reader(csv.as_bytes()).unwrap();

        assert!(analyze(&dataset).is_none());
    }

    #[test]
    fn test_no_groups_has_no_rate() {
        let summary = analyze(&dataset("")).unwrap();

        assert!(summary.records.is_empty());
        assert_eq!(summary.consistency_rate, None);
    }

    #[test]
    fn test_rows_with_null_fields_are_excluded() {
        let summary = analyze(&dataset(
            "p1,apple,RGB,1\n\
             ,apple,RGB,2\n\
             p1,,RGB,3\n\
             p1,apple,,4\n",
        ))
        .unwrap();

        assert_eq!(summary.records.len(), 1);
        assert_eq!(summary.records[0].selections, vec!["RGB"]);
    }

    #[test]
    fn test_records_in_first_seen_order() {
        let summary = analyze(&dataset(
            "p2,sky,CMYK,1\np1,apple,RGB,1\np2,sky,CMYK,2\n",
        ))
        .unwrap();

        assert_eq!(summary.records[0].participant, "p2");
        assert_eq!(summary.records[1].participant, "p1");
    }
}
