//! Frequency aggregation for color-format selections

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::dataset::{self, Dataset, COLOR_SPACE_COLUMN};

/// Selection counts per category, in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrequencyTable {
    counts: IndexMap<String, u64>,
    total: u64,
}

impl FrequencyTable {
    /// Count non-null values; order of input values is irrelevant beyond
    /// fixing the first-seen category order
    pub fn from_values<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut counts: IndexMap<String, u64> = IndexMap::new();
        let mut total = 0;

        for value in values {
            if dataset::is_null(value) {
                continue;
            }
            *counts.entry(value.trim().to_string()).or_insert(0) += 1;
            total += 1;
        }

        Self { counts, total }
    }

    pub fn count(&self, category: &str) -> u64 {
        self.counts.get(category).copied().unwrap_or(0)
    }

    /// Sum of all counts; equals the number of non-null selections
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of distinct categories
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.counts.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(category, &count)| (category.as_str(), count))
    }

    /// Share of each category as count / total x 100.
    /// `None` when there are no non-null selections to divide by.
    pub fn percentages(&self) -> Option<IndexMap<String, f64>> {
        if self.total == 0 {
            return None;
        }
        Some(
            self.counts
                .iter()
                .map(|(category, &count)| {
                    (category.clone(), count as f64 / self.total as f64 * 100.0)
                })
                .collect(),
        )
    }
}

/// Aggregate the selection column of a dataset
pub fn aggregate(dataset: &Dataset) -> FrequencyTable {
    FrequencyTable::from_values(dataset.column(COLOR_SPACE_COLUMN).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_counts_and_total() {
        let table = FrequencyTable::from_values(["RGB", "CMYK", "RGB", "Pantone", "RGB"]);

        assert_eq!(table.count("RGB"), 3);
        assert_eq!(table.count("CMYK"), 1);
        assert_eq!(table.count("Pantone"), 1);
        assert_eq!(table.count("HSL"), 0);
        assert_eq!(table.total(), 5);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_nulls_are_skipped() {
        let table = FrequencyTable::from_values(["RGB", "", "  ", "CMYK"]);

        assert_eq!(table.total(), 2);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_first_seen_category_order() {
        let table = FrequencyTable::from_values(["Pantone", "RGB", "CMYK", "RGB"]);

        let order: Vec<&str> = table.categories().collect();
        assert_eq!(order, vec!["Pantone", "RGB", "CMYK"]);
    }

    #[test]
    fn test_percentages_example() {
        // counts {RGB:6, CMYK:3, Pantone:1} -> {60%, 30%, 10%}
        let mut values = vec!["RGB"; 6];
        values.extend(vec!["CMYK"; 3]);
        values.push("Pantone");
        let table = FrequencyTable::from_values(values);

        let percentages = table.percentages().unwrap();
        assert_eq!(percentages["RGB"], 60.0);
        assert_eq!(percentages["CMYK"], 30.0);
        assert_eq!(percentages["Pantone"], 10.0);
    }

    #[test]
    fn test_percentages_none_when_no_data() {
        let empty = FrequencyTable::from_values(Vec::new());
        assert!(empty.percentages().is_none());

        let only_nulls = FrequencyTable::from_values(["", " "]);
        assert!(only_nulls.percentages().is_none());
    }

    #[test]
    fn test_aggregate_reads_selection_column() {
        let dataset = Dataset::from_reader(
            "object,selected_color_space\napple,RGB\napple,RGB\nsky,CMYK\n".as_bytes(),
        )
        .unwrap();

        let table = aggregate(&dataset);
        assert_eq!(table.count("RGB"), 2);
        assert_eq!(table.count("CMYK"), 1);
        assert_eq!(table.total(), 3);
    }

    proptest! {
        #[test]
        fn prop_total_equals_non_null_count(values in proptest::collection::vec("[ A-Za-z]{0,8}", 0..64)) {
            let table = FrequencyTable::from_values(values.iter().map(String::as_str));
            let non_null = values.iter().filter(|v| !crate::dataset::is_null(v)).count() as u64;
            prop_assert_eq!(table.total(), non_null);

            let sum: u64 = table.iter().map(|(_, count)| count).sum();
            prop_assert_eq!(sum, non_null);
        }

        #[test]
        fn prop_percentages_sum_to_100(values in proptest::collection::vec("[A-C]", 1..64)) {
            let table = FrequencyTable::from_values(values.iter().map(String::as_str));
            let percentages = table.percentages().unwrap();
            let sum: f64 = percentages.values().sum();
            prop_assert!((sum - 100.0).abs() < 1e-9);
        }
    }
}
