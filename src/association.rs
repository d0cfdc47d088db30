//! Chi-squared association testing and Cramér's V effect size
//!
//! Every test reduces to a Pearson chi-squared statistic over a table of
//! observed counts. A single-row table is tested against a uniform expected
//! distribution with k-1 degrees of freedom; an rxk table (r >= 2) against
//! marginal-derived expected frequencies with (r-1)(k-1) degrees of
//! freedom. Failures never propagate past the test that produced them:
//! each call returns a tagged outcome.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ChiSquared, ContinuousCDF};

use crate::crosstab::ContingencyTable;
use crate::frequency::FrequencyTable;

/// Fixed significance threshold applied to every p-value
pub const SIGNIFICANCE_LEVEL: f64 = 0.05;

/// A computed chi-squared test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssociationResult {
    /// Pearson chi-squared statistic
    pub chi2: f64,
    /// Upper-tail probability of the statistic under the null
    pub p_value: f64,
    /// Degrees of freedom
    pub dof: usize,
    /// Bias-corrected Cramér's V, 0 when not computable
    pub cramers_v: f64,
    /// True when p_value < [`SIGNIFICANCE_LEVEL`]
    pub significant: bool,
}

/// Outcome of one test; failures stay local to the test that hit them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TestOutcome {
    Computed(AssociationResult),
    /// Too few categories, zero total, or a zero cell where the
    /// precondition forbids one
    InsufficientData { reason: String },
    /// The computation itself broke down (degenerate expected matrix,
    /// distribution failure)
    NumericalError { reason: String },
}

impl TestOutcome {
    pub fn result(&self) -> Option<&AssociationResult> {
        match self {
            TestOutcome::Computed(result) => Some(result),
            _ => None,
        }
    }

    pub fn is_computed(&self) -> bool {
        matches!(self, TestOutcome::Computed(_))
    }
}

/// What a test was run over
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TestSubject {
    /// Selection frequencies pooled across all objects
    Overall,
    /// The selection frequencies of one object
    Object(String),
}

impl std::fmt::Display for TestSubject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestSubject::Overall => write!(f, "overall"),
            TestSubject::Object(name) => write!(f, "object {name}"),
        }
    }
}

/// One subject-tagged test outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssociationEntry {
    pub subject: TestSubject,
    pub outcome: TestOutcome,
}

/// Test whether pooled selection frequencies depart from uniform.
/// Requires at least two categories and a non-zero total.
pub fn test_overall(frequencies: &FrequencyTable) -> TestOutcome {
    let counts: Vec<u64> = frequencies.iter().map(|(_, count)| count).collect();

    if counts.len() < 2 || frequencies.total() == 0 {
        return TestOutcome::InsufficientData {
            reason: "not enough categories or data for chi-squared test".to_string(),
        };
    }

    goodness_of_fit(&counts)
}

/// Test one object's row of the contingency table against uniform.
/// Requires at least two columns, a non-zero total, and every cell in the
/// row strictly positive.
pub fn test_object(table: &ContingencyTable, object: &str) -> TestOutcome {
    let Some(row) = table.row(object) else {
        return TestOutcome::InsufficientData {
            reason: format!("object {object} has no observations"),
        };
    };

    let total: u64 = row.iter().sum();
    if row.len() < 2 || total == 0 {
        return TestOutcome::InsufficientData {
            reason: "not enough data or categories for chi-squared test".to_string(),
        };
    }
    if row.iter().any(|&count| count == 0) {
        return TestOutcome::InsufficientData {
            reason: "zero counts present for at least one color format".to_string(),
        };
    }

    goodness_of_fit(row)
}

/// Test independence of object and color format over the whole table.
/// Requires at least two rows, two columns, and a non-zero grand total.
pub fn test_independence(table: &ContingencyTable) -> TestOutcome {
    if table.row_labels().len() < 2
        || table.col_labels().len() < 2
        || table.grand_total() == 0
    {
        return TestOutcome::InsufficientData {
            reason: "independence test needs at least a 2×2 table with observations"
                .to_string(),
        };
    }

    independence(table.cells())
}

/// Chi-squared goodness of fit of a count vector against the uniform
/// distribution; dof = k-1
fn goodness_of_fit(observed: &[u64]) -> TestOutcome {
    let n: u64 = observed.iter().sum();
    let k = observed.len();
    let expected = n as f64 / k as f64;

    let chi2: f64 = observed
        .iter()
        .map(|&count| {
            let delta = count as f64 - expected;
            delta * delta / expected
        })
        .sum();

    finish(chi2, k - 1, n, 1, k)
}

/// Pearson chi-squared over an rxk matrix with expected frequencies from
/// the row/column marginals; dof = (r-1)(k-1)
fn independence(cells: &[Vec<u64>]) -> TestOutcome {
    let rows = cells.len();
    let cols = cells[0].len();
    let n: u64 = cells.iter().flatten().sum();

    let row_totals: Vec<u64> = cells.iter().map(|row| row.iter().sum()).collect();
    let col_totals: Vec<u64> = (0..cols)
        .map(|col| cells.iter().map(|row| row[col]).sum())
        .collect();

    let mut chi2 = 0.0;
    for (row, row_total) in row_totals.iter().enumerate() {
        for (col, col_total) in col_totals.iter().enumerate() {
            let expected = (row_total * col_total) as f64 / n as f64;
            if expected <= 0.0 {
                return TestOutcome::NumericalError {
                    reason: format!(
                        "expected frequency is zero at cell ({row}, {col})"
                    ),
                };
            }
            let delta = cells[row][col] as f64 - expected;
            chi2 += delta * delta / expected;
        }
    }

    finish(chi2, (rows - 1) * (cols - 1), n, rows, cols)
}

/// Derive p-value and effect size, folding numerical failures into the
/// outcome instead of propagating them
fn finish(chi2: f64, dof: usize, n: u64, rows: usize, cols: usize) -> TestOutcome {
    match upper_tail(chi2, dof) {
        Ok(p_value) => TestOutcome::Computed(AssociationResult {
            chi2,
            p_value,
            dof,
            cramers_v: cramers_v(chi2, n, rows, cols),
            significant: p_value < SIGNIFICANCE_LEVEL,
        }),
        Err(reason) => TestOutcome::NumericalError { reason },
    }
}

/// Upper-tail probability of `chi2` under a chi-squared distribution with
/// `dof` degrees of freedom
fn upper_tail(chi2: f64, dof: usize) -> Result<f64, String> {
    if !chi2.is_finite() {
        return Err(format!("chi-squared statistic is not finite: {chi2}"));
    }
    if dof == 0 {
        // Degenerate table: observed equals expected by construction
        return Ok(1.0);
    }
    let distribution = ChiSquared::new(dof as f64)
        .map_err(|e| format!("chi-squared distribution with {dof} degrees of freedom: {e}"))?;
    Ok((1.0 - distribution.cdf(chi2)).clamp(0.0, 1.0))
}

/// Bias-corrected Cramér's V for an observed matrix of the given shape.
/// Returns 0 whenever the corrected formula leaves the real line
/// (division by zero, negative radicand, n <= 1).
pub fn cramers_v(chi2: f64, n: u64, rows: usize, cols: usize) -> f64 {
    if n <= 1 {
        return 0.0;
    }
    let n = n as f64;
    let (r, k) = (rows as f64, cols as f64);

    let phi2 = chi2 / n;
    let phi2_corr = (phi2 - (k - 1.0) * (r - 1.0) / (n - 1.0)).max(0.0);
    let r_corr = r - (r - 1.0).powi(2) / (n - 1.0);
    let k_corr = k - (k - 1.0).powi(2) / (n - 1.0);

    let v = (phi2_corr / (k_corr - 1.0).min(r_corr - 1.0)).sqrt();
    if v.is_finite() {
        v.min(1.0)
    } else {
        0.0
    }
}
