/// Report assembly for survey analyses
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

use crate::association::{AssociationEntry, TestOutcome, TestSubject};
use crate::dataset::Dataset;
use crate::error::AnalysisError;
use crate::pipeline::{self, SurveyAnalysis};

/// Analysis bundle wrapped with its provenance, ready to render
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyReport {
    pub source: String,
    pub analysis: SurveyAnalysis,
    pub generated_at: DateTime<Utc>,
}

impl SurveyReport {
    pub fn new(source: String, analysis: SurveyAnalysis) -> Self {
        Self {
            source,
            analysis,
            generated_at: Utc::now(),
        }
    }

    /// Load, validate, and analyze a survey export in one call
    pub fn from_path(path: &Path) -> Result<Self, AnalysisError> {
        let dataset = Dataset::from_path(path)?;
        let analysis = pipeline::analyze(&dataset)?;
        let source = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(source, analysis))
    }

    /// Generate plain text report
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        let analysis = &self.analysis;

        text.push_str(&format!("SURVEY ANALYSIS: {}\n", self.source));
        text.push_str(&format!(
            "Generated: {}\n",
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        text.push_str(&"=".repeat(80));
        text.push_str("\n\n");

        text.push_str("SUMMARY\n");
        text.push_str(&"-".repeat(80));
        text.push('\n');
        text.push_str(&format!("Records: {}\n", analysis.row_count));
        text.push_str(&format!(
            "Selections: {}\n",
            analysis.frequencies.total()
        ));
        text.push_str(&format!(
            "Color formats: {} ({})\n",
            analysis.frequencies.len(),
            analysis
                .frequencies
                .categories()
                .collect::<Vec<_>>()
                .join(", ")
        ));
        text.push_str(&format!(
            "Objects: {} ({})\n",
            analysis.crosstab.row_labels().len(),
            analysis.crosstab.row_labels().join(", ")
        ));
        text.push('\n');

        text.push_str("COLOR FORMAT FREQUENCIES\n");
        text.push_str(&"-".repeat(80));
        text.push('\n');
        match &analysis.percentages {
            Some(percentages) => {
                for (format, count) in analysis.frequencies.iter() {
                    text.push_str(&format!(
                        "{:15} {:6} selections  {:5.1}%\n",
                        format, count, percentages[format]
                    ));
                }
            }
            None => text.push_str("No selections recorded.\n"),
        }
        text.push('\n');

        text.push_str("SELECTIONS PER OBJECT\n");
        text.push_str(&"-".repeat(80));
        text.push('\n');
        if analysis.crosstab.is_empty() {
            text.push_str("No observations.\n");
        } else {
            text.push_str(&format!("{:15}", ""));
            for format in analysis.crosstab.col_labels() {
                text.push_str(&format!(" {:>10}", format));
            }
            text.push('\n');
            for (object, row) in analysis
                .crosstab
                .row_labels()
                .iter()
                .zip(analysis.crosstab.cells())
            {
                text.push_str(&format!("{:15}", object));
                for count in row {
                    text.push_str(&format!(" {:>10}", count));
                }
                text.push('\n');
            }
        }
        text.push('\n');

        text.push_str("ASSOCIATION TESTS\n");
        text.push_str(&"-".repeat(80));
        text.push('\n');
        for entry in &analysis.associations {
            text.push_str(&text_entry(entry));
            text.push('\n');
        }
        text.push_str("Object × color format independence\n");
        text.push_str(&text_outcome(&analysis.independence));
        text.push('\n');

        text.push_str("PARTICIPANT CONSISTENCY\n");
        text.push_str(&"-".repeat(80));
        text.push('\n');
        match &analysis.consistency {
            Some(summary) => {
                for record in &summary.records {
                    text.push_str(&format!(
                        "{} / {}: {} -> {}\n",
                        record.participant,
                        record.object,
                        record.selections.join(", "),
                        if record.consistent {
                            "consistent"
                        } else {
                            "inconsistent"
                        }
                    ));
                }
                match summary.consistency_rate {
                    Some(rate) => text.push_str(&format!(
                        "Overall Consistency Rate: {:.2}%\n",
                        rate
                    )),
                    None => text.push_str("No participant/object groups to rate.\n"),
                }
            }
            None => text.push_str(
                "Participant consistency analysis requires 'user_id' and 'repeat' columns in the data.\n",
            ),
        }

        text
    }

    /// Generate Markdown report
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();
        let analysis = &self.analysis;

        md.push_str(&format!("# Survey Analysis: {}\n\n", self.source));
        md.push_str(&format!(
            "**Generated:** {}\n\n",
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));

        md.push_str("## Summary\n\n");
        md.push_str(&format!("- **Records:** {}\n", analysis.row_count));
        md.push_str(&format!(
            "- **Selections:** {}\n",
            analysis.frequencies.total()
        ));
        md.push_str(&format!(
            "- **Color formats:** {}\n",
            analysis.frequencies.len()
        ));
        md.push_str(&format!(
            "- **Objects:** {}\n",
            analysis.crosstab.row_labels().len()
        ));
        md.push('\n');

        md.push_str("## Color Format Frequencies\n\n");
        match &analysis.percentages {
            Some(percentages) => {
                md.push_str("| Color Format | Selections | Percentage |\n");
                md.push_str("|--------------|------------|------------|\n");
                for (format, count) in analysis.frequencies.iter() {
                    md.push_str(&format!(
                        "| {} | {} | {:.1}% |\n",
                        format, count, percentages[format]
                    ));
                }
            }
            None => md.push_str("No selections recorded.\n"),
        }
        md.push('\n');

        md.push_str("## Selections per Object\n\n");
        if analysis.crosstab.is_empty() {
            md.push_str("No observations.\n");
        } else {
            md.push_str("| Object |");
            for format in analysis.crosstab.col_labels() {
                md.push_str(&format!(" {} |", format));
            }
            md.push('\n');
            md.push_str("|--------|");
            for _ in analysis.crosstab.col_labels() {
                md.push_str("---|");
            }
            md.push('\n');
            for (object, row) in analysis
                .crosstab
                .row_labels()
                .iter()
                .zip(analysis.crosstab.cells())
            {
                md.push_str(&format!("| {} |", object));
                for count in row {
                    md.push_str(&format!(" {} |", count));
                }
                md.push('\n');
            }
        }
        md.push('\n');

        md.push_str("## Association Tests\n\n");
        for entry in &analysis.associations {
            md.push_str(&markdown_entry(entry));
            md.push('\n');
        }
        md.push_str("**Object × color format independence**\n\n");
        md.push_str(&markdown_outcome(&analysis.independence));
        md.push('\n');

        md.push_str("## Participant Consistency\n\n");
        match &analysis.consistency {
            Some(summary) => {
                md.push_str("| Participant | Object | Selections | Consistent |\n");
                md.push_str("|-------------|--------|------------|------------|\n");
                for record in &summary.records {
                    md.push_str(&format!(
                        "| {} | {} | {} | {} |\n",
                        record.participant,
                        record.object,
                        record.selections.join(", "),
                        if record.consistent { "yes" } else { "no" }
                    ));
                }
                md.push('\n');
                match summary.consistency_rate {
                    Some(rate) => md.push_str(&format!(
                        "**Overall Consistency Rate:** {:.2}%\n",
                        rate
                    )),
                    None => md.push_str("No participant/object groups to rate.\n"),
                }
            }
            None => md.push_str(
                "Participant consistency analysis requires 'user_id' and 'repeat' columns in the data.\n",
            ),
        }

        md
    }

    /// Generate JSON report
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn render(&self, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::Text => Ok(self.to_text()),
            ReportFormat::Markdown => Ok(self.to_markdown()),
            ReportFormat::Json => self.to_json(),
        }
    }

    /// Save report to file
    pub fn save(&self, path: &Path, format: ReportFormat) -> Result<()> {
        std::fs::write(path, self.render(format)?)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Markdown,
    Json,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(ReportFormat::Text),
            "markdown" | "md" => Ok(ReportFormat::Markdown),
            "json" => Ok(ReportFormat::Json),
            other => Err(format!("unknown report format: {other}")),
        }
    }
}

/// Plain-language verdict for a significance flag
fn verdict(significant: bool) -> &'static str {
    if significant {
        "The differences in color format selections are statistically significant (p < 0.05)."
    } else {
        "The differences in color format selections are not statistically significant (p ≥ 0.05)."
    }
}

fn subject_heading(subject: &TestSubject) -> String {
    match subject {
        TestSubject::Overall => "Overall color format preferences".to_string(),
        TestSubject::Object(name) => format!("Object: {name}"),
    }
}

fn text_entry(entry: &AssociationEntry) -> String {
    format!(
        "{}\n{}",
        subject_heading(&entry.subject),
        text_outcome(&entry.outcome)
    )
}

fn text_outcome(outcome: &TestOutcome) -> String {
    match outcome {
        TestOutcome::Computed(result) => format!(
            "  Chi-squared Statistic: {:.2}\n  P-value: {:.4}\n  Degrees of Freedom: {}\n  Cramér's V (Effect Size): {:.4}\n  {}\n",
            result.chi2, result.p_value, result.dof, result.cramers_v,
            verdict(result.significant)
        ),
        TestOutcome::InsufficientData { reason } => {
            format!("  Test skipped: {reason}.\n")
        }
        TestOutcome::NumericalError { reason } => {
            format!("  Chi-squared test not valid: {reason}.\n")
        }
    }
}

fn markdown_entry(entry: &AssociationEntry) -> String {
    format!(
        "**{}**\n\n{}",
        subject_heading(&entry.subject),
        markdown_outcome(&entry.outcome)
    )
}

fn markdown_outcome(outcome: &TestOutcome) -> String {
    match outcome {
        TestOutcome::Computed(result) => format!(
            "- Chi-squared statistic: {:.2}\n- P-value: {:.4}\n- Degrees of freedom: {}\n- Cramér's V (effect size): {:.4}\n- {}\n",
            result.chi2, result.p_value, result.dof, result.cramers_v,
            verdict(result.significant)
        ),
        TestOutcome::InsufficientData { reason } => {
            format!("- Test skipped: {reason}.\n")
        }
        TestOutcome::NumericalError { reason } => {
            format!("- Chi-squared test not valid: {reason}.\n")
        }
    }
}
