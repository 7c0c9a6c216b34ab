//! Turning build outcomes into a report

use serde::Serialize;

use super::build_runner::{BuildOutcome, FailureKind};
use super::config::TotalsPolicy;
use super::error::PipelineError;

/// One successful measurement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    /// Package name, or `_all`
    pub name: String,
    /// Name shown in the table
    pub display_name: String,
    /// Entry id
    pub id: String,
    /// Whether this row is the all-packages entry
    pub aggregate: bool,
    /// Minified size in bytes
    pub output_bytes: u64,
    /// Compressed minified size in bytes
    pub output_compressed_bytes: u64,
}

/// Summed sizes over the rows selected by the [`TotalsPolicy`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    /// Sum of minified sizes
    pub output_bytes: u64,
    /// Sum of compressed sizes
    pub output_compressed_bytes: u64,
}

impl Totals {
    fn add(&mut self, row: &ReportRow) {
        self.output_bytes = self.output_bytes.saturating_add(row.output_bytes);
        self.output_compressed_bytes = self
            .output_compressed_bytes
            .saturating_add(row.output_compressed_bytes);
    }
}

/// Diagnostic for an entry that produced no measurement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedBuild {
    /// Package name, or `_all`
    pub name: String,
    /// Name shown in diagnostics
    pub display_name: String,
    /// Recorded exit code
    pub exit_code: i32,
    /// Captured stderr
    pub stderr: String,
    /// `build-failed` or `artifact-missing`
    pub kind: &'static str,
    /// Extra detail for missing artifacts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Result of a measuring run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    /// Successful rows, largest compressed size first
    pub rows: Vec<ReportRow>,
    /// Totals over successful rows
    pub totals: Totals,
    /// Which rows the totals cover
    pub totals_policy: TotalsPolicy,
    /// Failed entries in outcome order
    pub failures: Vec<FailedBuild>,
}

impl Report {
    /// Whether any entry failed
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Number of entries that were attempted
    pub fn attempted(&self) -> usize {
        self.rows.len() + self.failures.len()
    }
}

/// Partitions, sorts and totals build outcomes
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultAggregator {
    policy: TotalsPolicy,
}

impl ResultAggregator {
    /// Create an aggregator with the given totals policy
    pub fn new(policy: TotalsPolicy) -> Self {
        Self { policy }
    }

    /// Build the report.
    ///
    /// Rows are ordered by descending compressed size; ties keep outcome
    /// order. Fails only if an outcome contradicts itself.
    pub fn aggregate(&self, outcomes: Vec<BuildOutcome>) -> Result<Report, PipelineError> {
        let mut rows = Vec::new();
        let mut failures = Vec::new();

        for outcome in outcomes {
            match (outcome.is_success(), outcome.sizes) {
                (true, Some(sizes)) => rows.push(ReportRow {
                    display_name: outcome.entry.display_name().to_string(),
                    aggregate: outcome.entry.is_aggregate(),
                    name: outcome.entry.name,
                    id: outcome.entry.id,
                    output_bytes: sizes.output_bytes,
                    output_compressed_bytes: sizes.output_compressed_bytes,
                }),
                (false, None) => failures.push(failed_build(outcome)),
                (true, None) => {
                    return Err(PipelineError::AggregationInconsistency {
                        name: outcome.entry.name,
                        detail: "successful build without sizes".to_string(),
                    })
                }
                (false, Some(_)) => {
                    return Err(PipelineError::AggregationInconsistency {
                        name: outcome.entry.name,
                        detail: format!("failed build (exit {}) carries sizes", outcome.exit_code),
                    })
                }
            }
        }

        // sort_by is stable
        rows.sort_by(|a, b| b.output_compressed_bytes.cmp(&a.output_compressed_bytes));

        let mut totals = Totals::default();
        for row in &rows {
            if row.aggregate && self.policy == TotalsPolicy::PackagesOnly {
                continue;
            }
            totals.add(row);
        }

        log::debug!(
            "aggregated {} rows, {} failures, totals {:?}",
            rows.len(),
            failures.len(),
            totals
        );

        Ok(Report {
            rows,
            totals,
            totals_policy: self.policy,
            failures,
        })
    }
}

fn failed_build(outcome: BuildOutcome) -> FailedBuild {
    let stderr = outcome.stderr_lossy().into_owned();
    let kind = outcome
        .failure
        .as_ref()
        .map_or(FailureKind::BuildFailed.as_str(), FailureKind::as_str);
    let detail = match outcome.failure {
        Some(FailureKind::ArtifactMissing { path, reason }) => {
            Some(format!("{}: {}", path.display(), reason))
        }
        _ => None,
    };
    FailedBuild {
        display_name: outcome.entry.display_name().to_string(),
        name: outcome.entry.name,
        exit_code: outcome.exit_code,
        stderr,
        kind,
        detail,
    }
}
