//! Test assertion helpers
//!
//! Checks on report shape that several test files need: ordering, totals
//! and per-row sizes.

use bundle_sizer::pipeline::{Report, ReportRow, TotalsPolicy};

/// Assert that a size value is within tolerance of expected
///
/// Gzip output of real bundlers varies by a few bytes between versions.
///
/// # Examples
///
/// ```
/// # use bundle_sizer_tests::assertions::assert_size_within;
/// // Allow ±16 bytes for a gzip header difference
/// assert_size_within(actual_size, expected_size, 16);
/// ```
#[allow(dead_code)]
pub fn assert_size_within(actual_bytes: u64, expected_bytes: u64, tolerance_bytes: u64) {
    let diff = actual_bytes.abs_diff(expected_bytes);

    assert!(
        diff <= tolerance_bytes,
        "Size outside tolerance:\n  actual: {} bytes\n  expected: {} bytes\n  diff: {} bytes (tolerance: {} bytes)",
        actual_bytes, expected_bytes, diff, tolerance_bytes
    );
}

/// Assert rows are ordered by compressed size, largest first
#[allow(dead_code)]
pub fn assert_sorted_descending(report: &Report) {
    for pair in report.rows.windows(2) {
        assert!(
            pair[0].output_compressed_bytes >= pair[1].output_compressed_bytes,
            "rows out of order: {} ({}) before {} ({})",
            pair[0].name,
            pair[0].output_compressed_bytes,
            pair[1].name,
            pair[1].output_compressed_bytes
        );
    }
}

/// Assert the totals row matches the rows under the report's policy
#[allow(dead_code)]
pub fn assert_totals_consistent(report: &Report) {
    let counted = |row: &&ReportRow| match report.totals_policy {
        TotalsPolicy::IncludeAggregate => true,
        TotalsPolicy::PackagesOnly => !row.aggregate,
    };
    let min: u64 = report.rows.iter().filter(counted).map(|r| r.output_bytes).sum();
    let gz: u64 = report
        .rows
        .iter()
        .filter(counted)
        .map(|r| r.output_compressed_bytes)
        .sum();

    assert_eq!(report.totals.output_bytes, min, "min total mismatch");
    assert_eq!(report.totals.output_compressed_bytes, gz, "min+gz total mismatch");
}

/// Find the row for `name`, panicking with the row list if absent
#[allow(dead_code)]
pub fn row<'a>(report: &'a Report, name: &str) -> &'a ReportRow {
    report
        .rows
        .iter()
        .find(|r| r.name == name)
        .unwrap_or_else(|| {
            let names: Vec<_> = report.rows.iter().map(|r| r.name.as_str()).collect();
            panic!("no row named {name}; rows: {names:?}")
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assert_size_within_pass() {
        assert_size_within(1024, 1024, 0);
        assert_size_within(1024, 1030, 8);
        assert_size_within(1030, 1024, 8);
    }

    #[test]
    #[should_panic(expected = "Size outside tolerance")]
    fn test_assert_size_within_fail() {
        assert_size_within(1024, 1100, 8);
    }
}
