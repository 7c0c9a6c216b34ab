//! Tests for test assertion helpers
//!
//! Verifies that the common assertion utilities work correctly.

mod common;

use bundle_sizer::pipeline::{Report, ReportRow, Totals, TotalsPolicy};
use common::assertions::*;

fn report_row(name: &str, aggregate: bool, min: u64, gz: u64) -> ReportRow {
    ReportRow {
        name: name.to_string(),
        display_name: if aggregate { "All".to_string() } else { name.to_string() },
        id: name.to_string(),
        aggregate,
        output_bytes: min,
        output_compressed_bytes: gz,
    }
}

fn sample(policy: TotalsPolicy, totals: Totals) -> Report {
    Report {
        rows: vec![
            report_row("_all", true, 1300, 400),
            report_row("react", false, 900, 280),
            report_row("redux", false, 400, 130),
        ],
        totals,
        totals_policy: policy,
        failures: Vec::new(),
    }
}

#[test]
fn test_size_within_tolerance() {
    assert_size_within(1024000, 1024000, 1024);
    assert_size_within(1024000, 1024512, 1024);
    assert_size_within(1024512, 1024000, 1024);
}

#[test]
fn test_totals_helpers_follow_policy() {
    let report = sample(
        TotalsPolicy::IncludeAggregate,
        Totals {
            output_bytes: 2600,
            output_compressed_bytes: 810,
        },
    );
    assert_sorted_descending(&report);
    assert_totals_consistent(&report);
    assert_eq!(row(&report, "react").output_bytes, 900);

    let report = sample(
        TotalsPolicy::PackagesOnly,
        Totals {
            output_bytes: 1300,
            output_compressed_bytes: 410,
        },
    );
    assert_totals_consistent(&report);
}

#[test]
#[should_panic(expected = "rows out of order")]
fn test_sorted_descending_detects_misordering() {
    let mut report = sample(TotalsPolicy::IncludeAggregate, Totals::default());
    report.rows.reverse();
    assert_sorted_descending(&report);
}
