//! Report formatting and display

use console::style;

use super::aggregator::{Report, ReportRow};
use crate::fmt::{format_bytes, icon, CHART, CROSSMARK};

const HEADERS: [&str; 3] = ["Name", "min", "min+gz"];

#[derive(Clone, Copy, PartialEq, Eq)]
enum RowStyle {
    Plain,
    Header,
    Highlight,
}

struct TableLine {
    cells: [String; 3],
    style: RowStyle,
}

impl TableLine {
    fn from_row(row: &ReportRow) -> Self {
        Self {
            cells: [
                row.display_name.clone(),
                format_bytes(row.output_bytes),
                format_bytes(row.output_compressed_bytes),
            ],
            style: if row.aggregate {
                RowStyle::Highlight
            } else {
                RowStyle::Plain
            },
        }
    }
}

/// Formats and displays measuring reports
pub struct ReportRenderer;

impl ReportRenderer {
    /// Diagnostics for every failed entry: name, stderr, exit code
    pub fn render_failures(report: &Report) -> String {
        let mut out = String::new();
        for failure in &report.failures {
            out.push_str(&format!(
                "{} {}\n",
                icon(CROSSMARK),
                style(&failure.display_name).red().bold()
            ));
            let stderr = failure.stderr.trim_end();
            if !stderr.is_empty() {
                out.push_str(stderr);
                out.push('\n');
            }
            if let Some(ref detail) = failure.detail {
                out.push_str(&format!("missing artifact {}\n", detail));
            }
            out.push_str(&format!(
                "{}\n",
                style(format!("Exited with {}", failure.exit_code)).red()
            ));
        }
        out
    }

    /// Box-drawn `Name | min | min+gz` table with a trailing Totals row
    pub fn render_table(report: &Report) -> String {
        let mut lines: Vec<TableLine> = Vec::with_capacity(report.rows.len() + 2);
        lines.push(TableLine {
            cells: HEADERS.map(str::to_string),
            style: RowStyle::Header,
        });
        lines.extend(report.rows.iter().map(TableLine::from_row));
        lines.push(TableLine {
            cells: [
                "Totals".to_string(),
                format_bytes(report.totals.output_bytes),
                format_bytes(report.totals.output_compressed_bytes),
            ],
            style: RowStyle::Highlight,
        });

        let mut widths = [0usize; 3];
        for line in &lines {
            for (width, cell) in widths.iter_mut().zip(&line.cells) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let rule = |left: &str, mid: &str, right: &str| {
            let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
            format!("{}{}{}\n", left, segments.join(mid), right)
        };

        let mut out = rule("┌", "┬", "┐");
        let last = lines.len() - 1;
        for (i, line) in lines.iter().enumerate() {
            if i == last {
                out.push_str(&rule("├", "┼", "┤"));
            }
            out.push('│');
            for (col, (cell, width)) in line.cells.iter().zip(widths).enumerate() {
                // Name is left-aligned, sizes right-aligned
                let padded = if col == 0 {
                    format!("{:<width$}", cell)
                } else {
                    format!("{:>width$}", cell)
                };
                let styled = match line.style {
                    RowStyle::Plain => padded,
                    RowStyle::Header => style(padded).red().to_string(),
                    RowStyle::Highlight => style(padded).bold().yellow().to_string(),
                };
                out.push_str(&format!(" {} │", styled));
            }
            out.push('\n');
            if i == 0 {
                out.push_str(&rule("├", "┼", "┤"));
            }
        }
        out.push_str(&rule("└", "┴", "┘"));
        out
    }

    /// Machine-readable report
    pub fn render_json(report: &Report) -> serde_json::Result<String> {
        serde_json::to_string_pretty(report)
    }

    /// Print failures then the table to stdout
    pub fn print(report: &Report) {
        if report.has_failures() {
            print!("{}", Self::render_failures(report));
            println!();
        }
        println!(
            "{} {} measured, {} failed",
            icon(CHART),
            style(report.rows.len()).green().bold(),
            style(report.failures.len()).red()
        );
        print!("{}", Self::render_table(report));
    }
}
