//! Measure command implementation
//!
//! Handles the `bundle-sizer measure` command: runs the measure workflow with
//! a progress bar on stderr, then prints the report table (or JSON) to stdout.

use anyhow::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::env;
use std::sync::Arc;

use super::workflow::{MeasureOptions, MeasureWorkflow};
use crate::error::BundleSizerError;
use crate::fmt::{format_bytes, icon, CROSSMARK, HAMMER, PACKAGE};
use crate::pipeline::{EventSink, PipelineEvent, ReportRenderer};

/// Progress bar fed by pipeline events
///
/// Length is set once entries are materialized; every finished build
/// advances the bar and prints a one-line result above it.
pub struct ProgressSink {
    bar: ProgressBar,
}

impl ProgressSink {
    /// Visible bar on stderr (hidden automatically when stderr is not a terminal)
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        if let Ok(progress_style) =
            ProgressStyle::with_template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
        {
            bar.set_style(progress_style.progress_chars("=> "));
        }
        Self { bar }
    }

    /// Bar that tracks state but never draws
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Finished builds so far
    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    /// Expected number of builds, once known
    pub fn length(&self) -> Option<u64> {
        self.bar.length()
    }

    /// Remove the bar from the terminal
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for ProgressSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for ProgressSink {
    fn record(&self, event: PipelineEvent) {
        match event {
            PipelineEvent::Phase(phase) => self.bar.set_message(phase.as_str()),
            PipelineEvent::Materialized { entries } => {
                self.bar
                    .println(format!("{} {} entries written", icon(PACKAGE), entries));
                self.bar.set_length(entries as u64);
            }
            PipelineEvent::BuildStarted { name } => log::debug!("build started: {}", name),
            PipelineEvent::BuildSucceeded { name, sizes } => {
                self.bar.println(format!(
                    "{}",
                    style(format!(
                        "{}: {} min, {} min+gz",
                        name,
                        format_bytes(sizes.output_bytes),
                        format_bytes(sizes.output_compressed_bytes)
                    ))
                    .dim()
                ));
                self.bar.inc(1);
            }
            PipelineEvent::BuildFailed { name, exit_code } => {
                self.bar.println(format!(
                    "{} {} (exit {})",
                    icon(CROSSMARK),
                    style(name).red(),
                    exit_code
                ));
                self.bar.inc(1);
            }
        }
    }
}

/// Measure bundle sizes for the resolved packages
///
/// # Examples
///
/// ```no_run
/// use bundle_sizer::cmd::measure::cmd_measure;
/// use bundle_sizer::cmd::workflow::MeasureOptions;
///
/// let options = MeasureOptions {
///     packages: vec!["react".to_string()],
///     jobs: Some(2),
///     ..Default::default()
/// };
/// cmd_measure(&options, false, false)?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn cmd_measure(options: &MeasureOptions, json: bool, quiet: bool) -> Result<()> {
    let project_root = env::current_dir()?;
    let workflow = MeasureWorkflow::new(&project_root);

    let show_progress = !json && !quiet;
    if show_progress {
        println!(
            "{} {}",
            icon(HAMMER),
            style("Measuring bundle sizes").bold()
        );
        println!();
    }

    let sink = Arc::new(if show_progress {
        ProgressSink::new()
    } else {
        ProgressSink::hidden()
    });
    let result = workflow.execute_with_sink(options, sink.clone());
    sink.finish();
    let report = result?;

    if json {
        println!("{}", ReportRenderer::render_json(&report)?);
    } else {
        ReportRenderer::print(&report);
    }

    if report.has_failures() {
        return Err(BundleSizerError::BuildsFailed {
            failed: report.failures.len(),
            total: report.attempted(),
        }
        .into());
    }
    Ok(())
}
