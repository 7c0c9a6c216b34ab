//! Bundle size measuring pipeline
//!
//! For every package a tiny entry module requiring it is written, plus one
//! entry requiring all packages. The external bundler then builds each entry
//! with bounded parallelism and the artifact sizes are collected into a
//! sorted [`Report`]:
//! 1. materialize entry sources (io gate)
//! 2. run the build command per entry (exec gate)
//! 3. aggregate outcomes into rows, totals and failure diagnostics

pub mod aggregator;
pub mod build_runner;
pub mod config;
pub mod entry;
pub mod error;
pub mod executor;
pub mod gate;
pub mod result_formatter;
pub mod telemetry;

pub use aggregator::{FailedBuild, Report, ReportRow, ResultAggregator, Totals};
pub use build_runner::{ArtifactSizes, BuildJob, BuildOutcome, BuildRunner, FailureKind};
pub use config::{
    BuildCommand, GateConfig, IsolationMode, ParamStyle, PipelineConfig, SetupCommand,
    TotalsPolicy,
};
pub use entry::{Entry, EntryKind, EntryMaterializer, AGGREGATE_NAME};
pub use error::{MaterializeError, PipelineError};
pub use executor::SizePipeline;
pub use gate::{ConcurrencyGates, Gate, Permit};
pub use result_formatter::ReportRenderer;
pub use telemetry::{EventSink, MemorySink, NoOpSink, PipelineEvent, RunPhase};
