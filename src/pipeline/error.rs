//! Error types for the measuring pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort the run before any build is attempted
#[derive(Error, Debug)]
pub enum MaterializeError {
    /// Output directory could not be created
    #[error("failed to create output directory {}: {source}", .path.display())]
    CreateDir {
        /// Directory that could not be created
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Entry source could not be written
    #[error("failed to write entry source {}: {source}", .path.display())]
    Write {
        /// File that could not be written
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Two entries would share the same files
    #[error("'{second}' and '{first}' both map to entry id '{id}'")]
    DuplicateId {
        /// Colliding id
        id: String,
        /// Name that claimed the id first
        first: String,
        /// Name that collided
        second: String,
    },

    /// Nothing to measure
    #[error("no packages to measure")]
    NoPackages,
}

/// Errors that can occur during pipeline execution
///
/// Per-entry build problems are not errors: they are recorded on the
/// [`BuildOutcome`](super::BuildOutcome) and surface in the report.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Entry materialization failed
    #[error("materialization failed: {0}")]
    Materialize(#[from] MaterializeError),

    /// The configuration cannot be used
    #[error("invalid pipeline configuration: {0}")]
    InvalidConfig(String),

    /// The worker pool could not be started
    #[error("failed to start worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    /// The setup command could not be started
    #[error("failed to run setup command {program}: {source}")]
    SetupSpawn {
        /// Setup program
        program: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The setup command exited unsuccessfully
    #[error("setup command {program} exited with {}", .code.map_or_else(|| "a signal".to_string(), |c| c.to_string()))]
    SetupFailed {
        /// Setup program
        program: String,
        /// Exit code, if the process was not killed by a signal
        code: Option<i32>,
    },

    /// An outcome contradicts the success/sizes invariant
    #[error("inconsistent outcome for '{name}': {detail}")]
    AggregationInconsistency {
        /// Entry name
        name: String,
        /// What was inconsistent
        detail: String,
    },
}
