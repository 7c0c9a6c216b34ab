//! Pipeline event reporting
//!
//! The pipeline narrates its progress through an [`EventSink`]. The CLI plugs
//! in a progress bar, tests plug in [`MemorySink`] to assert on what happened
//! and how many builds ran at once.

use parking_lot::Mutex;

use super::build_runner::ArtifactSizes;

/// Lifecycle phase of one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RunPhase {
    /// Gates, worker pool and setup step
    Initializing,
    /// Writing entry sources (barrier)
    Materializing,
    /// Running the build command for every entry
    Building,
    /// Partitioning, sorting and totalling outcomes
    Aggregating,
    /// Report ready
    Reported,
}

impl RunPhase {
    /// Human-readable phase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initializing => "initializing",
            Self::Materializing => "materializing",
            Self::Building => "building",
            Self::Aggregating => "aggregating",
            Self::Reported => "reported",
        }
    }
}

/// Something that happened during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    /// The run moved to a new phase
    Phase(RunPhase),
    /// All entry sources are on disk
    Materialized {
        /// Number of entries, aggregate included
        entries: usize,
    },
    /// A build slot was taken and the command is about to start
    BuildStarted {
        /// Entry name
        name: String,
    },
    /// A build command finished and its artifacts were measured
    BuildSucceeded {
        /// Entry name
        name: String,
        /// Measured artifact sizes
        sizes: ArtifactSizes,
    },
    /// A build command failed, timed out, or left artifacts missing
    BuildFailed {
        /// Entry name
        name: String,
        /// Exit code recorded on the outcome
        exit_code: i32,
    },
}

impl PipelineEvent {
    /// Whether this event marks the end of a build invocation
    pub fn is_build_finished(&self) -> bool {
        matches!(self, Self::BuildSucceeded { .. } | Self::BuildFailed { .. })
    }
}

/// Receiver of pipeline events
///
/// Called from worker threads, possibly concurrently.
pub trait EventSink: Send + Sync {
    /// Record one event
    fn record(&self, event: PipelineEvent);
}

/// Sink that drops every event (default)
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpSink;

impl EventSink for NoOpSink {
    fn record(&self, _event: PipelineEvent) {}
}

/// In-memory sink for tests and post-run inspection
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<PipelineEvent>>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded events in arrival order
    pub fn events(&self) -> Vec<PipelineEvent> {
        self.events.lock().clone()
    }

    /// Phases in the order they were entered
    pub fn phases(&self) -> Vec<RunPhase> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                PipelineEvent::Phase(p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    /// Largest number of builds that were started but not yet finished
    pub fn max_concurrent_builds(&self) -> usize {
        let mut running = 0usize;
        let mut max = 0usize;
        for event in self.events.lock().iter() {
            if matches!(event, PipelineEvent::BuildStarted { .. }) {
                running += 1;
                max = max.max(running);
            } else if event.is_build_finished() {
                running = running.saturating_sub(1);
            }
        }
        max
    }
}

impl EventSink for MemorySink {
    fn record(&self, event: PipelineEvent) {
        self.events.lock().push(event);
    }
}
