//! Pipeline configuration types

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default capacity of the filesystem gate.
///
/// Entry sources are tiny, so writes can be heavily over-subscribed.
pub const DEFAULT_IO_CAPACITY: usize = 64;

/// Default environment variable prefix for [`ParamStyle::Env`].
///
/// Matches a rollup config reading `ROLLUP_INPUT_FILE` and friends.
pub const DEFAULT_ENV_PREFIX: &str = "ROLLUP";

/// Number of processing units available to this process (at least 1).
pub fn available_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Capacities of the two concurrency gates
///
/// # Examples
///
/// ```
/// use bundle_sizer::pipeline::GateConfig;
///
/// let gates = GateConfig { io: 8, exec: 2 };
/// assert_eq!(gates.pool_size(), 8);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateConfig {
    /// Concurrent entry-source writes
    pub io: usize,
    /// Concurrent build-process invocations
    pub exec: usize,
}

impl GateConfig {
    /// Worker threads needed so that neither gate is starved by the pool itself.
    pub fn pool_size(&self) -> usize {
        self.io.max(self.exec).max(1)
    }

    /// [`GateConfig::pool_size`] capped at the number of entries, since no
    /// more than one task per entry is ever in flight.
    pub fn pool_size_for(&self, entries: usize) -> usize {
        self.pool_size().min(entries.max(1))
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            io: DEFAULT_IO_CAPACITY,
            exec: available_cpus(),
        }
    }
}

/// How much of the dependency graph the build command is allowed to bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum IsolationMode {
    /// Externalize every dependency except the package under test
    TargetOnly,
    /// Bundle everything (aggregate entry only)
    BundleAll,
}

impl IsolationMode {
    /// Whether dependencies other than the target are externalized
    pub fn is_target_only(&self) -> bool {
        matches!(self, Self::TargetOnly)
    }
}

/// How a build job is handed to the external command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParamStyle {
    /// `<PREFIX>_INPUT_FILE`, `<PREFIX>_OUTPUT_FILE`, `<PREFIX>_TARGET_NAME`,
    /// `<PREFIX>_TARGET_ONLY` environment variables
    #[default]
    Env,
    /// `--input <p> --output <p> --target <name> [--target-only]` arguments
    Args,
}

impl ParamStyle {
    /// Get the style name as it appears in the config file
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Env => "env",
            Self::Args => "args",
        }
    }
}

/// Which successful rows contribute to the report totals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TotalsPolicy {
    /// Every successful entry, the aggregate included
    #[default]
    IncludeAggregate,
    /// Only single-package entries
    PackagesOnly,
}

/// The external bundler/minifier/compressor invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildCommand {
    /// Program to execute
    pub program: PathBuf,
    /// Arguments passed before any job parameters
    pub args: Vec<String>,
    /// How job parameters are passed
    pub params: ParamStyle,
    /// Variable prefix used by [`ParamStyle::Env`]
    pub env_prefix: String,
    /// Per-invocation deadline
    pub timeout: Option<Duration>,
}

impl Default for BuildCommand {
    fn default() -> Self {
        Self {
            program: PathBuf::from("node_modules/.bin/rollup"),
            args: vec!["-c".to_string(), "rollup.config.js".to_string()],
            params: ParamStyle::default(),
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
            timeout: None,
        }
    }
}

/// Command run once in the project root before any entry is materialized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupCommand {
    /// Program to execute
    pub program: PathBuf,
    /// Arguments
    pub args: Vec<String>,
}

/// Resolve a configured program against the project root.
///
/// Bare names (`npm`) are left for `PATH` lookup; relative paths with a
/// directory component (`node_modules/.bin/rollup`) are anchored at `root`.
pub fn resolve_program(program: &Path, root: &Path) -> PathBuf {
    if program.is_absolute() || program.components().count() <= 1 {
        program.to_path_buf()
    } else {
        root.join(program)
    }
}

/// Configuration for one measuring run
///
/// # Examples
///
/// ```
/// use bundle_sizer::pipeline::{PipelineConfig, TotalsPolicy};
///
/// let config = PipelineConfig::new("/work/project");
/// assert_eq!(config.out_dir, std::path::PathBuf::from("/work/project/dist"));
/// assert_eq!(config.extension, "js");
/// assert_eq!(config.totals, TotalsPolicy::IncludeAggregate);
/// ```
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Working directory for the build and setup commands
    pub project_root: PathBuf,
    /// Directory receiving entry sources and artifacts
    pub out_dir: PathBuf,
    /// Source/artifact file extension, without the dot
    pub extension: String,
    /// External build command
    pub build: BuildCommand,
    /// Optional pre-build setup step
    pub setup: Option<SetupCommand>,
    /// Gate capacities
    pub gates: GateConfig,
    /// Totals policy for the report
    pub totals: TotalsPolicy,
}

impl PipelineConfig {
    /// Defaults rooted at `project_root`, writing into `<project_root>/dist`.
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        let project_root = project_root.into();
        Self {
            out_dir: project_root.join("dist"),
            project_root,
            extension: "js".to_string(),
            build: BuildCommand::default(),
            setup: None,
            gates: GateConfig::default(),
            totals: TotalsPolicy::default(),
        }
    }
}
