//! Build invocation for a single entry
//!
//! Runs the external bundler for one [`Entry`] under the `exec` gate and turns
//! whatever happens (success, non-zero exit, timeout, spawn failure, missing
//! artifacts) into a [`BuildOutcome`]. Nothing here returns an error: every
//! per-entry problem is data for the report.

use serde::Serialize;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::infra::{CommandExecutor, FileSystem};

use super::config::{resolve_program, BuildCommand, IsolationMode, ParamStyle};
use super::entry::Entry;
use super::gate::Gate;
use super::telemetry::{EventSink, PipelineEvent};

/// Exit code recorded when the build exceeded its deadline
pub const EXIT_TIMED_OUT: i32 = 124;

/// Exit code recorded when the build program could not be started
pub const EXIT_SPAWN_FAILED: i32 = 127;

/// Exit code recorded when the build was terminated by a signal
pub const EXIT_SIGNALED: i32 = -1;

/// Measured artifact sizes in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ArtifactSizes {
    /// Minified bundle
    pub output_bytes: u64,
    /// Compressed minified bundle
    pub output_compressed_bytes: u64,
}

/// Why a build produced no measurement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// Non-zero exit, timeout or spawn failure
    BuildFailed,
    /// The command exited 0 but an artifact could not be measured
    ArtifactMissing {
        /// Artifact that could not be measured
        path: PathBuf,
        /// Stat error text
        reason: String,
    },
}

impl FailureKind {
    /// Short kind label for reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BuildFailed => "build-failed",
            Self::ArtifactMissing { .. } => "artifact-missing",
        }
    }
}

/// Result of one build invocation
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    /// Entry that was built
    pub entry: Entry,
    /// Process exit code, or one of the synthetic codes above
    pub exit_code: i32,
    /// Captured stdout
    pub stdout: Vec<u8>,
    /// Captured stderr
    pub stderr: Vec<u8>,
    /// Present only for successful builds
    pub sizes: Option<ArtifactSizes>,
    /// Present only for failed builds
    pub failure: Option<FailureKind>,
}

impl BuildOutcome {
    /// Exit 0, no failure recorded
    pub fn is_success(&self) -> bool {
        self.exit_code == 0 && self.failure.is_none()
    }

    /// Captured stderr as text
    pub fn stderr_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stderr)
    }

    fn failed(entry: &Entry, exit_code: i32, stdout: Vec<u8>, stderr: Vec<u8>) -> Self {
        Self {
            entry: entry.clone(),
            exit_code,
            stdout,
            stderr,
            sizes: None,
            failure: Some(FailureKind::BuildFailed),
        }
    }
}

/// Parameters of one build invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildJob {
    /// Entry source
    pub input: PathBuf,
    /// Minified artifact to produce
    pub output: PathBuf,
    /// Compressed artifact the command is expected to produce next to `output`
    pub output_compressed: PathBuf,
    /// Package under test
    pub target: String,
    /// Dependency handling
    pub isolation: IsolationMode,
}

impl BuildJob {
    /// Job for one entry
    pub fn from_entry(entry: &Entry) -> Self {
        Self {
            input: entry.input_path.clone(),
            output: entry.output_path.clone(),
            output_compressed: entry.output_compressed_path.clone(),
            target: entry.name.clone(),
            isolation: entry.isolation(),
        }
    }

    /// Hand the job to `cmd` in the configured parameter style
    pub fn apply<'c>(&self, cmd: &'c mut Command, build: &BuildCommand) -> &'c mut Command {
        match build.params {
            ParamStyle::Env => {
                let prefix = &build.env_prefix;
                let target_only = if self.isolation.is_target_only() {
                    "true"
                } else {
                    "false"
                };
                cmd.env(format!("{prefix}_INPUT_FILE"), &self.input)
                    .env(format!("{prefix}_OUTPUT_FILE"), &self.output)
                    .env(format!("{prefix}_TARGET_NAME"), &self.target)
                    .env(format!("{prefix}_TARGET_ONLY"), target_only)
            }
            ParamStyle::Args => {
                cmd.arg("--input")
                    .arg(&self.input)
                    .arg("--output")
                    .arg(&self.output)
                    .arg("--output-compressed")
                    .arg(&self.output_compressed)
                    .arg("--target")
                    .arg(&self.target);
                if self.isolation.is_target_only() {
                    cmd.arg("--target-only");
                }
                cmd
            }
        }
    }
}

/// Runs the build command for entries
pub struct BuildRunner<FS: FileSystem, CE: CommandExecutor> {
    build: BuildCommand,
    program: PathBuf,
    working_dir: PathBuf,
    fs: FS,
    cmd_executor: CE,
}

impl<FS: FileSystem, CE: CommandExecutor> BuildRunner<FS, CE> {
    /// Create a runner executing `build` from `working_dir`
    pub fn new(build: BuildCommand, working_dir: impl Into<PathBuf>, fs: FS, cmd_executor: CE) -> Self {
        let working_dir = working_dir.into();
        let program = resolve_program(&build.program, &working_dir);
        Self {
            build,
            program,
            working_dir,
            fs,
            cmd_executor,
        }
    }

    /// Resolved build program
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Build one entry while holding an `exec_gate` slot
    pub fn run(&self, entry: &Entry, exec_gate: &Gate, sink: &dyn EventSink) -> BuildOutcome {
        let outcome = {
            let _permit = exec_gate.acquire();
            sink.record(PipelineEvent::BuildStarted {
                name: entry.name.clone(),
            });
            let outcome = self.invoke(entry);
            // Reported before the slot is released so observers never see
            // more builds in flight than the gate allows.
            sink.record(match outcome.sizes {
                Some(sizes) => PipelineEvent::BuildSucceeded {
                    name: entry.name.clone(),
                    sizes,
                },
                None => PipelineEvent::BuildFailed {
                    name: entry.name.clone(),
                    exit_code: outcome.exit_code,
                },
            });
            outcome
        };

        match (&outcome.sizes, &outcome.failure) {
            (Some(sizes), _) => log::info!(
                "{}: {} B, {} B compressed",
                entry.name,
                sizes.output_bytes,
                sizes.output_compressed_bytes
            ),
            (None, Some(FailureKind::ArtifactMissing { path, reason })) => log::warn!(
                "{}: build exited 0 but {} is missing: {}",
                entry.name,
                path.display(),
                reason
            ),
            (None, _) => log::warn!("{}: build exited with {}", entry.name, outcome.exit_code),
        }
        outcome
    }

    fn invoke(&self, entry: &Entry) -> BuildOutcome {
        let job = BuildJob::from_entry(entry);
        let mut cmd = Command::new(&self.program);
        cmd.current_dir(&self.working_dir).args(&self.build.args);
        job.apply(&mut cmd, &self.build);

        log::debug!(
            "spawning {} for {} ({:?})",
            self.program.display(),
            job.target,
            job.isolation
        );

        let result = match self.cmd_executor.output_with_timeout(&mut cmd, self.build.timeout) {
            Ok(result) => result,
            Err(err) => {
                let message = format!("failed to start {}: {}", self.program.display(), err);
                return BuildOutcome::failed(entry, EXIT_SPAWN_FAILED, Vec::new(), message.into_bytes());
            }
        };

        let output = result.output;
        if result.timed_out {
            let mut stderr = output.stderr;
            if !stderr.is_empty() && !stderr.ends_with(b"\n") {
                stderr.push(b'\n');
            }
            let secs = self.build.timeout.map(|t| t.as_secs_f64()).unwrap_or_default();
            stderr.extend_from_slice(format!("timed out after {secs}s").as_bytes());
            return BuildOutcome::failed(entry, EXIT_TIMED_OUT, output.stdout, stderr);
        }

        let exit_code = output.status.code().unwrap_or(EXIT_SIGNALED);
        if exit_code != 0 {
            return BuildOutcome::failed(entry, exit_code, output.stdout, output.stderr);
        }

        match self.measure(&job) {
            Ok(sizes) => BuildOutcome {
                entry: entry.clone(),
                exit_code,
                stdout: output.stdout,
                stderr: output.stderr,
                sizes: Some(sizes),
                failure: None,
            },
            Err((path, reason)) => BuildOutcome {
                entry: entry.clone(),
                exit_code,
                stdout: output.stdout,
                stderr: output.stderr,
                sizes: None,
                failure: Some(FailureKind::ArtifactMissing { path, reason }),
            },
        }
    }

    fn measure(&self, job: &BuildJob) -> Result<ArtifactSizes, (PathBuf, String)> {
        let size_of = |path: &Path| {
            self.fs
                .file_size(path)
                .map_err(|e| (path.to_path_buf(), e.to_string()))
        };
        Ok(ArtifactSizes {
            output_bytes: size_of(&job.output)?,
            output_compressed_bytes: size_of(&job.output_compressed)?,
        })
    }
}
