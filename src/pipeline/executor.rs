//! Measuring pipeline executor
//!
//! Drives one run through its phases:
//! 1. gates, worker pool and optional setup command
//! 2. entry materialization (barrier, fail-fast)
//! 3. one build per entry under the `exec` gate (collect-all)
//! 4. aggregation into a [`Report`]

use rayon::prelude::*;
use std::sync::Arc;

use crate::infra::{CommandExecutor, FileSystem, RealCommandExecutor, RealFileSystem};

use super::aggregator::{Report, ResultAggregator};
use super::build_runner::{BuildOutcome, BuildRunner};
use super::config::{resolve_program, PipelineConfig, SetupCommand};
use super::entry::EntryMaterializer;
use super::error::PipelineError;
use super::gate::ConcurrencyGates;
use super::telemetry::{EventSink, NoOpSink, PipelineEvent, RunPhase};

/// Measures bundle sizes for a list of packages
pub struct SizePipeline<FS: FileSystem = RealFileSystem, CE: CommandExecutor = RealCommandExecutor> {
    config: PipelineConfig,
    fs: FS,
    cmd_executor: CE,
    sink: Arc<dyn EventSink>,
}

impl SizePipeline {
    /// Create a pipeline using the real filesystem and processes
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use bundle_sizer::pipeline::{PipelineConfig, SizePipeline};
    ///
    /// let pipeline = SizePipeline::new(PipelineConfig::new("./sizes"));
    /// let report = pipeline.run(&["react".to_string(), "redux".to_string()])?;
    /// for row in &report.rows {
    ///     println!("{}: {} B gzipped", row.display_name, row.output_compressed_bytes);
    /// }
    /// # Ok::<(), bundle_sizer::pipeline::PipelineError>(())
    /// ```
    pub fn new(config: PipelineConfig) -> Self {
        Self::with_executors(config, RealFileSystem, RealCommandExecutor)
    }
}

impl<FS: FileSystem + Clone, CE: CommandExecutor + Clone> SizePipeline<FS, CE> {
    /// Create a pipeline with custom filesystem and command executor implementations
    pub fn with_executors(config: PipelineConfig, fs: FS, cmd_executor: CE) -> Self {
        Self {
            config,
            fs,
            cmd_executor,
            sink: Arc::new(NoOpSink),
        }
    }

    /// Send pipeline events to `sink`
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Configuration this pipeline runs with
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every phase for `packages` and return the report.
    ///
    /// Per-entry build failures end up in [`Report::failures`]; only
    /// configuration, setup, materialization and consistency problems are
    /// returned as errors.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::InvalidConfig`] for a zero gate capacity
    /// - [`PipelineError::SetupSpawn`] / [`PipelineError::SetupFailed`] when
    ///   the setup command cannot run or fails
    /// - [`PipelineError::Materialize`] when an entry cannot be written; no
    ///   build is started in that case
    pub fn run(&self, packages: &[String]) -> Result<Report, PipelineError> {
        let sink = &*self.sink;
        sink.record(PipelineEvent::Phase(RunPhase::Initializing));

        let gates = ConcurrencyGates::new(&self.config.gates)?;
        // One entry per package plus the aggregate.
        let threads = self.config.gates.pool_size_for(packages.len() + 1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("bundle-sizer-{i}"))
            .build()?;
        log::debug!(
            "worker pool: {} threads (io {}, exec {})",
            threads,
            gates.io.capacity(),
            gates.exec.capacity()
        );

        if let Some(ref setup) = self.config.setup {
            self.run_setup(setup)?;
        }

        sink.record(PipelineEvent::Phase(RunPhase::Materializing));
        let materializer = EntryMaterializer::new(
            &self.config.out_dir,
            self.config.extension.clone(),
            self.fs.clone(),
        );
        let entries = pool.install(|| materializer.materialize_all(packages, &gates.io))?;
        sink.record(PipelineEvent::Materialized {
            entries: entries.len(),
        });
        log::debug!(
            "materialized {} entries in {}",
            entries.len(),
            self.config.out_dir.display()
        );

        sink.record(PipelineEvent::Phase(RunPhase::Building));
        let runner = BuildRunner::new(
            self.config.build.clone(),
            &self.config.project_root,
            self.fs.clone(),
            self.cmd_executor.clone(),
        );
        let outcomes: Vec<BuildOutcome> = pool.install(|| {
            entries
                .par_iter()
                .map(|entry| runner.run(entry, &gates.exec, sink))
                .collect()
        });
        log::debug!("exec gate peak: {}", gates.exec.peak());

        sink.record(PipelineEvent::Phase(RunPhase::Aggregating));
        let report = ResultAggregator::new(self.config.totals).aggregate(outcomes)?;

        sink.record(PipelineEvent::Phase(RunPhase::Reported));
        Ok(report)
    }

    fn run_setup(&self, setup: &SetupCommand) -> Result<(), PipelineError> {
        let program = resolve_program(&setup.program, &self.config.project_root);
        let program = program.to_string_lossy().into_owned();
        log::info!("running setup: {} {}", program, setup.args.join(" "));

        let status = self
            .cmd_executor
            .run(
                |cmd| cmd.current_dir(&self.config.project_root).args(&setup.args),
                &program,
            )
            .map_err(|source| PipelineError::SetupSpawn {
                program: program.clone(),
                source,
            })?;

        if !status.success() {
            return Err(PipelineError::SetupFailed {
                program,
                code: status.code(),
            });
        }
        Ok(())
    }
}
