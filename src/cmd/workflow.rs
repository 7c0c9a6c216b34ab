//! Measure workflow orchestration
//!
//! Separates the measuring logic from presentation so it can be used
//! programmatically or via the CLI:
//!
//! 1. **Configuration**: load `.bundle-sizer.toml` (or an explicit file) and
//!    apply command line overrides.
//! 2. **Package resolution**: command line list, configured list, or a
//!    package.json manifest.
//! 3. **Tool check**: the build (and setup) program must be resolvable.
//! 4. **Pipeline**: materialize, build and aggregate.
//!
//! # Examples
//!
//! ```no_run
//! use std::path::Path;
//! use bundle_sizer::cmd::workflow::{MeasureOptions, MeasureWorkflow};
//!
//! let workflow = MeasureWorkflow::new(Path::new("."));
//! let options = MeasureOptions {
//!     packages: vec!["react".to_string(), "redux".to_string()],
//!     ..Default::default()
//! };
//! let report = workflow.execute(&options)?;
//! println!("{} rows, {} failures", report.rows.len(), report.failures.len());
//! # Ok::<(), bundle_sizer::error::BundleSizerError>(())
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{ConfigFile, ConfigLoader, PackageSource};
use crate::error::BundleSizerError;
use crate::infra::{FileSystem, RealFileSystem};
use crate::pipeline::{EventSink, NoOpSink, PipelineConfig, Report, SizePipeline};
use crate::tools::ToolChain;

/// Command line overrides for one measuring run
#[derive(Debug, Clone, Default)]
pub struct MeasureOptions {
    /// Packages named on the command line
    pub packages: Vec<String>,
    /// Explicit config file
    pub config_path: Option<PathBuf>,
    /// Explicit package.json
    pub manifest: Option<PathBuf>,
    /// Output directory override
    pub out_dir: Option<PathBuf>,
    /// exec gate capacity override
    pub jobs: Option<usize>,
    /// io gate capacity override
    pub io_jobs: Option<usize>,
    /// Do not run the configured setup command
    pub skip_setup: bool,
}

/// Everything needed to start the pipeline
#[derive(Debug, Clone)]
pub struct PreparedRun {
    /// Effective pipeline configuration
    pub config: PipelineConfig,
    /// Resolved, deduplicated package names
    pub packages: Vec<String>,
}

/// Core measuring workflow
pub struct MeasureWorkflow<FS: FileSystem = RealFileSystem> {
    project_root: PathBuf,
    fs: FS,
}

impl MeasureWorkflow {
    /// Create a workflow rooted at `project_root`
    pub fn new(project_root: &Path) -> Self {
        Self::with_fs(project_root, RealFileSystem)
    }

    /// Check tools, then run the pipeline with `sink` receiving events
    pub fn execute_with_sink(
        &self,
        options: &MeasureOptions,
        sink: Arc<dyn EventSink>,
    ) -> Result<Report, BundleSizerError> {
        let prepared = self.prepare(options)?;
        ToolChain::for_config(&prepared.config).check_required()?;

        log::info!(
            "measuring {} packages with {} concurrent builds",
            prepared.packages.len(),
            prepared.config.gates.exec
        );
        let report = SizePipeline::new(prepared.config)
            .with_sink(sink)
            .run(&prepared.packages)?;
        Ok(report)
    }

    /// [`MeasureWorkflow::execute_with_sink`] without event reporting
    pub fn execute(&self, options: &MeasureOptions) -> Result<Report, BundleSizerError> {
        self.execute_with_sink(options, Arc::new(NoOpSink))
    }
}

impl<FS: FileSystem> MeasureWorkflow<FS> {
    /// Create a workflow with a custom filesystem implementation
    pub fn with_fs(project_root: &Path, fs: FS) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            fs,
        }
    }

    /// Load configuration, apply overrides and resolve the package list
    pub fn prepare(&self, options: &MeasureOptions) -> Result<PreparedRun, BundleSizerError> {
        let file = self.load_config(options)?;
        let mut config = file.to_pipeline_config(&self.project_root);

        if let Some(ref out_dir) = options.out_dir {
            config.out_dir = self.project_root.join(out_dir);
        }
        if let Some(jobs) = options.jobs {
            config.gates.exec = jobs;
        }
        if let Some(io_jobs) = options.io_jobs {
            config.gates.io = io_jobs;
        }
        if options.skip_setup {
            config.setup = None;
        }

        let source = PackageSource::select(&options.packages, options.manifest.as_deref(), &file);
        log::debug!("package source: {:?}", source);
        let packages = source.resolve(&self.project_root, &self.fs)?;

        Ok(PreparedRun { config, packages })
    }

    fn load_config(&self, options: &MeasureOptions) -> Result<ConfigFile, BundleSizerError> {
        let file = match options.config_path {
            Some(ref path) => ConfigLoader::load_from(&self.project_root.join(path), &self.fs)?,
            None => ConfigLoader::load_with_fs(&self.project_root, &self.fs)?,
        };
        Ok(file)
    }
}
