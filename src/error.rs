//! Error types with contextual suggestions
//!
//! Provides structured error types that include:
//! - Actionable error messages
//! - Suggested fixes and recovery actions
//! - Documentation links where one exists
//! - Proper exit codes for CI/CD
//!
//! # Examples
//!
//! ```no_run
//! use bundle_sizer::error::BundleSizerError;
//! use bundle_sizer::pipeline::{PipelineConfig, SizePipeline};
//!
//! let pipeline = SizePipeline::new(PipelineConfig::new("."));
//!
//! match pipeline.run(&["react".to_string()]) {
//!     Ok(report) => println!("{} rows measured", report.rows.len()),
//!     Err(e) => {
//!         let err = BundleSizerError::from(e);
//!         eprintln!("{}", err);
//!         std::process::exit(err.exit_code());
//!     }
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigError;
use crate::pipeline::{MaterializeError, PipelineError};
use crate::tools::ToolError;

/// bundle-sizer errors with contextual suggestions
#[derive(Error, Debug)]
pub enum BundleSizerError {
    /// Required tool is not installed
    #[error("Tool not installed: {tool} ({})", .program.display())]
    ToolMissing {
        /// Role of the tool
        tool: String,
        /// Program that was looked up
        program: PathBuf,
        /// How to install it
        install_hint: String,
        /// Optional documentation URL
        docs_url: Option<String>,
    },

    /// Configuration file not found
    #[error("Configuration file not found: {}", .path.display())]
    ConfigNotFound {
        /// Path to config file
        path: PathBuf,
        #[source]
        /// IO error source
        source: std::io::Error,
    },

    /// Configuration could not be parsed or has invalid values
    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        /// Config file, when the problem is tied to one
        path: Option<PathBuf>,
        /// What is wrong
        reason: String,
    },

    /// File not found during operation
    #[error("File not found: {}", .path.display())]
    FileNotFound {
        /// Path to missing file
        path: PathBuf,
        /// Operation that required the file
        operation: String,
    },

    /// Package manifest is malformed
    #[error("Invalid package manifest {}: {reason}", .path.display())]
    InvalidManifest {
        /// Manifest path
        path: PathBuf,
        /// Parser message
        reason: String,
    },

    /// Nothing to measure
    #[error("No packages to measure")]
    NoPackages,

    /// Some entries could not be built or measured
    #[error("{failed} of {total} builds failed")]
    BuildsFailed {
        /// Failed entries
        failed: usize,
        /// Attempted entries
        total: usize,
    },

    /// Generic I/O error with context
    #[error("I/O error: {context}")]
    Io {
        /// Context about where the error occurred
        context: String,
        #[source]
        /// IO error source
        source: std::io::Error,
    },

    /// Pipeline error during a run
    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
}

impl BundleSizerError {
    /// Get actionable suggestion for resolving this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use bundle_sizer::error::BundleSizerError;
    /// use std::path::PathBuf;
    ///
    /// let error = BundleSizerError::ToolMissing {
    ///     tool: "build command".to_string(),
    ///     program: PathBuf::from("node_modules/.bin/rollup"),
    ///     install_hint: "run `npm install` in the project root".to_string(),
    ///     docs_url: None,
    /// };
    ///
    /// let suggestion = error.suggestion().unwrap();
    /// assert!(suggestion.contains("npm install"));
    /// ```
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::ToolMissing { install_hint, .. } => Some(format!("To fix: {}", install_hint)),
            Self::ConfigNotFound { .. } => {
                Some("Run 'bundle-sizer init' to create a configuration file".to_string())
            }
            Self::InvalidConfig { path, .. } => Some(match path {
                Some(path) => format!("Fix the reported value in {}", path.display()),
                None => "Check the configuration values and command line flags".to_string(),
            }),
            Self::FileNotFound { path, operation } => Some(format!(
                "Ensure {} exists before {}, or list packages on the command line",
                path.display(),
                operation
            )),
            Self::InvalidManifest { .. } => {
                Some("The manifest must be a JSON object with a \"dependencies\" map".to_string())
            }
            Self::NoPackages => Some(
                "Pass package names, set `packages` in .bundle-sizer.toml, or add dependencies to package.json"
                    .to_string(),
            ),
            Self::BuildsFailed { .. } => {
                Some("Check the build errors above; successful entries are still reported".to_string())
            }
            Self::Io { context, .. } => Some(format!(
                "Check file permissions and that {} is accessible",
                context
            )),
            Self::Pipeline(e) => match e {
                PipelineError::Materialize(MaterializeError::DuplicateId { .. }) => Some(
                    "Two package names map to the same file name; remove one of them".to_string(),
                ),
                PipelineError::Materialize(_) => {
                    Some("Check that the output directory is writable".to_string())
                }
                PipelineError::InvalidConfig(_) => {
                    Some("Concurrency limits must be at least 1".to_string())
                }
                PipelineError::SetupSpawn { .. } | PipelineError::SetupFailed { .. } => {
                    Some("Fix the [setup] command or run with --skip-setup".to_string())
                }
                PipelineError::WorkerPool(_) | PipelineError::AggregationInconsistency { .. } => {
                    None
                }
            },
        }
    }

    /// Get documentation URL for this error.
    pub fn docs_url(&self) -> Option<&str> {
        match self {
            Self::ToolMissing { docs_url, .. } => docs_url.as_deref(),
            _ => None,
        }
    }

    /// Get appropriate exit code for this error.
    ///
    /// Returns Unix-style exit codes following sysexits.h conventions.
    ///
    /// # Examples
    ///
    /// ```
    /// use bundle_sizer::error::BundleSizerError;
    ///
    /// let error = BundleSizerError::BuildsFailed { failed: 1, total: 3 };
    /// assert_eq!(error.exit_code(), 1);
    /// assert_eq!(BundleSizerError::NoPackages.exit_code(), 65);
    /// ```
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ToolMissing { .. } => 127,      // Command not found (Unix convention)
            Self::ConfigNotFound { .. } => 66,    // EX_NOINPUT (sysexits.h)
            Self::InvalidConfig { .. } => 65,     // EX_DATAERR
            Self::FileNotFound { .. } => 66,      // EX_NOINPUT
            Self::InvalidManifest { .. } => 65,   // EX_DATAERR
            Self::NoPackages => 65,               // EX_DATAERR
            Self::BuildsFailed { .. } => 1,       // Generic error (CI should fail)
            Self::Io { .. } => 74,                // EX_IOERR
            Self::Pipeline(e) => match e {
                PipelineError::Materialize(MaterializeError::DuplicateId { .. })
                | PipelineError::Materialize(MaterializeError::NoPackages) => 65,
                PipelineError::Materialize(_) => 73, // EX_CANTCREAT
                PipelineError::InvalidConfig(_) => 65,
                PipelineError::WorkerPool(_) => 71, // EX_OSERR
                PipelineError::SetupSpawn { .. } => 127,
                PipelineError::SetupFailed { .. } => 1,
                PipelineError::AggregationInconsistency { .. } => 70, // EX_SOFTWARE
            },
        }
    }

    /// Returns the pipeline error if this is a `Pipeline` variant.
    pub fn as_pipeline_error(&self) -> Option<&PipelineError> {
        match self {
            Self::Pipeline(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for BundleSizerError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Read { path, source } if source.kind() == std::io::ErrorKind::NotFound => {
                Self::ConfigNotFound { path, source }
            }
            ConfigError::Read { path, source } => Self::Io {
                context: format!("reading {}", path.display()),
                source,
            },
            ConfigError::Parse { path, source } => Self::InvalidConfig {
                reason: source.to_string().trim_end().to_string(),
                path: Some(path),
            },
            ConfigError::Serialize(e) => Self::InvalidConfig {
                path: None,
                reason: e.to_string(),
            },
            ConfigError::Write { path, source } => Self::Io {
                context: format!("writing {}", path.display()),
                source,
            },
            ConfigError::Invalid(reason) => Self::InvalidConfig { path: None, reason },
            ConfigError::ManifestRead { path, source }
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                Self::FileNotFound {
                    path,
                    operation: "reading the package list".to_string(),
                }
            }
            ConfigError::ManifestRead { path, source } => Self::Io {
                context: format!("reading {}", path.display()),
                source,
            },
            ConfigError::ManifestParse { path, source } => Self::InvalidManifest {
                path,
                reason: source.to_string(),
            },
            ConfigError::NoPackages => Self::NoPackages,
        }
    }
}

impl From<ToolError> for BundleSizerError {
    fn from(err: ToolError) -> Self {
        match err {
            ToolError::MissingTool {
                name,
                program,
                install_hint,
            } => {
                let docs_url = program
                    .file_name()
                    .filter(|n| *n == "rollup")
                    .map(|_| "https://rollupjs.org/command-line-interface/".to_string());
                Self::ToolMissing {
                    tool: name,
                    program,
                    install_hint,
                    docs_url,
                }
            }
            ToolError::Io(source) => Self::Io {
                context: "checking tools".to_string(),
                source,
            },
            ToolError::VersionFailed(name) => Self::Io {
                context: format!("querying {} version", name),
                source: std::io::Error::other("version check failed"),
            },
        }
    }
}

/// Error formatter with colors and structured output
pub struct ErrorFormatter;

impl ErrorFormatter {
    /// Format error with suggestions and documentation links
    pub fn format(error: &anyhow::Error) -> String {
        use console::style;

        let mut output = String::new();

        // Main error message
        output.push_str(&format!("{} {}\n", style("error:").red().bold(), error));

        // Error chain (caused by)
        let mut source = error.source();
        let mut indent = 1;
        while let Some(err) = source {
            output.push_str(&format!(
                "{}{} {}\n",
                "  ".repeat(indent),
                style("caused by:").yellow(),
                err
            ));
            source = err.source();
            indent += 1;
        }

        if let Some(bs_error) = error.downcast_ref::<BundleSizerError>() {
            if let Some(suggestion) = bs_error.suggestion() {
                output.push_str(&format!(
                    "\n{} {}\n",
                    style("help:").cyan().bold(),
                    suggestion
                ));
            }

            if let Some(docs) = bs_error.docs_url() {
                output.push_str(&format!("{} {}\n", style("docs:").blue(), docs));
            }
        }

        output
    }

    /// Get exit code from error
    pub fn exit_code(error: &anyhow::Error) -> i32 {
        if let Some(bs_error) = error.downcast_ref::<BundleSizerError>() {
            bs_error.exit_code()
        } else {
            1 // Generic error
        }
    }
}
