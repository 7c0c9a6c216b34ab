#![warn(missing_docs)]
#![warn(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! bundle-sizer library
//!
//! Measures how much each JavaScript package adds to a bundle. For every
//! package a one-line entry (`console.log(require('<name>'));`) is written,
//! plus one aggregate entry requiring them all; an external bundler builds
//! each entry and the minified and gzipped artifacts are measured.
//!
//! # Basic Example
//!
//! Building the entry sources:
//!
//! ```
//! use bundle_sizer::pipeline::entry::{aggregate_source, entry_source};
//!
//! assert_eq!(entry_source("react"), "console.log(require('react'));");
//!
//! let all = aggregate_source(&["react".to_string(), "redux".to_string()]);
//! assert!(all.contains("require('redux')"));
//! ```
//!
//! # Advanced Example: Running the Pipeline
//!
//! Two builds at a time, results sorted by gzipped size:
//!
//! ```no_run
//! use bundle_sizer::pipeline::{PipelineConfig, ReportRenderer, SizePipeline};
//!
//! let mut config = PipelineConfig::new(".");
//! config.gates.exec = 2;
//!
//! let report = SizePipeline::new(config)
//!     .run(&["react".to_string(), "redux".to_string()])?;
//!
//! for row in &report.rows {
//!     println!("{}: {} / {}", row.display_name, row.output_bytes, row.output_compressed_bytes);
//! }
//! print!("{}", ReportRenderer::render_table(&report));
//! # Ok::<(), bundle_sizer::pipeline::PipelineError>(())
//! ```
//!
//! # Advanced Example: Configuration
//!
//! ```
//! use bundle_sizer::config::ConfigFile;
//! use std::path::Path;
//!
//! let config = ConfigFile::default();
//! assert!(config.validate().is_ok());
//!
//! let pipeline = config.to_pipeline_config(Path::new("/project"));
//! assert_eq!(pipeline.out_dir, Path::new("/project/dist"));
//! ```

/// Command handlers for CLI operations
pub mod cmd;
/// Configuration file and package list resolution
pub mod config;
/// Enhanced error types with contextual suggestions
pub mod error;
/// Shared formatting utilities
pub mod fmt;
/// Infrastructure traits for filesystem and command execution
pub mod infra;
/// Measuring pipeline: materialize, build, aggregate
pub mod pipeline;
/// Tool detection and version checking
pub mod tools;
