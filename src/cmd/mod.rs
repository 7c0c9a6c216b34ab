//! Command handlers for bundle-sizer CLI
//!
//! Each submodule handles a specific CLI command; [`workflow`] holds the
//! measuring logic shared by the CLI and library callers.

pub mod completions;
pub mod init;
pub mod measure;
pub mod workflow;

// Re-export command functions for convenient access
pub use completions::cmd_completions;
pub use init::cmd_init;
pub use measure::{cmd_measure, ProgressSink};
pub use workflow::{MeasureOptions, MeasureWorkflow, PreparedRun};
