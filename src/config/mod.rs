//! Configuration for bundle-sizer
//!
//! This module provides:
//! - .bundle-sizer.toml config file support
//! - package list resolution (static list or package.json manifest)

pub mod error;
pub mod file;
pub mod loader;
pub mod packages;

pub use error::ConfigError;
pub use file::{
    BuildSettings, ConcurrencySettings, ConfigFile, ReportSettings, SetupSettings,
    CONFIG_FILE_NAME,
};
pub use loader::ConfigLoader;
pub use packages::{PackageSource, DEFAULT_MANIFEST};
