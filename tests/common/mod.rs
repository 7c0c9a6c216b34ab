//! Common test utilities and helpers
//!
//! This module provides shared functionality for integration tests:
//! - Report assertion helpers
//! - Fake project and fake bundler fixtures
//!
//! # Usage
//!
//! ```rust,no_run
//! mod common;
//! use common::fixtures::FakeProject;
//!
//! let project = FakeProject::builder()
//!     .package("react", 900, 280)
//!     .build()?;
//! ```

pub mod assertions;
pub mod fixtures;

/// Check if running in CI environment
#[allow(dead_code)]
pub fn is_ci() -> bool {
    std::env::var("CI").is_ok() || std::env::var("GITHUB_ACTIONS").is_ok()
}

/// Check if a POSIX shell is available for the fake bundler script
#[allow(dead_code)]
pub fn has_posix_shell() -> bool {
    cfg!(unix) && which::which("sh").is_ok()
}

/// Macro to skip tests when the fake bundler cannot run
/// In CI, this will fail the test instead of skipping
#[macro_export]
macro_rules! require_shell {
    () => {
        if !$crate::common::has_posix_shell() {
            if $crate::common::is_ci() {
                panic!("POSIX shell missing in CI!");
            } else {
                eprintln!("⚠️  Skipping test: no POSIX shell to run the fake bundler");
                return;
            }
        }
    };
}
