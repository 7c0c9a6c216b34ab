//! Init command implementation
//!
//! Handles the `bundle-sizer init` command which writes a
//! `.bundle-sizer.toml` with the default build settings.

use anyhow::Result;
use console::style;
use std::env;
use std::path::Path;

use crate::config::{self, ConfigError, ConfigFile, ConfigLoader};
use crate::error::BundleSizerError;
use crate::fmt::{icon, CHECKMARK, ROCKET, WARNING};

/// Outcome of [`write_config`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    /// A new file was written
    Created,
    /// An existing file was replaced (`--force`)
    Overwritten,
    /// A file already existed and was left alone
    Skipped,
}

/// Write the default configuration into `project_root`
///
/// `packages`, when non-empty, becomes the static package list; otherwise the
/// file leaves the list unset so package.json is used.
pub fn write_config(
    project_root: &Path,
    packages: &[String],
    force: bool,
) -> Result<InitOutcome, ConfigError> {
    let existed = ConfigLoader::exists(project_root);
    if existed && !force {
        return Ok(InitOutcome::Skipped);
    }

    let config = ConfigFile {
        packages: packages.to_vec(),
        ..Default::default()
    };
    ConfigLoader::save(&config, project_root)?;

    Ok(if existed {
        InitOutcome::Overwritten
    } else {
        InitOutcome::Created
    })
}

/// Initialize bundle-sizer configuration in the current directory
///
/// # Examples
///
/// ```no_run
/// use bundle_sizer::cmd::init::cmd_init;
///
/// cmd_init(&["react".to_string(), "redux".to_string()], false)?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn cmd_init(packages: &[String], force: bool) -> Result<()> {
    println!(
        "{} {} Initializing bundle-sizer",
        icon(ROCKET),
        style("bundle-sizer init").bold()
    );
    println!();

    let project_root = env::current_dir()?;

    match write_config(&project_root, packages, force).map_err(BundleSizerError::from)? {
        InitOutcome::Skipped => {
            println!(
                "{} Config file already exists: {}",
                icon(WARNING),
                style(config::CONFIG_FILE_NAME).cyan()
            );
            println!("   Pass --force to overwrite it.");
            return Ok(());
        }
        InitOutcome::Overwritten => println!(
            "{} Overwrote {}",
            icon(CHECKMARK),
            style(config::CONFIG_FILE_NAME).cyan().bold()
        ),
        InitOutcome::Created => println!(
            "{} Created {}",
            icon(CHECKMARK),
            style(config::CONFIG_FILE_NAME).cyan().bold()
        ),
    }

    println!();
    println!("{}  Next Steps:", style("💡").bold());
    if packages.is_empty() {
        println!("   1. Add dependencies to package.json or list them under `packages`");
    } else {
        println!("   1. Adjust the `packages` list if needed");
    }
    println!("   2. Point [build] at your bundler config if it is not rollup.config.js");
    println!(
        "   3. Run {} to measure",
        style("bundle-sizer measure").cyan()
    );

    Ok(())
}
