//! Tool detection and verification module
//!
//! Checks that the external programs a run depends on can be started:
//! - the build command (required, usually `node_modules/.bin/rollup`)
//! - the setup command (required when configured, e.g. `npm`)

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::infra::{CommandExecutor, RealCommandExecutor};
use crate::pipeline::config::{resolve_program, PipelineConfig};

/// Errors that can occur during tool operations
#[derive(Error, Debug)]
pub enum ToolError {
    /// I/O error during tool execution
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Tool execution failed
    #[error("Failed to get version for {0}")]
    VersionFailed(String),

    /// Required tool is missing
    #[error("Required tool missing: {name} ({})", .program.display())]
    MissingTool {
        /// Role of the tool
        name: String,
        /// Program that could not be found
        program: PathBuf,
        /// How to get it
        install_hint: String,
    },
}

/// An external program the pipeline needs
///
/// # Examples
///
/// ```
/// use bundle_sizer::tools::Tool;
/// use std::path::Path;
///
/// let tool = Tool::new("build command", Path::new("sh"), "install a POSIX shell");
/// assert_eq!(tool.name(), "build command");
/// ```
#[derive(Debug)]
pub struct Tool<CE: CommandExecutor = RealCommandExecutor> {
    name: String,
    program: PathBuf,
    install_hint: String,
    cmd_executor: CE,
}

impl<CE: CommandExecutor> Tool<CE> {
    /// Create a new Tool with a custom command executor
    pub fn with_executor(
        name: impl Into<String>,
        program: &Path,
        install_hint: impl Into<String>,
        cmd_executor: CE,
    ) -> Self {
        Self {
            name: name.into(),
            program: program.to_path_buf(),
            install_hint: install_hint.into(),
            cmd_executor,
        }
    }

    /// Role of the tool
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Program path or name
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Check if the program is on PATH (bare names) or executable at its path
    pub fn is_installed(&self) -> bool {
        which::which(&self.program).is_ok()
    }

    /// First line of `<program> --version`
    pub fn version(&self) -> Result<String, ToolError> {
        let program = self.program.to_string_lossy();
        let output = self.cmd_executor.execute(|cmd| cmd.arg("--version"), &program)?;

        if !output.status.success() {
            return Err(ToolError::VersionFailed(self.name.clone()));
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .next()
            .unwrap_or("")
            .trim()
            .to_string())
    }

    /// Fail with [`ToolError::MissingTool`] unless the program can be found
    pub fn require(&self) -> Result<(), ToolError> {
        if self.is_installed() {
            log::debug!("{}: found {}", self.name, self.program.display());
            Ok(())
        } else {
            Err(ToolError::MissingTool {
                name: self.name.clone(),
                program: self.program.clone(),
                install_hint: self.install_hint.clone(),
            })
        }
    }
}

impl Tool<RealCommandExecutor> {
    /// Create a new Tool with real command execution
    pub fn new(name: impl Into<String>, program: &Path, install_hint: impl Into<String>) -> Self {
        Self::with_executor(name, program, install_hint, RealCommandExecutor)
    }
}

/// All programs one run depends on
pub struct ToolChain<CE: CommandExecutor = RealCommandExecutor> {
    /// Build command (required)
    pub build: Tool<CE>,
    /// Setup command, when configured
    pub setup: Option<Tool<CE>>,
}

impl ToolChain<RealCommandExecutor> {
    /// Tools for `config` with real command execution
    pub fn for_config(config: &PipelineConfig) -> Self {
        Self::with_executor(config, RealCommandExecutor)
    }
}

impl<CE: CommandExecutor + Clone> ToolChain<CE> {
    /// Tools for `config` with a custom command executor
    pub fn with_executor(config: &PipelineConfig, cmd_executor: CE) -> Self {
        let root = &config.project_root;
        let build_program = resolve_program(&config.build.program, root);
        let hint = if build_program.starts_with(root.join("node_modules")) {
            "run `npm install` in the project root, or configure [build] program".to_string()
        } else {
            format!(
                "install {} or configure [build] program",
                config.build.program.display()
            )
        };

        Self {
            build: Tool::with_executor("build command", &build_program, hint, cmd_executor.clone()),
            setup: config.setup.as_ref().map(|setup| {
                Tool::with_executor(
                    "setup command",
                    &resolve_program(&setup.program, root),
                    format!("install {} or remove [setup]", setup.program.display()),
                    cmd_executor,
                )
            }),
        }
    }
}

impl<CE: CommandExecutor> ToolChain<CE> {
    /// Check every tool, setup first since it runs first
    ///
    /// With debug logging on, the build command's version is logged too.
    pub fn check_required(&self) -> Result<(), ToolError> {
        if let Some(ref setup) = self.setup {
            setup.require()?;
        }
        self.build.require()?;
        if log::log_enabled!(log::Level::Debug) {
            log::debug!("{}: {}", self.build.name(), self.build_version());
        }
        Ok(())
    }

    /// Version line of the build command, or a note when it cannot be read
    pub fn build_version(&self) -> String {
        match self.build.version() {
            Ok(version) if !version.is_empty() => version,
            Ok(_) => "version unknown".to_string(),
            Err(err) => err.to_string(),
        }
    }
}
