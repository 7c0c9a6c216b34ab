//! Configuration file data structures

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::error::ConfigError;
use crate::pipeline::config::{
    BuildCommand, GateConfig, ParamStyle, PipelineConfig, SetupCommand, TotalsPolicy,
    DEFAULT_ENV_PREFIX,
};

/// Configuration file name
pub const CONFIG_FILE_NAME: &str = ".bundle-sizer.toml";

/// bundle-sizer configuration file structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Static package list
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub packages: Vec<String>,

    /// package.json whose dependencies are measured when no list is given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest: Option<PathBuf>,

    /// Output directory, relative to the project root
    #[serde(rename = "out-dir", default = "default_out_dir")]
    pub out_dir: PathBuf,

    /// Entry and artifact file extension
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Build command settings
    #[serde(default)]
    pub build: BuildSettings,

    /// Optional pre-build step
    #[serde(skip_serializing_if = "Option::is_none")]
    pub setup: Option<SetupSettings>,

    /// Gate capacities
    #[serde(default)]
    pub concurrency: ConcurrencySettings,

    /// Report settings
    #[serde(default)]
    pub report: ReportSettings,
}

fn default_out_dir() -> PathBuf {
    PathBuf::from("dist")
}

fn default_extension() -> String {
    "js".to_string()
}

/// External build command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildSettings {
    /// Program; paths with a directory component are relative to the project root
    #[serde(default = "default_program")]
    pub program: PathBuf,

    /// Arguments passed before the job parameters
    #[serde(default = "default_args")]
    pub args: Vec<String>,

    /// "env" or "args"
    #[serde(default)]
    pub params: ParamStyle,

    /// Variable prefix for `params = "env"`
    #[serde(rename = "env-prefix", default = "default_env_prefix")]
    pub env_prefix: String,

    /// Per-build deadline in seconds
    #[serde(rename = "timeout-secs", skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

fn default_program() -> PathBuf {
    BuildCommand::default().program
}

fn default_args() -> Vec<String> {
    BuildCommand::default().args
}

fn default_env_prefix() -> String {
    DEFAULT_ENV_PREFIX.to_string()
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: default_args(),
            params: ParamStyle::default(),
            env_prefix: default_env_prefix(),
            timeout_secs: None,
        }
    }
}

/// Setup command run once before measuring (e.g. `npm install`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetupSettings {
    /// Program
    pub program: PathBuf,

    /// Arguments
    #[serde(default)]
    pub args: Vec<String>,
}

/// Gate capacities; unset values fall back to the pipeline defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConcurrencySettings {
    /// Concurrent entry writes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub io: Option<usize>,

    /// Concurrent builds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exec: Option<usize>,
}

/// Report settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportSettings {
    /// "include-aggregate" or "packages-only"
    #[serde(default)]
    pub totals: TotalsPolicy,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            packages: Vec::new(),
            manifest: None,
            out_dir: default_out_dir(),
            extension: default_extension(),
            build: BuildSettings::default(),
            setup: None,
            concurrency: ConcurrencySettings::default(),
            report: ReportSettings::default(),
        }
    }
}

impl ConfigFile {
    /// Check value ranges that serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency.io == Some(0) {
            return Err(ConfigError::Invalid(
                "concurrency.io must be at least 1".to_string(),
            ));
        }
        if self.concurrency.exec == Some(0) {
            return Err(ConfigError::Invalid(
                "concurrency.exec must be at least 1".to_string(),
            ));
        }
        if self.build.program.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "build.program must not be empty".to_string(),
            ));
        }
        if self.build.params == ParamStyle::Env && self.build.env_prefix.is_empty() {
            return Err(ConfigError::Invalid(
                "build.env-prefix must not be empty when params = \"env\"".to_string(),
            ));
        }
        if self.build.timeout_secs == Some(0) {
            return Err(ConfigError::Invalid(
                "build.timeout-secs must be at least 1".to_string(),
            ));
        }
        if self.extension.is_empty()
            || self.extension.starts_with('.')
            || self.extension.contains(['/', '\\'])
        {
            return Err(ConfigError::Invalid(format!(
                "extension '{}' must be a bare file extension such as \"js\"",
                self.extension
            )));
        }
        if let Some(ref setup) = self.setup {
            if setup.program.as_os_str().is_empty() {
                return Err(ConfigError::Invalid(
                    "setup.program must not be empty".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Pipeline configuration rooted at `project_root`
    pub fn to_pipeline_config(&self, project_root: &Path) -> PipelineConfig {
        let defaults = GateConfig::default();
        PipelineConfig {
            project_root: project_root.to_path_buf(),
            out_dir: project_root.join(&self.out_dir),
            extension: self.extension.clone(),
            build: BuildCommand {
                program: self.build.program.clone(),
                args: self.build.args.clone(),
                params: self.build.params,
                env_prefix: self.build.env_prefix.clone(),
                timeout: self.build.timeout_secs.map(Duration::from_secs),
            },
            setup: self.setup.as_ref().map(|s| SetupCommand {
                program: s.program.clone(),
                args: s.args.clone(),
            }),
            gates: GateConfig {
                io: self.concurrency.io.unwrap_or(defaults.io),
                exec: self.concurrency.exec.unwrap_or(defaults.exec),
            },
            totals: self.report.totals,
        }
    }
}
