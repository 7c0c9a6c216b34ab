//! Where the package list comes from

use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use super::error::ConfigError;
use super::file::ConfigFile;
use crate::infra::FileSystem;

/// Manifest read when nothing else names the packages
pub const DEFAULT_MANIFEST: &str = "package.json";

#[derive(Deserialize)]
struct Manifest {
    #[serde(default)]
    dependencies: BTreeMap<String, serde_json::Value>,
}

/// A source of package names
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageSource {
    /// Explicit names, in order
    List(Vec<String>),
    /// Keys of the `dependencies` object in a package.json, sorted
    Manifest(PathBuf),
}

impl PackageSource {
    /// Pick the source by precedence: command line packages, command line
    /// manifest, config `packages`, config `manifest`, then `package.json`.
    pub fn select(cli_packages: &[String], cli_manifest: Option<&Path>, config: &ConfigFile) -> Self {
        if !cli_packages.is_empty() {
            Self::List(cli_packages.to_vec())
        } else if let Some(path) = cli_manifest {
            Self::Manifest(path.to_path_buf())
        } else if !config.packages.is_empty() {
            Self::List(config.packages.clone())
        } else if let Some(ref path) = config.manifest {
            Self::Manifest(path.clone())
        } else {
            Self::Manifest(PathBuf::from(DEFAULT_MANIFEST))
        }
    }

    /// Resolve to a non-empty list of distinct names.
    ///
    /// Relative manifest paths are resolved against `project_root`. Repeated
    /// names are dropped with a warning, keeping the first occurrence.
    pub fn resolve<FS: FileSystem>(
        &self,
        project_root: &Path,
        fs: &FS,
    ) -> Result<Vec<String>, ConfigError> {
        let names = match self {
            Self::List(names) => names.clone(),
            Self::Manifest(path) => read_manifest(&project_root.join(path), fs)?,
        };

        let mut seen = HashSet::with_capacity(names.len());
        let mut packages = Vec::with_capacity(names.len());
        for name in names {
            let name = name.trim().to_string();
            if name.is_empty() {
                continue;
            }
            if seen.insert(name.clone()) {
                packages.push(name);
            } else {
                log::warn!("package '{}' listed more than once, measuring it once", name);
            }
        }

        if packages.is_empty() {
            return Err(ConfigError::NoPackages);
        }
        Ok(packages)
    }
}

fn read_manifest<FS: FileSystem>(path: &Path, fs: &FS) -> Result<Vec<String>, ConfigError> {
    let contents = fs
        .read_to_string(path)
        .map_err(|source| ConfigError::ManifestRead {
            path: path.to_path_buf(),
            source,
        })?;
    let manifest: Manifest =
        serde_json::from_str(&contents).map_err(|source| ConfigError::ManifestParse {
            path: path.to_path_buf(),
            source,
        })?;
    log::debug!(
        "{} lists {} dependencies",
        path.display(),
        manifest.dependencies.len()
    );
    Ok(manifest.dependencies.into_keys().collect())
}
