//! Configuration file loading and saving

use super::error::ConfigError;
use super::file::{ConfigFile, CONFIG_FILE_NAME};
use crate::infra::{FileSystem, RealFileSystem};
use std::path::Path;

/// Handles loading and saving configuration files
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config from .bundle-sizer.toml in the given directory
    ///
    /// A missing file yields the default configuration.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use bundle_sizer::config::ConfigLoader;
    /// use std::path::Path;
    ///
    /// let config = ConfigLoader::load(Path::new("."))?;
    /// println!("Writing entries to {}", config.out_dir.display());
    /// # Ok::<(), bundle_sizer::config::ConfigError>(())
    /// ```
    pub fn load(project_root: &Path) -> Result<ConfigFile, ConfigError> {
        Self::load_with_fs(project_root, &RealFileSystem)
    }

    /// Load config with a custom filesystem implementation
    pub fn load_with_fs<FS: FileSystem>(
        project_root: &Path,
        fs: &FS,
    ) -> Result<ConfigFile, ConfigError> {
        let config_path = project_root.join(CONFIG_FILE_NAME);

        // Read directly rather than checking existence first
        match fs.read_to_string(&config_path) {
            Ok(contents) => Self::parse(&config_path, &contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("{} not found, using defaults", config_path.display());
                Ok(ConfigFile::default())
            }
            Err(source) => Err(ConfigError::Read {
                path: config_path,
                source,
            }),
        }
    }

    /// Load an explicitly named config file; unlike [`ConfigLoader::load`]
    /// a missing file is an error.
    pub fn load_from<FS: FileSystem>(path: &Path, fs: &FS) -> Result<ConfigFile, ConfigError> {
        let contents = fs.read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &contents)
    }

    fn parse(path: &Path, contents: &str) -> Result<ConfigFile, ConfigError> {
        let config: ConfigFile =
            toml_edit::de::from_str(contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        log::debug!("loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Save config to .bundle-sizer.toml in the given directory
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use bundle_sizer::config::{ConfigFile, ConfigLoader};
    /// use std::path::Path;
    ///
    /// let mut config = ConfigFile::default();
    /// config.packages = vec!["react".to_string()];
    /// ConfigLoader::save(&config, Path::new("."))?;
    /// # Ok::<(), bundle_sizer::config::ConfigError>(())
    /// ```
    pub fn save(config: &ConfigFile, project_root: &Path) -> Result<(), ConfigError> {
        Self::save_with_fs(config, project_root, &RealFileSystem)
    }

    /// Save config with a custom filesystem implementation
    pub fn save_with_fs<FS: FileSystem>(
        config: &ConfigFile,
        project_root: &Path,
        fs: &FS,
    ) -> Result<(), ConfigError> {
        let config_path = project_root.join(CONFIG_FILE_NAME);
        let contents = toml_edit::ser::to_string_pretty(config)?;

        fs.write(&config_path, contents.as_bytes())
            .map_err(|source| ConfigError::Write {
                path: config_path,
                source,
            })
    }

    /// Check if config file exists in project
    pub fn exists(project_root: &Path) -> bool {
        project_root.join(CONFIG_FILE_NAME).exists()
    }
}
