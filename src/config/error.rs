//! Configuration errors

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading configuration or resolving packages
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read {}", .path.display())]
    Read {
        /// Config file path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this schema
    #[error("failed to parse {}", .path.display())]
    Parse {
        /// Config file path
        path: PathBuf,
        /// Parser error
        #[source]
        source: toml_edit::de::Error,
    },

    /// Config could not be serialized
    #[error("failed to serialize config")]
    Serialize(#[from] toml_edit::ser::Error),

    /// Config file could not be written
    #[error("failed to write {}", .path.display())]
    Write {
        /// Config file path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A value is out of range or inconsistent
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// Package manifest could not be read
    #[error("failed to read package manifest {}", .path.display())]
    ManifestRead {
        /// Manifest path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Package manifest is not valid JSON
    #[error("failed to parse package manifest {}", .path.display())]
    ManifestParse {
        /// Manifest path
        path: PathBuf,
        /// Parser error
        #[source]
        source: serde_json::Error,
    },

    /// Package resolution produced an empty list
    #[error("no packages to measure")]
    NoPackages,
}

impl ConfigError {
    /// Whether this error means a file did not exist
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Read { source, .. } | Self::ManifestRead { source, .. } => {
                source.kind() == std::io::ErrorKind::NotFound
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_not_found_detection() {
        let err = ConfigError::ManifestRead {
            path: PathBuf::from("package.json"),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert!(err.is_not_found());

        let err = ConfigError::Read {
            path: PathBuf::from(".bundle-sizer.toml"),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };
        assert!(!err.is_not_found());
        assert!(!ConfigError::NoPackages.is_not_found());
    }

    #[test]
    fn test_messages_name_the_file() {
        let err = ConfigError::Read {
            path: PathBuf::from("/p/.bundle-sizer.toml"),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert_eq!(err.to_string(), "failed to read /p/.bundle-sizer.toml");
    }
}
