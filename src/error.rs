//! Error types

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while loading or querying pages
#[derive(Debug, Error)]
pub enum Error {
    /// Bad or missing root directory, or an invalid configuration value
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to decode {path:?} as {encoding}")]
    Encoding { path: PathBuf, encoding: String },

    #[error("invalid YAML metadata in '{path}': {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// The metadata block decoded to something other than a mapping
    #[error("expected a mapping in metadata for '{path}', got {found}")]
    MetadataType { path: String, found: &'static str },

    #[error("unknown filter operator '{0}'")]
    UnknownOperator(String),

    #[error("cannot order by '{field}': {left} and {right} values are not comparable")]
    Incomparable {
        field: String,
        left: &'static str,
        right: &'static str,
    },

    #[error("unknown highlight style '{0}'")]
    UnknownStyle(String),

    /// No page at the requested logical path
    #[error("no page at '{0}'")]
    NotFound(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error means "no such page" rather than a failed build
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}
