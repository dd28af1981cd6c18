//! Error types for tagscope-core.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur when working with configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error("invalid configuration: {0}")]
    Deserialize(#[from] Box<figment::Error>),

    /// Configuration file not found after searching all locations.
    #[error("no configuration file found")]
    NotFound,
}

/// Result type alias using [`ConfigError`].
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur during phrase analysis.
///
/// The extraction itself is total over valid options; only the options
/// can be rejected.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AnalysisError {
    /// Substring length bounds are unusable.
    #[error("invalid phrase length bounds: min {min_len}, max {max_len}")]
    InvalidBounds {
        /// Requested minimum length in characters.
        min_len: usize,
        /// Requested maximum length in characters.
        max_len: usize,
    },

    /// A count-style option must be at least one.
    #[error("{name} must be at least 1")]
    InvalidOption {
        /// The option that was zero.
        name: &'static str,
    },
}

/// Result type alias using [`AnalysisError`].
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Errors that can occur while scanning or editing a dataset.
#[derive(Error, Debug)]
pub enum DatasetError {
    /// The dataset root is missing or not a directory.
    #[error("dataset root is not a directory: {0}")]
    NotADirectory(Utf8PathBuf),

    /// A path under the dataset root is not valid UTF-8.
    #[error("path is not valid UTF-8: {0}")]
    NonUtf8Path(std::path::PathBuf),

    /// Reading or writing a caption file failed.
    #[error("failed to access {path}")]
    Io {
        /// Caption file path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A caption file exceeds the configured size limit.
    #[error("caption too large: {path} is {size} bytes (limit: {limit} bytes)")]
    CaptionTooLarge {
        /// Caption file path.
        path: Utf8PathBuf,
        /// Actual size in bytes.
        size: u64,
        /// Configured limit in bytes.
        limit: u64,
    },

    /// No item with the given id exists in the dataset.
    #[error("item not found: {0}")]
    ItemNotFound(String),

    /// A tag pattern failed to compile.
    #[error("invalid tag pattern")]
    Pattern(#[from] regex::Error),
}

/// Result type alias using [`DatasetError`].
pub type DatasetResult<T> = Result<T, DatasetError>;
