//! Error types for theme discovery, lookup and activation.

use std::path::PathBuf;

use thiserror::Error;

/// Convenience alias used throughout the library.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the themes manager.
#[derive(Debug, Error)]
pub enum Error {
    /// Lookup by a name no discovered theme answers to.
    #[error("theme `{0}` not found")]
    ThemeNotFound(String),

    /// Two manifests claim the same qualified name during a scan.
    #[error("duplicate theme `{name}`: declared at {first} and again at {second}")]
    DuplicateTheme {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// A manifest file exists but cannot be parsed.
    #[error("invalid manifest {path}: {reason}")]
    InvalidManifest { path: PathBuf, reason: String },

    /// Parent links form a loop; reported with one theme on the loop.
    #[error("theme parent chain cycles through `{0}`")]
    ParentCycle(String),

    /// Cache operation requested while caching is disabled in the config.
    #[error("themes cache is not enabled")]
    CacheDisabled,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
