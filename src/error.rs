//! Error types for thumbcache
//!
//! All modules use `ThumbResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for thumbcache operations
pub type ThumbResult<T> = Result<T, ThumbError>;

/// All errors that can occur in thumbcache
#[derive(Error, Debug)]
pub enum ThumbError {
    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Asset root is not a directory: {0}")]
    AssetRoot(PathBuf),

    #[error("Unknown resize filter: {0}")]
    UnknownFilter(String),

    // Cache errors
    #[error("Failed to create cache directory {path}: {source}")]
    CacheDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to stat cached variant {path}: {source}")]
    StalenessCheck {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Transform errors
    #[error("Transform failed for {path}: {reason}")]
    Transform { path: PathBuf, reason: String },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("{0}")]
    User(String),
}

impl ThumbError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a transform error for a source path
    pub fn transform(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Transform {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::AssetRoot(_) => Some("Set assets.root in config or pass --root"),
            Self::UnknownFilter(_) => {
                Some("Valid filters: nearest, triangle, catmullrom, gaussian, lanczos3")
            }
            _ => None,
        }
    }
}
