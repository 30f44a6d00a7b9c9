//! Configuration schema for thumbcache
//!
//! Configuration is stored at `~/.config/thumbcache/config.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Static asset tree settings
    pub assets: AssetConfig,

    /// Variant cache settings
    pub cache: CacheConfig,

    /// Transform engine settings
    pub engine: EngineConfig,
}

impl Config {
    /// Effective cache root: explicit `cache.dir`, or a hidden directory
    /// under the asset root.
    pub fn cache_dir(&self) -> PathBuf {
        match &self.cache.dir {
            Some(dir) => dir.clone(),
            None => self.assets.root.join(".cache"),
        }
    }
}

/// Static asset tree settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Root directory of the static asset tree
    pub root: PathBuf,

    /// Serve source files for requests without transform parameters
    /// instead of passing them through
    pub serve_static: bool,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            serve_static: false,
        }
    }
}

/// Variant cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache root directory; defaults to `.cache` under the asset root
    pub dir: Option<PathBuf>,

    /// Derive SHA-256 key segments instead of readable filtered keys
    pub hashed_keys: bool,

    /// Age in days after which `cache gc` removes a key directory (0 disables)
    pub gc_days: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: None,
            hashed_keys: false,
            gc_days: 30,
        }
    }
}

/// Transform engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Resize filter: nearest, triangle, catmullrom, gaussian, lanczos3
    pub filter: String,

    /// RGB background that flattened alpha is merged onto
    pub flatten_background: [u8; 3],
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            filter: "lanczos3".to_string(),
            flatten_background: [0, 0, 0],
        }
    }
}
