//! Request path resolution
//!
//! Maps an inbound URL path onto the configured asset root. Paths are
//! normalized lexically before joining, so `..` segments can never climb
//! out of the root.

use std::path::{Component, Path, PathBuf};

/// A request path resolved against the asset root.
///
/// Resolution is purely lexical; whether `source` exists and is a regular
/// file is the caller's concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAsset {
    /// Path relative to the asset root, also used to mirror the tree under
    /// the cache root
    pub child: PathBuf,
    /// Absolute path of the source asset
    pub source: PathBuf,
}

/// Resolve a raw URL path (query string already removed) against `asset_root`.
pub fn resolve(asset_root: &Path, url_path: &str) -> ResolvedAsset {
    let child = normalize(url_path);
    let source = asset_root.join(&child);
    ResolvedAsset { child, source }
}

/// Lexically resolve `.` and `..`; parent segments at the top are dropped
/// rather than allowed to escape.
fn normalize(url_path: &str) -> PathBuf {
    let mut out = PathBuf::new();
    for component in Path::new(url_path).components() {
        match component {
            Component::Normal(segment) => out.push(segment),
            Component::ParentDir => {
                out.pop();
            }
            Component::RootDir | Component::CurDir | Component::Prefix(_) => {}
        }
    }
    out
}
