//! Transform invocation and persistence
//!
//! Owns the failure policy around the engine: any failure to prepare,
//! render, or publish a variant degrades the request to the original,
//! untransformed asset instead of surfacing an error.

use crate::error::{ThumbError, ThumbResult};
use crate::params::TransformParams;
use crate::transform::engine::{TransformEngine, TransformSpec};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, error};

/// Compute the variant for `source` at `dest` and return the path to serve.
///
/// Returns `dest` on success and `source` on any failure; a transform
/// problem never fails the request, it only costs the resize.
pub async fn invoke(
    engine: &dyn TransformEngine,
    source: &Path,
    dest: &Path,
    params: &TransformParams,
) -> PathBuf {
    match try_invoke(engine, source, dest, params).await {
        Ok(()) => {
            debug!("cached variant at {}", dest.display());
            dest.to_path_buf()
        }
        Err(e) => {
            error!("serving source for {}: {}", source.display(), e);
            source.to_path_buf()
        }
    }
}

async fn try_invoke(
    engine: &dyn TransformEngine,
    source: &Path,
    dest: &Path,
    params: &TransformParams,
) -> ThumbResult<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| ThumbError::CacheDirCreate {
                path: parent.to_path_buf(),
                source: e,
            })?;
    }

    let spec = TransformSpec {
        width: params.width,
        height: params.height,
        flatten: params.flatten,
    };

    let staging = staging_path(dest);
    debug!("rendering {} -> {}", source.display(), dest.display());

    if let Err(e) = engine.render(source, &staging, spec).await {
        let _ = fs::remove_file(&staging).await;
        return Err(e);
    }

    fs::rename(&staging, dest)
        .await
        .map_err(|e| ThumbError::io(format!("publishing variant {}", dest.display()), e))
}

/// Variants are rendered beside their final location and renamed into
/// place, so an abandoned render never leaves a half-written variant
/// observable at the served path.
fn staging_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    dest.with_file_name(name)
}
