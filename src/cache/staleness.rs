//! Variant freshness checks
//!
//! Decides whether a cached variant can be served as-is or must be
//! recomputed from its source.

use crate::error::{ThumbError, ThumbResult};
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::fs;
use tracing::debug;

/// Result of comparing a cached variant against its source asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariantStatus {
    /// The variant exists and is at least as new as its source; serve it.
    Fresh(PathBuf),
    /// The variant exists but the source has been modified since it was
    /// written; it must be recomputed.
    Stale,
    /// No variant has been cached yet.
    Absent,
}

/// Compare the variant at `variant` against the source's modification time.
///
/// A missing variant is `Absent`; any other metadata failure is an error,
/// kept distinct so the caller can degrade instead of silently recomputing.
/// Equal timestamps count as fresh - staleness requires the source to be
/// strictly newer.
pub async fn check(source_mtime: SystemTime, variant: &Path) -> ThumbResult<VariantStatus> {
    let meta = match fs::metadata(variant).await {
        Ok(meta) => meta,
        // a non-directory in the prefix means the variant does not exist
        // either, it is not a broken check
        Err(e)
            if matches!(
                e.kind(),
                io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
            ) =>
        {
            debug!("no cached variant at {}", variant.display());
            return Ok(VariantStatus::Absent);
        }
        Err(e) => {
            return Err(ThumbError::StalenessCheck {
                path: variant.to_path_buf(),
                source: e,
            })
        }
    };

    let variant_mtime = meta.modified().map_err(|e| ThumbError::StalenessCheck {
        path: variant.to_path_buf(),
        source: e,
    })?;

    if source_mtime > variant_mtime {
        debug!("variant at {} predates its source", variant.display());
        Ok(VariantStatus::Stale)
    } else {
        Ok(VariantStatus::Fresh(variant.to_path_buf()))
    }
}
