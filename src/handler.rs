//! Request orchestration
//!
//! Composes path resolution, cache key derivation, staleness checking and
//! transform invocation into a single decision per request: serve a
//! concrete file path, or hand the request to the next stage of the
//! surrounding pipeline. Never both, never neither.

use crate::cache::{self, VariantStatus};
use crate::config::Config;
use crate::params::TransformParams;
use crate::resolve::{self, ResolvedAsset};
use crate::transform::{self, TransformEngine};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, warn};
use url::form_urlencoded;

/// A request as seen by the handler: a URL path plus its parsed query.
#[derive(Debug, Clone)]
pub struct Request {
    path: String,
    params: TransformParams,
}

impl Request {
    /// Build a request from an already-parsed path and parameters.
    pub fn new(path: impl Into<String>, params: TransformParams) -> Self {
        Self {
            path: path.into(),
            params,
        }
    }

    /// Split a raw URL into its path and percent-decoded query pairs.
    ///
    /// The path portion is used as-is; only query values are decoded.
    pub fn from_url(url: &str) -> Self {
        let (path, query) = match url.split_once('?') {
            Some((path, query)) => (path, query),
            None => (url, ""),
        };
        let params = TransformParams::from_pairs(form_urlencoded::parse(query.as_bytes()).into_owned());
        Self::new(path, params)
    }

    /// The URL path
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The parsed query parameters
    pub fn params(&self) -> &TransformParams {
        &self.params
    }
}

/// Terminal decision for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Serve exactly this file
    Serve(PathBuf),
    /// Not ours; delegate to the next handler in the chain
    PassThrough,
}

/// Request-facing facade over the variant cache.
///
/// Holds the configuration and the transform engine; one instance serves
/// any number of concurrent requests. Identical concurrent misses may
/// recompute the same variant; the transform is a pure function of its
/// inputs, so the duplicate work is wasted but harmless.
pub struct Handler {
    config: Config,
    cache_dir: PathBuf,
    engine: Arc<dyn TransformEngine>,
}

impl Handler {
    /// Create a handler for the configured asset tree.
    pub fn new(config: Config, engine: Arc<dyn TransformEngine>) -> Self {
        let cache_dir = config.cache_dir();
        Self {
            config,
            cache_dir,
            engine,
        }
    }

    /// Decide how to answer `request`.
    ///
    /// Every failure mode degrades: a missing or irregular asset passes
    /// through, a broken staleness check or failed transform serves the
    /// source. No error escapes to the caller.
    pub async fn handle(&self, request: &Request) -> Outcome {
        let asset = resolve::resolve(&self.config.assets.root, request.path());

        let meta = match fs::metadata(&asset.source).await {
            Ok(meta) => meta,
            Err(e) => {
                debug!("{}: pass-through: {}", request.path(), e);
                return Outcome::PassThrough;
            }
        };
        if !meta.is_file() {
            debug!("{}: pass-through: not a regular file", request.path());
            return Outcome::PassThrough;
        }

        if self.should_transform(&asset, request.params()) {
            let source_mtime = match meta.modified() {
                Ok(mtime) => mtime,
                Err(e) => {
                    warn!("{}: source mtime unavailable: {}", request.path(), e);
                    return self.static_fallback(&asset);
                }
            };

            let key = cache::cache_key(request.params(), self.config.cache.hashed_keys);
            let variant = self.cache_dir.join(&key).join(&asset.child);

            match cache::check(source_mtime, &variant).await {
                Ok(VariantStatus::Fresh(path)) => {
                    debug!("{}: serving fresh variant", request.path());
                    return Outcome::Serve(path);
                }
                Ok(VariantStatus::Stale) | Ok(VariantStatus::Absent) => {
                    let served = transform::invoke(
                        self.engine.as_ref(),
                        &asset.source,
                        &variant,
                        request.params(),
                    )
                    .await;
                    return Outcome::Serve(served);
                }
                Err(e) => {
                    warn!("{}: staleness check failed: {}", request.path(), e);
                    // degrade to the no-transform decision below
                }
            }
        }

        self.static_fallback(&asset)
    }

    /// The no-transform decision: serve the source if configured to,
    /// otherwise leave the request to the next handler.
    fn static_fallback(&self, asset: &ResolvedAsset) -> Outcome {
        if self.config.assets.serve_static {
            Outcome::Serve(asset.source.clone())
        } else {
            debug!("{}: pass-through", asset.child.display());
            Outcome::PassThrough
        }
    }

    /// A transform applies when a positive dimension was requested and the
    /// asset is not a vector image.
    fn should_transform(&self, asset: &ResolvedAsset, params: &TransformParams) -> bool {
        if is_svg(&asset.source) {
            return false;
        }
        params.wants_resize()
    }
}

/// Vector images are exempt from resizing.
fn is_svg(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"))
}
