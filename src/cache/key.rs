//! Cache key derivation
//!
//! A key is a single path segment derived from the full request parameter
//! set. Identical parameter sets always produce the same segment; pairs are
//! canonicalized into sorted order before serialization, so insertion order
//! never matters.

use crate::params::TransformParams;
use sha2::{Digest, Sha256};

/// Segment used when a request carries no parameters at all.
const EMPTY_KEY: &str = "default";

/// Characters that may never appear in a path segment.
const RESERVED: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Derive the cache key segment for a parameter set.
///
/// The canonical form is the sorted pairs joined as `k=v,k=v`, filtered
/// down to `[A-Za-z0-9_,=]`. Distinct parameter sets that filter to the
/// same string share a cache entry; that lossiness is part of the on-disk
/// format. Pass `hashed` to trade readable directory names for
/// collision-resistant SHA-256 segments.
pub fn cache_key(params: &TransformParams, hashed: bool) -> String {
    let canonical = canonical_form(params);

    if hashed {
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        return hex::encode(&hasher.finalize()[..8]);
    }

    let segment = sanitize(&canonical);
    if segment.is_empty() {
        EMPTY_KEY.to_string()
    } else {
        segment
    }
}

/// Sorted `k=v` pairs joined with commas.
fn canonical_form(params: &TransformParams) -> String {
    params
        .raw()
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Reduce the serialized form to a safe path segment.
fn sanitize(serialized: &str) -> String {
    let filtered: String = serialized
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | ',' | '='))
        .collect();

    // The reserved set is stripped on its own pass so the safety property
    // never depends on the filter above.
    filtered.chars().filter(|c| !RESERVED.contains(c)).collect()
}
