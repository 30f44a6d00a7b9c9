//! Request transform parameters
//!
//! Parsed once per request and immutable afterwards. The typed fields drive
//! the transform step; the raw map keeps every pair as received so that
//! unrecognized parameters still separate cache entries.

use std::collections::BTreeMap;

/// Transform parameters parsed from a request query string.
///
/// `width` and `height` are only `Some` for values that parse as positive
/// integers. Pairs are stored sorted by key; a repeated key keeps its last
/// value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformParams {
    /// Target width in pixels
    pub width: Option<u32>,
    /// Target height in pixels
    pub height: Option<u32>,
    /// Merge any alpha channel onto an opaque background
    pub flatten: bool,
    raw: BTreeMap<String, String>,
}

impl TransformParams {
    /// Build parameters from decoded query pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut raw = BTreeMap::new();
        for (key, value) in pairs {
            raw.insert(key.into(), value.into());
        }

        let width = raw.get("width").and_then(|v| parse_dimension(v));
        let height = raw.get("height").and_then(|v| parse_dimension(v));
        let flatten = raw.get("flatten").is_some_and(|v| parse_flag(v));

        Self {
            width,
            height,
            flatten,
            raw,
        }
    }

    /// Whether a resize dimension was requested
    pub fn wants_resize(&self) -> bool {
        self.width.is_some() || self.height.is_some()
    }

    /// Whether the request carried no parameters at all
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Every pair as received, sorted by key
    pub fn raw(&self) -> &BTreeMap<String, String> {
        &self.raw
    }
}

/// Positive integers only; anything else counts as unset
fn parse_dimension(value: &str) -> Option<u32> {
    value.parse::<u32>().ok().filter(|v| *v > 0)
}

/// Boolean-ish query values: empty, `0`, `false`, `no`, `off` are false
fn parse_flag(value: &str) -> bool {
    !matches!(
        value.to_ascii_lowercase().as_str(),
        "" | "0" | "false" | "no" | "off"
    )
}
