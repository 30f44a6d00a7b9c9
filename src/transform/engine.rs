//! Transform engine abstraction
//!
//! Provides a trait for the image transform so different backends can be
//! swapped in, plus the default CPU raster implementation built on the
//! `image` crate.

use crate::config::EngineConfig;
use crate::error::{ThumbError, ThumbResult};
use async_trait::async_trait;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::path::{Path, PathBuf};
use tracing::debug;

/// The subset of request parameters the engine acts on. Everything else in
/// a request only affects cache key derivation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformSpec {
    /// Target width; unset means scale from height preserving aspect ratio
    pub width: Option<u32>,
    /// Target height; unset means scale from width preserving aspect ratio
    pub height: Option<u32>,
    /// Merge any alpha channel onto an opaque background
    pub flatten: bool,
}

/// Abstract image transform interface
#[async_trait]
pub trait TransformEngine: Send + Sync {
    /// Render `source` into `dest` according to `spec`.
    ///
    /// `dest` may be a staging path; the encoded format follows the
    /// source's extension, never dest's.
    async fn render(&self, source: &Path, dest: &Path, spec: TransformSpec) -> ThumbResult<()>;
}

/// CPU raster engine backed by the `image` crate.
///
/// Decoding and encoding run on a blocking task so render work never stalls
/// the async request flow.
pub struct RasterEngine {
    filter: FilterType,
    background: [u8; 3],
}

impl RasterEngine {
    /// Build an engine from configuration.
    pub fn new(config: &EngineConfig) -> ThumbResult<Self> {
        Ok(Self {
            filter: parse_filter(&config.filter)?,
            background: config.flatten_background,
        })
    }
}

#[async_trait]
impl TransformEngine for RasterEngine {
    async fn render(&self, source: &Path, dest: &Path, spec: TransformSpec) -> ThumbResult<()> {
        let source: PathBuf = source.to_path_buf();
        let staged: PathBuf = dest.to_path_buf();
        let filter = self.filter;
        let background = self.background;

        tokio::task::spawn_blocking(move || render_blocking(&source, &staged, spec, filter, background))
            .await
            .map_err(|e| ThumbError::transform(dest, format!("render task failed: {e}")))?
    }
}

fn render_blocking(
    source: &Path,
    dest: &Path,
    spec: TransformSpec,
    filter: FilterType,
    background: [u8; 3],
) -> ThumbResult<()> {
    let format = ImageFormat::from_path(source)
        .map_err(|e| ThumbError::transform(source, e.to_string()))?;
    let img = image::open(source).map_err(|e| ThumbError::transform(source, e.to_string()))?;

    debug!(
        "resizing {} to {}x{}",
        source.display(),
        spec.width.map_or_else(|| "auto".to_string(), |w| w.to_string()),
        spec.height.map_or_else(|| "auto".to_string(), |h| h.to_string()),
    );

    let resized = match target_dimensions(img.width(), img.height(), spec) {
        Some((w, h)) => img.resize_exact(w, h, filter),
        None => img,
    };

    let out = if spec.flatten {
        flatten(resized, background)
    } else {
        resized
    };

    out.save_with_format(dest, format)
        .map_err(|e| ThumbError::transform(dest, e.to_string()))
}

/// Explicit width and height stretch to exactly that size; a single
/// dimension scales the other to preserve aspect ratio.
fn target_dimensions(
    source_width: u32,
    source_height: u32,
    spec: TransformSpec,
) -> Option<(u32, u32)> {
    match (spec.width, spec.height) {
        (Some(w), Some(h)) => Some((w, h)),
        (Some(w), None) => Some((w, scaled(source_height, w, source_width))),
        (None, Some(h)) => Some((scaled(source_width, h, source_height), h)),
        (None, None) => None,
    }
}

/// Scale `other` by `target / reference`, rounded, never below one pixel.
fn scaled(other: u32, target: u32, reference: u32) -> u32 {
    if reference == 0 {
        return other.max(1);
    }
    let scaled = (u64::from(other) * u64::from(target) + u64::from(reference) / 2)
        / u64::from(reference);
    (scaled as u32).max(1)
}

/// Composite an image with alpha onto an opaque background.
fn flatten(img: DynamicImage, background: [u8; 3]) -> DynamicImage {
    if !img.color().has_alpha() {
        return img;
    }

    let [r, g, b] = background;
    let mut base = RgbaImage::from_pixel(img.width(), img.height(), Rgba([r, g, b, 255]));
    image::imageops::overlay(&mut base, &img.to_rgba8(), 0, 0);

    DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(base).to_rgb8())
}

fn parse_filter(name: &str) -> ThumbResult<FilterType> {
    match name.to_ascii_lowercase().as_str() {
        "nearest" => Ok(FilterType::Nearest),
        "triangle" => Ok(FilterType::Triangle),
        "catmullrom" => Ok(FilterType::CatmullRom),
        "gaussian" => Ok(FilterType::Gaussian),
        "lanczos3" => Ok(FilterType::Lanczos3),
        other => Err(ThumbError::UnknownFilter(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn filter_names_parse() {
        assert!(parse_filter("lanczos3").is_ok());
        assert!(parse_filter("Nearest").is_ok());
        assert!(matches!(
            parse_filter("bicubic"),
            Err(ThumbError::UnknownFilter(_))
        ));
    }

    #[test]
    fn dimensions_both_set_are_exact() {
        let spec = TransformSpec {
            width: Some(400),
            height: Some(100),
            flatten: false,
        };
        assert_eq!(target_dimensions(800, 600, spec), Some((400, 100)));
    }

    #[test]
    fn single_dimension_preserves_aspect_ratio() {
        let spec = TransformSpec {
            width: Some(400),
            height: None,
            flatten: false,
        };
        assert_eq!(target_dimensions(800, 600, spec), Some((400, 300)));

        let spec = TransformSpec {
            width: None,
            height: Some(300),
            flatten: false,
        };
        assert_eq!(target_dimensions(800, 600, spec), Some((400, 300)));
    }

    #[test]
    fn no_dimensions_means_no_resize() {
        let spec = TransformSpec::default();
        assert_eq!(target_dimensions(800, 600, spec), None);
    }

    #[test]
    fn scaled_never_collapses_to_zero() {
        assert_eq!(scaled(1, 1, 1000), 1);
        assert_eq!(scaled(600, 0, 800), 1);
    }

    #[test]
    fn flatten_replaces_transparency() {
        let mut img = RgbaImage::from_pixel(2, 2, Rgba([10, 20, 30, 255]));
        img.put_pixel(0, 0, Rgba([0, 0, 0, 0]));
        let flat = flatten(DynamicImage::ImageRgba8(img), [255, 255, 255]);

        assert!(!flat.color().has_alpha());
        let rgb = flat.to_rgb8();
        assert_eq!(rgb.get_pixel(0, 0).0, [255, 255, 255]);
        assert_eq!(rgb.get_pixel(1, 1).0, [10, 20, 30]);
    }

    #[test]
    fn flatten_leaves_opaque_images_alone() {
        let img = DynamicImage::ImageRgb8(image::RgbImage::from_pixel(2, 2, image::Rgb([1, 2, 3])));
        let flat = flatten(img.clone(), [255, 255, 255]);
        assert_eq!(flat.to_rgb8().get_pixel(0, 0).0, [1, 2, 3]);
    }

    #[tokio::test]
    async fn renders_resized_png() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("photo.png");
        let dest = dir.path().join("out.part");

        image::RgbImage::from_pixel(8, 6, image::Rgb([100, 150, 200]))
            .save_with_format(&source, ImageFormat::Png)
            .unwrap();

        let engine = RasterEngine::new(&EngineConfig::default()).unwrap();
        let spec = TransformSpec {
            width: Some(4),
            height: None,
            flatten: false,
        };
        engine.render(&source, &dest, spec).await.unwrap();

        // staging path has no image extension, so the format must have
        // followed the source
        let rendered = image::load_from_memory(&std::fs::read(&dest).unwrap()).unwrap();
        assert_eq!((rendered.width(), rendered.height()), (4, 3));
    }

    #[tokio::test]
    async fn render_of_non_image_fails() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("fake.png");
        std::fs::write(&source, b"not an image").unwrap();

        let engine = RasterEngine::new(&EngineConfig::default()).unwrap();
        let result = engine
            .render(&source, &dir.path().join("out.part"), TransformSpec::default())
            .await;
        assert!(matches!(result, Err(ThumbError::Transform { .. })));
    }
}
