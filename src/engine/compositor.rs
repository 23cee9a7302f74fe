//! Export compositing pipeline
//!
//! Center-crops a source image to the aspect ratio of a photo spec and
//! optionally paints it over a solid backdrop before encoding it as PNG.
//! Crop only, never resize: the output keeps the source's pixel density.

use bytes::Bytes;
use image::codecs::png::PngEncoder;
use image::{ColorType, DynamicImage, GenericImageView, ImageEncoder, Rgba, RgbaImage};
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::{FillColor, PhotoSpec, SpecError};

/// Largest output canvas we are willing to allocate (100 megapixels)
pub const MAX_CANVAS_PIXELS: u64 = 100_000_000;

/// Compositing errors
#[derive(Debug, Error)]
pub enum CompositorError {
    #[error(transparent)]
    MalformedSpec(#[from] SpecError),
    #[error("Invalid source image: {0}")]
    InvalidSource(String),
    #[error("Cannot allocate {width}x{height} canvas")]
    CanvasAllocation { width: u32, height: u32 },
    #[error("PNG encoding failed: {0}")]
    Encoding(#[source] image::ImageError),
}

/// Axis-aligned crop rectangle inside the source image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    pub offset_x: u32,
    pub offset_y: u32,
    pub width: u32,
    pub height: u32,
}

/// Final PNG raster produced by an export
#[derive(Debug, Clone)]
pub struct ExportResult {
    pub bytes: Bytes,
    pub width: u32,
    pub height: u32,
    pub crop: CropRegion,
}

/// Round half to even, clamped into `[0, max]`
fn round_px(value: f64, max: u32) -> u32 {
    value.round_ties_even().clamp(0.0, max as f64) as u32
}

/// Compute the centered crop of a `source_width x source_height` image
/// that matches `target_ratio` (width / height)
///
/// A source wider than the target loses columns and keeps its full height;
/// anything else (including an exact ratio match) keeps its full width.
pub fn compute_crop(
    source_width: u32,
    source_height: u32,
    target_ratio: f64,
) -> Result<CropRegion, CompositorError> {
    if source_width == 0 || source_height == 0 {
        return Err(CompositorError::InvalidSource(format!(
            "dimensions must be positive, got {}x{}",
            source_width, source_height
        )));
    }
    if !target_ratio.is_finite() || target_ratio <= 0.0 {
        return Err(CompositorError::InvalidSource(format!(
            "target ratio must be positive, got {}",
            target_ratio
        )));
    }

    let current_ratio = source_width as f64 / source_height as f64;

    let region = if current_ratio > target_ratio {
        let width = round_px(source_height as f64 * target_ratio, source_width);
        CropRegion {
            offset_x: round_px((source_width - width) as f64 / 2.0, source_width - width),
            offset_y: 0,
            width,
            height: source_height,
        }
    } else {
        let height = round_px(source_width as f64 / target_ratio, source_height);
        CropRegion {
            offset_x: 0,
            offset_y: round_px((source_height - height) as f64 / 2.0, source_height - height),
            width: source_width,
            height,
        }
    };

    if region.width == 0 || region.height == 0 {
        return Err(CompositorError::CanvasAllocation {
            width: region.width,
            height: region.height,
        });
    }

    debug!(
        source_width,
        source_height,
        current_ratio,
        target_ratio,
        crop = ?region,
        "Computed crop region"
    );

    Ok(region)
}

/// Crop `source` to `spec`, fill the backdrop and encode as PNG
pub fn composite(
    source: &DynamicImage,
    spec: &PhotoSpec,
    fill: FillColor,
) -> Result<ExportResult, CompositorError> {
    let target_ratio = spec.target_ratio()?;
    let (source_width, source_height) = source.dimensions();
    let crop = compute_crop(source_width, source_height, target_ratio)?;

    if crop.width as u64 * crop.height as u64 > MAX_CANVAS_PIXELS {
        return Err(CompositorError::CanvasAllocation {
            width: crop.width,
            height: crop.height,
        });
    }

    let foreground = source
        .crop_imm(crop.offset_x, crop.offset_y, crop.width, crop.height)
        .to_rgba8();

    let canvas = match fill.to_rgba() {
        Some(color) => flatten_onto(&foreground, color),
        None => foreground,
    };

    let png = encode_png(&canvas)?;

    info!(
        spec = spec.name,
        width = crop.width,
        height = crop.height,
        offset_x = crop.offset_x,
        offset_y = crop.offset_y,
        fill = ?fill.to_hex(),
        bytes = png.len(),
        "Export composited"
    );

    Ok(ExportResult {
        bytes: Bytes::from(png),
        width: crop.width,
        height: crop.height,
        crop,
    })
}

/// Source-over `foreground` onto an opaque backdrop
///
/// Integer blend rounded to nearest; the result is always fully opaque.
fn flatten_onto(foreground: &RgbaImage, backdrop: Rgba<u8>) -> RgbaImage {
    RgbaImage::from_fn(foreground.width(), foreground.height(), |x, y| {
        let Rgba([r, g, b, a]) = *foreground.get_pixel(x, y);
        let a = a as u32;
        let mix = |src: u8, dst: u8| ((src as u32 * a + dst as u32 * (255 - a) + 127) / 255) as u8;
        Rgba([mix(r, backdrop[0]), mix(g, backdrop[1]), mix(b, backdrop[2]), 255])
    })
}

/// Decode raw image bytes, then [`composite`]
pub fn composite_bytes(
    source: &[u8],
    spec: &PhotoSpec,
    fill: FillColor,
) -> Result<ExportResult, CompositorError> {
    let image = decode_source(source)?;
    composite(&image, spec, fill)
}

/// Decode source bytes, mapping failures to `InvalidSource`
pub fn decode_source(source: &[u8]) -> Result<DynamicImage, CompositorError> {
    image::load_from_memory(source).map_err(|e| CompositorError::InvalidSource(e.to_string()))
}

/// Encode an RGBA image to PNG bytes (preserves transparency)
fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, CompositorError> {
    let mut buffer = Vec::new();
    PngEncoder::new(&mut buffer)
        .write_image(image.as_raw(), image.width(), image.height(), ColorType::Rgba8)
        .map_err(CompositorError::Encoding)?;
    Ok(buffer)
}
