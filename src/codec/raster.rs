//! Raster encoders backed by the `image` crate.

use super::EncodeOptions;
use crate::draw::PixelBuffer;
use image::codecs::{bmp::BmpEncoder, jpeg::JpegEncoder, png::PngEncoder};
use image::{ExtendedColorType, ImageEncoder, ImageResult};

pub(super) fn encode_png(buffer: &PixelBuffer) -> ImageResult<Vec<u8>> {
    let mut out = Vec::new();
    PngEncoder::new(&mut out).write_image(
        buffer.as_rgba(),
        buffer.width(),
        buffer.height(),
        ExtendedColorType::Rgba8,
    )?;
    Ok(out)
}

/// JPEG has no alpha: pixels are flattened against the opaque background.
pub(super) fn encode_jpeg(buffer: &PixelBuffer, options: &EncodeOptions) -> ImageResult<Vec<u8>> {
    let rgb = buffer.to_rgb_over(options.opaque_background);
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, options.jpeg_quality.clamp(1, 100)).write_image(
        &rgb,
        buffer.width(),
        buffer.height(),
        ExtendedColorType::Rgb8,
    )?;
    Ok(out)
}

pub(super) fn encode_bmp(buffer: &PixelBuffer, options: &EncodeOptions) -> ImageResult<Vec<u8>> {
    let rgb = buffer.to_rgb_over(options.opaque_background);
    let mut out = Vec::new();
    BmpEncoder::new(&mut out).write_image(
        &rgb,
        buffer.width(),
        buffer.height(),
        ExtendedColorType::Rgb8,
    )?;
    Ok(out)
}

pub(super) fn decode(bytes: &[u8]) -> ImageResult<PixelBuffer> {
    let rgba = image::load_from_memory(bytes)?.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(PixelBuffer::from_rgba(width, height, rgba.into_raw())
        .unwrap_or_else(|| PixelBuffer::new(width, height)))
}
