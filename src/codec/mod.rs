//! Image encoding for rendered selections.
//!
//! This module provides:
//! - [`ImageFormat`]: the closed, ordinal-stable list of output formats
//! - [`encode_pixels`]: raster encoding of a [`PixelBuffer`]
//! - [`encode_layout`]: encoding straight from a [`Layout`], keeping the
//!   vector format resolution-independent
//! - [`decode`]: reading raster output back into a [`PixelBuffer`]

mod raster;
mod svg;

use crate::draw::{Color, PixelBuffer, RenderError, color::WHITE, rasterize};
use crate::layout::Layout;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Supported output formats.
///
/// The ordinal of each variant is persisted in configuration files, so
/// variants may only ever be appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum ImageFormat {
    #[default]
    Png,
    Jpeg,
    Bmp,
    Svg,
}

impl ImageFormat {
    /// Every format in persisted ordinal order.
    pub const ALL: [ImageFormat; 4] = [
        ImageFormat::Png,
        ImageFormat::Jpeg,
        ImageFormat::Bmp,
        ImageFormat::Svg,
    ];

    pub fn ordinal(self) -> u8 {
        match self {
            ImageFormat::Png => 0,
            ImageFormat::Jpeg => 1,
            ImageFormat::Bmp => 2,
            ImageFormat::Svg => 3,
        }
    }

    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        Self::ALL.get(ordinal as usize).copied()
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Bmp => "image/bmp",
            ImageFormat::Svg => "image/svg+xml",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Bmp => "bmp",
            ImageFormat::Svg => "svg",
        }
    }

    pub fn is_vector(self) -> bool {
        matches!(self, ImageFormat::Svg)
    }

    /// Whether the encoding keeps the alpha channel.
    pub fn supports_alpha(self) -> bool {
        matches!(self, ImageFormat::Png | ImageFormat::Svg)
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImageFormat::Png => "PNG",
            ImageFormat::Jpeg => "JPEG",
            ImageFormat::Bmp => "BMP",
            ImageFormat::Svg => "SVG",
        };
        f.write_str(name)
    }
}

/// Returned when a persisted ordinal or a format name is not recognized.
#[derive(Debug, Error, PartialEq)]
pub enum UnknownFormat {
    #[error("Unknown image format ordinal {0}")]
    Ordinal(u8),
    #[error("Unknown image format '{0}' (expected png, jpeg, bmp or svg)")]
    Name(String),
}

impl From<ImageFormat> for u8 {
    fn from(format: ImageFormat) -> Self {
        format.ordinal()
    }
}

impl TryFrom<u8> for ImageFormat {
    type Error = UnknownFormat;

    fn try_from(ordinal: u8) -> Result<Self, Self::Error> {
        Self::from_ordinal(ordinal).ok_or(UnknownFormat::Ordinal(ordinal))
    }
}

impl FromStr for ImageFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "png" => Ok(ImageFormat::Png),
            "jpg" | "jpeg" => Ok(ImageFormat::Jpeg),
            "bmp" => Ok(ImageFormat::Bmp),
            "svg" => Ok(ImageFormat::Svg),
            other => Err(UnknownFormat::Name(other.to_string())),
        }
    }
}

/// Encoder settings that do not affect layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncodeOptions {
    /// JPEG quality, 1-100.
    pub jpeg_quality: u8,
    /// Color transparent pixels are flattened against for formats without alpha.
    pub opaque_background: Color,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            jpeg_quality: 90,
            opaque_background: WHITE,
        }
    }
}

/// Encoded image bytes tagged with their format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    format: ImageFormat,
    bytes: Vec<u8>,
}

impl EncodedImage {
    pub fn new(format: ImageFormat, bytes: Vec<u8>) -> Self {
        Self { format, bytes }
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn extension(&self) -> &'static str {
        self.format.extension()
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Errors that can occur while encoding or decoding an image.
#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("Cannot encode {format} image from empty {width}x{height} canvas")]
    EmptyCanvas {
        format: ImageFormat,
        width: u32,
        height: u32,
    },

    #[error("{format} encoder rejected the image: {source}")]
    Codec {
        format: ImageFormat,
        #[source]
        source: image::ImageError,
    },

    #[error("{format} is a vector format and is encoded from the layout, not pixels")]
    NotRaster { format: ImageFormat },

    #[error("SVG encoding failed: {0}")]
    Vector(String),

    #[error("Rasterization failed: {0}")]
    Render(#[from] RenderError),

    #[error("Failed to decode image: {0}")]
    Decode(#[source] image::ImageError),
}

/// Encodes a pixel buffer with a raster format.
pub fn encode_pixels(
    buffer: &PixelBuffer,
    format: ImageFormat,
    options: &EncodeOptions,
) -> Result<EncodedImage, EncodingError> {
    if buffer.is_empty() {
        return Err(EncodingError::EmptyCanvas {
            format,
            width: buffer.width(),
            height: buffer.height(),
        });
    }

    let bytes = match format {
        ImageFormat::Png => raster::encode_png(buffer),
        ImageFormat::Jpeg => raster::encode_jpeg(buffer, options),
        ImageFormat::Bmp => raster::encode_bmp(buffer, options),
        ImageFormat::Svg => return Err(EncodingError::NotRaster { format }),
    }
    .map_err(|source| EncodingError::Codec { format, source })?;

    log::debug!(
        "Encoded {}x{} buffer as {} ({} bytes)",
        buffer.width(),
        buffer.height(),
        format,
        bytes.len()
    );

    Ok(EncodedImage::new(format, bytes))
}

/// Encodes a layout with any format.
///
/// The vector format draws the operations as vector primitives; raster
/// formats rasterize first.
pub fn encode_layout(
    layout: &Layout,
    format: ImageFormat,
    options: &EncodeOptions,
) -> Result<EncodedImage, EncodingError> {
    if layout.width == 0 || layout.height == 0 {
        return Err(EncodingError::EmptyCanvas {
            format,
            width: layout.width,
            height: layout.height,
        });
    }

    if format.is_vector() {
        let bytes = svg::encode_svg(layout)?;
        log::debug!("Encoded {} ops as SVG ({} bytes)", layout.ops.len(), bytes.len());
        return Ok(EncodedImage::new(format, bytes));
    }

    let buffer = rasterize(layout)?;
    encode_pixels(&buffer, format, options)
}

/// Decodes raster bytes (any format `image` recognizes) into RGBA pixels.
pub fn decode(bytes: &[u8]) -> Result<PixelBuffer, EncodingError> {
    raster::decode(bytes).map_err(EncodingError::Decode)
}
