//! Multi-representation result of one rendered selection.
//!
//! A [`TransferPackage`] decides at construction which representations it can
//! offer. The clipboard glue in [`crate::shot::clipboard`] maps them onto MIME
//! flavors; the file saver only ever needs [`TransferPackage::as_bytes`].

use crate::codec::{self, EncodeOptions, EncodedImage, EncodingError, ImageFormat};
use crate::draw::{PixelBuffer, rasterize};
use crate::layout::Layout;
use std::path::{Path, PathBuf};

/// An in-memory image ready for image-consuming clipboard targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeImage<'a> {
    pub width: u32,
    pub height: u32,
    /// Straight-alpha RGBA, row-major, no padding.
    pub rgba: &'a [u8],
}

/// Encoded bytes plus the naming information needed to store them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilePayload<'a> {
    pub bytes: &'a [u8],
    pub extension: &'static str,
    pub mime_type: &'static str,
}

/// A representation a [`TransferPackage`] can be read as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Representation {
    /// Decoded pixels, only for raster formats.
    NativeImage,
    /// The chosen format's encoding, tagged with its MIME type.
    Encoded(&'static str),
    /// A reference to a file holding the encoded bytes.
    FileList,
}

#[derive(Debug, Clone)]
pub struct TransferPackage {
    encoded: EncodedImage,
    pixels: Option<PixelBuffer>,
    file: Option<PathBuf>,
    representations: Vec<Representation>,
}

impl TransferPackage {
    pub fn new(encoded: EncodedImage, pixels: Option<PixelBuffer>) -> Self {
        let mut representations = Vec::with_capacity(3);
        if pixels.is_some() {
            representations.push(Representation::NativeImage);
        }
        representations.push(Representation::Encoded(encoded.mime_type()));

        Self {
            encoded,
            pixels,
            file: None,
            representations,
        }
    }

    /// Renders and encodes `layout`, keeping the pixels for raster formats.
    pub fn render(
        layout: &Layout,
        format: ImageFormat,
        options: &EncodeOptions,
    ) -> Result<Self, EncodingError> {
        if format.is_vector() {
            let encoded = codec::encode_layout(layout, format, options)?;
            return Ok(Self::new(encoded, None));
        }

        let pixels = rasterize(layout)?;
        let encoded = codec::encode_pixels(&pixels, format, options)?;
        Ok(Self::new(encoded, Some(pixels)))
    }

    /// Attaches a file that holds exactly [`Self::as_bytes`].
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        if self.file.is_none() {
            self.representations.push(Representation::FileList);
        }
        self.file = Some(path.into());
        self
    }

    pub fn representations(&self) -> &[Representation] {
        &self.representations
    }

    pub fn format(&self) -> ImageFormat {
        self.encoded.format()
    }

    pub fn encoded(&self) -> &EncodedImage {
        &self.encoded
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    pub fn as_native_image(&self) -> Option<NativeImage<'_>> {
        self.pixels.as_ref().map(|pixels| NativeImage {
            width: pixels.width(),
            height: pixels.height(),
            rgba: pixels.as_rgba(),
        })
    }

    pub fn as_bytes(&self) -> FilePayload<'_> {
        FilePayload {
            bytes: self.encoded.bytes(),
            extension: self.encoded.extension(),
            mime_type: self.encoded.mime_type(),
        }
    }
}
