//! Straight-alpha RGBA pixel buffer.

use super::color::Color;

/// `width x height` grid of RGBA8 pixels (straight alpha, row-major).
///
/// Always carries an alpha channel; codecs without alpha flatten it with
/// [`PixelBuffer::to_rgb_over`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Fully transparent buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * 4],
        }
    }

    /// Wraps raw RGBA bytes; `None` if the length does not match.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        (data.len() == width as usize * height as usize * 4).then_some(Self {
            width,
            height,
            data,
        })
    }

    /// Converts Cairo's premultiplied native-endian ARGB32 rows.
    pub fn from_cairo_argb32(width: u32, height: u32, stride: usize, data: &[u8]) -> Self {
        let mut out = Vec::with_capacity(width as usize * height as usize * 4);
        for row in 0..height as usize {
            let start = row * stride;
            let row_bytes = &data[start..start + width as usize * 4];
            for px in row_bytes.chunks_exact(4) {
                let argb = u32::from_ne_bytes([px[0], px[1], px[2], px[3]]);
                let a = (argb >> 24) & 0xff;
                let unpremultiply = |c: u32| -> u8 {
                    if a == 0 {
                        0
                    } else {
                        ((c * 255 + a / 2) / a).min(255) as u8
                    }
                };
                out.extend_from_slice(&[
                    unpremultiply((argb >> 16) & 0xff),
                    unpremultiply((argb >> 8) & 0xff),
                    unpremultiply(argb & 0xff),
                    a as u8,
                ]);
            }
        }
        Self {
            width,
            height,
            data: out,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn as_rgba(&self) -> &[u8] {
        &self.data
    }

    pub fn into_rgba(self) -> Vec<u8> {
        self.data
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    /// Composites every pixel over an opaque `background`, returning RGB8.
    pub fn to_rgb_over(&self, background: Color) -> Vec<u8> {
        let [br, bg, bb, _] = background.to_rgba8();
        let mut out = Vec::with_capacity(self.width as usize * self.height as usize * 3);
        for px in self.data.chunks_exact(4) {
            let a = px[3] as u32;
            let blend = |c: u8, b: u8| ((c as u32 * a + b as u32 * (255 - a) + 127) / 255) as u8;
            out.extend_from_slice(&[blend(px[0], br), blend(px[1], bg), blend(px[2], bb)]);
        }
        out
    }
}
