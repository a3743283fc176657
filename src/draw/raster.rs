//! Rasterization of a [`Layout`] into a [`PixelBuffer`].

use super::pixels::PixelBuffer;
use super::render::render_ops;
use crate::layout::Layout;
use thiserror::Error;

/// Errors raised while painting a layout.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Canvas {width}x{height} exceeds the surface size limit")]
    TooLarge { width: u32, height: u32 },

    #[error("Cairo error: {0}")]
    Cairo(#[from] cairo::Error),

    #[error("Failed to read surface pixels: {0}")]
    SurfaceData(#[from] cairo::BorrowError),
}

/// Paints `layout` into a new buffer of exactly `layout.width x layout.height`.
///
/// Pixels not covered by any operation stay transparent.
pub fn rasterize(layout: &Layout) -> Result<PixelBuffer, RenderError> {
    if layout.width == 0 || layout.height == 0 {
        return Ok(PixelBuffer::new(layout.width, layout.height));
    }

    let too_large = || RenderError::TooLarge {
        width: layout.width,
        height: layout.height,
    };
    let width = i32::try_from(layout.width).map_err(|_| too_large())?;
    let height = i32::try_from(layout.height).map_err(|_| too_large())?;

    let mut surface = cairo::ImageSurface::create(cairo::Format::ARgb32, width, height)?;
    {
        let ctx = cairo::Context::new(&surface)?;
        render_ops(&ctx, &layout.ops);
        ctx.status()?;
    }
    surface.flush();

    let stride = surface.stride() as usize;
    let data = surface.data()?;
    let buffer = PixelBuffer::from_cairo_argb32(layout.width, layout.height, stride, &data);

    log::debug!(
        "Rasterized {} ops into {}x{} buffer",
        layout.ops.len(),
        layout.width,
        layout.height
    );

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::color::{BLACK, WHITE};
    use crate::draw::{Color, FontDescriptor};
    use crate::layout::{DrawOp, Rect};

    fn layout(width: u32, height: u32, ops: Vec<DrawOp>) -> Layout {
        Layout {
            width,
            height,
            content: Rect::new(0.0, 0.0, width as f64, height as f64),
            line_count: 1,
            ops,
        }
    }

    #[test]
    fn buffer_matches_canvas_and_starts_transparent() {
        let buffer = rasterize(&layout(7, 3, vec![])).unwrap();
        assert_eq!((buffer.width(), buffer.height()), (7, 3));
        assert!(buffer.as_rgba().iter().all(|b| *b == 0));
    }

    #[test]
    fn zero_sized_canvas_is_empty_buffer() {
        let buffer = rasterize(&layout(0, 0, vec![])).unwrap();
        assert!(buffer.is_empty());
    }

    #[test]
    fn backgrounds_fill_only_their_rect() {
        let red = Color::new(1.0, 0.0, 0.0, 1.0);
        let buffer = rasterize(&layout(
            10,
            10,
            vec![DrawOp::Background {
                rect: Rect::new(0.0, 0.0, 5.0, 10.0),
                color: red,
            }],
        ))
        .unwrap();
        assert_eq!(buffer.pixel(2, 5), Some([255, 0, 0, 255]));
        assert_eq!(buffer.pixel(7, 5), Some([0, 0, 0, 0]));
    }

    #[test]
    fn later_ops_paint_over_earlier_ones() {
        let buffer = rasterize(&layout(
            10,
            10,
            vec![
                DrawOp::Background {
                    rect: Rect::new(0.0, 0.0, 10.0, 10.0),
                    color: WHITE,
                },
                DrawOp::Caret {
                    rect: Rect::new(4.0, 0.0, 2.0, 10.0),
                    color: BLACK,
                },
            ],
        ))
        .unwrap();
        assert_eq!(buffer.pixel(4, 5), Some([0, 0, 0, 255]));
        assert_eq!(buffer.pixel(0, 5), Some([255, 255, 255, 255]));
    }

    #[test]
    fn glyph_runs_paint_pixels() {
        let buffer = rasterize(&layout(
            60,
            40,
            vec![DrawOp::GlyphRun {
                x: 2.0,
                y: 2.0,
                advance: 40.0,
                text: "Wm#".to_string(),
                font: FontDescriptor::new("Monospace", 24.0, true, false),
                color: BLACK,
            }],
        ))
        .unwrap();
        assert!(buffer.as_rgba().chunks_exact(4).any(|px| px[3] != 0));
    }
}
