//! SVG encoding through Cairo's SVG surface.
//!
//! Draw operations are replayed with the same painter as the rasterizer;
//! Cairo emits rectangles as paths and glyphs as outline symbols.

use super::EncodingError;
use crate::draw::render_ops;
use crate::layout::Layout;

pub(super) fn encode_svg(layout: &Layout) -> Result<Vec<u8>, EncodingError> {
    let vector_err = |e: cairo::Error| EncodingError::Vector(e.to_string());

    let surface =
        cairo::SvgSurface::for_stream(layout.width as f64, layout.height as f64, Vec::<u8>::new())
            .map_err(vector_err)?;
    {
        let ctx = cairo::Context::new(&surface).map_err(vector_err)?;
        render_ops(&ctx, &layout.ops);
        ctx.status().map_err(vector_err)?;
    }

    let stream = surface
        .finish_output_stream()
        .map_err(|e| EncodingError::Vector(e.to_string()))?;

    stream
        .downcast::<Vec<u8>>()
        .map(|bytes| *bytes)
        .map_err(|_| EncodingError::Vector("SVG surface returned an unexpected stream".to_string()))
}
