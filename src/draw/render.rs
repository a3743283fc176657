//! Cairo-based painting of layout draw operations.
//!
//! The same painter drives both the raster surface and the SVG surface, so
//! raster and vector output come from one code path.

use super::color::Color;
use super::font::FontDescriptor;
use crate::layout::{DrawOp, Rect};

/// Renders all operations to a Cairo context.
///
/// Operations are drawn in the order they appear (first operation = bottom
/// layer), so later entries composite over earlier ones.
pub fn render_ops(ctx: &cairo::Context, ops: &[DrawOp]) {
    for op in ops {
        render_op(ctx, op);
    }
}

/// Renders a single draw operation.
pub fn render_op(ctx: &cairo::Context, op: &DrawOp) {
    match op {
        DrawOp::Background { rect, color } | DrawOp::Caret { rect, color } => {
            fill_rect(ctx, rect, *color);
        }
        DrawOp::GlyphRun {
            x,
            y,
            text,
            font,
            color,
            ..
        } => {
            render_glyph_run(ctx, *x, *y, text, font, *color);
        }
    }
}

fn fill_rect(ctx: &cairo::Context, rect: &Rect, color: Color) {
    if rect.width <= 0.0 || rect.height <= 0.0 {
        return;
    }
    ctx.set_source_rgba(color.r, color.g, color.b, color.a);
    ctx.rectangle(rect.x, rect.y, rect.width, rect.height);
    let _ = ctx.fill();
}

/// Renders one run of text with Pango, layout box top-left at (`x`, `y`).
///
/// The font is used exactly as given; Pango's own font resolution is the
/// only fallback.
pub fn render_glyph_run(
    ctx: &cairo::Context,
    x: f64,
    y: f64,
    text: &str,
    font: &FontDescriptor,
    color: Color,
) {
    // Save context state to prevent settings from leaking to other drawing operations
    ctx.save().ok();

    // Gray antialiasing: subpixel AA would bake color fringes into the image
    ctx.set_antialias(cairo::Antialias::Gray);

    let layout = pangocairo::functions::create_layout(ctx);
    layout.set_font_description(Some(&font.to_pango()));
    layout.set_text(text);

    ctx.set_source_rgba(color.r, color.g, color.b, color.a);
    ctx.move_to(x, y);
    pangocairo::functions::show_layout(ctx, &layout);

    ctx.restore().ok();
}
