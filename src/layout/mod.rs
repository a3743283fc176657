//! Layout of a styled-text model into positioned draw operations.
//!
//! This module turns a [`StyledTextModel`] into a [`Layout`]:
//! - leading indentation common to all lines is optionally chopped
//! - every segment is measured with a [`TextMeasurer`]
//! - an optional line-number gutter is placed left of the text
//! - geometry is scaled once at the end, then offset by the padding
//! - background runs, glyph runs and caret marks are emitted in paint order

mod indent;
pub mod measure;

pub use measure::{FontMetrics, PangoMeasurer, TextMeasurer};

use crate::config::RenderOptions;
use crate::draw::{Color, FontDescriptor};
use crate::model::{MAX_COLUMN, ModelLine, StyledTextModel};
use indent::LinePieces;

/// Caret bar width in unscaled pixels.
pub const CARET_WIDTH: f64 = 2.0;

/// Axis-aligned rectangle in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Kind of a draw operation, in paint order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DrawKind {
    Background,
    GlyphRun,
    Caret,
}

/// A positioned draw operation. All geometry is post-scale and post-padding.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Filled rectangle behind text.
    Background { rect: Rect, color: Color },
    /// Text drawn with its layout box's top-left corner at (`x`, `y`).
    GlyphRun {
        x: f64,
        y: f64,
        advance: f64,
        text: String,
        /// Font with its size already scaled.
        font: FontDescriptor,
        color: Color,
    },
    /// Vertical caret bar.
    Caret { rect: Rect, color: Color },
}

impl DrawOp {
    pub fn kind(&self) -> DrawKind {
        match self {
            DrawOp::Background { .. } => DrawKind::Background,
            DrawOp::GlyphRun { .. } => DrawKind::GlyphRun,
            DrawOp::Caret { .. } => DrawKind::Caret,
        }
    }
}

/// Fully measured selection, ready for painting.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    /// Canvas width in pixels, padding included.
    pub width: u32,
    /// Canvas height in pixels, padding included.
    pub height: u32,
    /// Scaled content box, offset by the padding.
    pub content: Rect,
    pub line_count: usize,
    pub ops: Vec<DrawOp>,
}

impl Layout {
    /// Canvas area, used by callers for large-image checks.
    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn count(&self, kind: DrawKind) -> usize {
        self.ops.iter().filter(|op| op.kind() == kind).count()
    }
}

/// A measured piece of a line, in unscaled content coordinates.
struct Placed<'a> {
    x: f64,
    advance: f64,
    text: String,
    font: &'a FontDescriptor,
    foreground: Option<Color>,
    background: Option<Color>,
}

struct PlacedLine<'a> {
    index: usize,
    top: f64,
    ascent: f64,
    height: f64,
    end_x: f64,
    columns: usize,
    pieces: Vec<Placed<'a>>,
}

/// Right-aligned line-number labels in a column left of the text.
struct Gutter {
    width: f64,
    /// Per model line: unscaled x and text of the label.
    labels: Vec<(f64, String)>,
}

/// Measures and arranges styled text. Pure: no I/O, no shared state.
pub struct LayoutEngine<M> {
    measurer: M,
}

impl LayoutEngine<PangoMeasurer> {
    /// Layout engine measuring with the system fonts through Pango.
    pub fn with_pango() -> Result<Self, cairo::Error> {
        Ok(Self::new(PangoMeasurer::new()?))
    }
}

impl<M: TextMeasurer> LayoutEngine<M> {
    pub fn new(measurer: M) -> Self {
        Self { measurer }
    }

    pub fn measurer(&self) -> &M {
        &self.measurer
    }

    /// Lays out `model` according to `options`.
    ///
    /// An empty model yields a `2 * padding` square canvas with no operations.
    pub fn layout(&self, model: &StyledTextModel, options: &RenderOptions) -> Layout {
        let padding = options.padding;
        let model_lines = model.lines();
        if model_lines.is_empty() {
            let side = padding.saturating_mul(2);
            return Layout {
                width: side,
                height: side,
                content: Rect::new(padding as f64, padding as f64, 0.0, 0.0),
                line_count: 0,
                ops: Vec::new(),
            };
        }

        let mut lines: Vec<LinePieces<'_>> = model_lines
            .iter()
            .map(|line| indent::split_line(model, line))
            .collect();

        let chop = if options.chop_indentation {
            indent::min_indent(&lines)
        } else {
            0
        };
        log::debug!(
            "Laying out {} lines (chop {} columns, scale {})",
            lines.len(),
            chop,
            options.scale
        );

        let gutter = options
            .show_line_numbers
            .then(|| self.gutter(model, &model_lines));
        let text_x = gutter.as_ref().map_or(0.0, |g| g.width);

        let mut placed = Vec::with_capacity(lines.len());
        let mut top = 0.0;
        let mut content_width: f64 = 0.0;
        for (model_line, pieces) in model_lines.iter().zip(lines.iter_mut()) {
            indent::chop(pieces, chop);

            let mut fonts: Vec<&FontDescriptor> =
                model_line.segments.iter().map(|s| &s.font).collect();
            if fonts.is_empty() || gutter.is_some() {
                fonts.push(&model.default_font);
            }
            let (ascent, descent) = fonts.iter().fold((0.0_f64, 0.0_f64), |(a, d), font| {
                let metrics = self.measurer.metrics(font);
                (a.max(metrics.ascent), d.max(metrics.descent))
            });

            let mut x = text_x;
            let mut out = Vec::with_capacity(pieces.pieces.len());
            for piece in &pieces.pieces {
                let advance = self.measurer.advance(piece.font, &piece.text);
                out.push(Placed {
                    x,
                    advance,
                    text: piece.text.clone(),
                    font: piece.font,
                    foreground: piece.foreground,
                    background: piece.background,
                });
                x += advance;
            }
            content_width = content_width.max(x);

            placed.push(PlacedLine {
                index: model_line.index,
                top,
                ascent,
                height: ascent + descent,
                end_x: x,
                columns: pieces.columns(),
                pieces: out,
            });
            top += ascent + descent;
        }
        let content_height = top;

        let scale = options.scale;
        let offset = padding as f64;
        let at = |v: f64| v * scale + offset;

        let width = ceil_px(content_width * scale).saturating_add(padding.saturating_mul(2));
        let height = ceil_px(content_height * scale).saturating_add(padding.saturating_mul(2));

        let mut backgrounds = Vec::new();
        let mut glyphs = Vec::new();
        let mut carets = Vec::new();

        if let Some(color) = model.background {
            backgrounds.push(DrawOp::Background {
                rect: Rect::new(0.0, 0.0, width as f64, height as f64),
                color,
            });
        }

        if let Some(gutter) = &gutter {
            if let Some(color) = model.gutter_background {
                backgrounds.push(DrawOp::Background {
                    rect: Rect::new(
                        at(0.0),
                        at(0.0),
                        gutter.width * scale,
                        content_height * scale,
                    ),
                    color,
                });
            }

            let metrics = self.measurer.metrics(&model.default_font);
            for (line, (x, label)) in placed.iter().zip(&gutter.labels) {
                glyphs.push(DrawOp::GlyphRun {
                    x: at(*x),
                    y: at(line.top + line.ascent - metrics.ascent),
                    advance: self.measurer.advance(&model.default_font, label) * scale,
                    text: label.clone(),
                    font: model.default_font.scaled(scale),
                    color: model.line_number_color,
                });
            }
        }

        for line in &placed {
            // One rectangle per run of identical background color.
            let mut run: Option<(f64, f64, Color)> = None;
            for piece in &line.pieces {
                match (run, piece.background) {
                    (Some((start, end, color)), Some(bg)) if bg == color => {
                        run = Some((start, end + piece.advance, color));
                    }
                    (current, bg) => {
                        if let Some((start, end, color)) = current {
                            backgrounds.push(background_op(line, start, end, color, &at, scale));
                        }
                        run = bg
                            .filter(|_| piece.advance > 0.0)
                            .map(|bg| (piece.x, piece.x + piece.advance, bg));
                    }
                }
            }
            if let Some((start, end, color)) = run {
                backgrounds.push(background_op(line, start, end, color, &at, scale));
            }

            for piece in &line.pieces {
                let Some(color) = piece.foreground else {
                    continue;
                };
                if piece.text.trim().is_empty() {
                    continue;
                }
                let metrics = self.measurer.metrics(piece.font);
                glyphs.push(DrawOp::GlyphRun {
                    x: at(piece.x),
                    y: at(line.top + line.ascent - metrics.ascent),
                    advance: piece.advance * scale,
                    text: piece.text.clone(),
                    font: piece.font.scaled(scale),
                    color,
                });
            }
        }

        if options.remove_caret {
            log::debug!("Omitting {} caret markers", model.carets.len());
        } else {
            for caret in model.carets.iter().filter(|c| c.visible) {
                let Some(line) = placed.iter().find(|l| l.index == caret.line) else {
                    log::debug!("Caret on line {} is outside the selection", caret.line);
                    continue;
                };
                let column = caret.column.min(MAX_COLUMN).saturating_sub(chop);
                let x = self.caret_x(model, line, column);
                carets.push(DrawOp::Caret {
                    rect: Rect::new(at(x), at(line.top), CARET_WIDTH * scale, line.height * scale),
                    color: model.caret_color,
                });
            }
        }

        let mut ops = backgrounds;
        ops.append(&mut glyphs);
        ops.append(&mut carets);

        Layout {
            width,
            height,
            content: Rect::new(
                offset,
                offset,
                content_width * scale,
                content_height * scale,
            ),
            line_count: placed.len(),
            ops,
        }
    }

    /// Labels `first_line_number + index` for every line, padded by one
    /// default-font space on each side.
    fn gutter(&self, model: &StyledTextModel, lines: &[ModelLine<'_>]) -> Gutter {
        let font = &model.default_font;
        let space = self.measurer.advance(font, " ");
        let measured: Vec<(f64, String)> = lines
            .iter()
            .map(|line| {
                let label = model.first_line_number.saturating_add(line.index).to_string();
                (self.measurer.advance(font, &label), label)
            })
            .collect();
        let widest = measured.iter().fold(0.0_f64, |w, (advance, _)| w.max(*advance));

        Gutter {
            width: widest + 2.0 * space,
            labels: measured
                .into_iter()
                .map(|(advance, label)| (space + widest - advance, label))
                .collect(),
        }
    }

    /// Unscaled x of a post-chop column on a placed line.
    fn caret_x(&self, model: &StyledTextModel, line: &PlacedLine<'_>, column: usize) -> f64 {
        if column >= line.columns {
            let space = self.measurer.advance(&model.default_font, " ");
            return line.end_x + space * (column - line.columns) as f64;
        }

        let mut start = 0;
        for piece in &line.pieces {
            let len = piece.text.chars().count();
            if column < start + len {
                let prefix: String = piece.text.chars().take(column - start).collect();
                return piece.x + self.measurer.advance(piece.font, &prefix);
            }
            start += len;
        }
        line.end_x
    }
}

fn background_op(
    line: &PlacedLine<'_>,
    start: f64,
    end: f64,
    color: Color,
    at: &impl Fn(f64) -> f64,
    scale: f64,
) -> DrawOp {
    DrawOp::Background {
        rect: Rect::new(
            at(start),
            at(line.top),
            (end - start) * scale,
            line.height * scale,
        ),
        color,
    }
}

/// Rounds a pixel extent up, ignoring floating-point noise below 1e-6.
fn ceil_px(value: f64) -> u32 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    (value - 1e-6).ceil().max(0.0) as u32
}
