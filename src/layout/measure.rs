//! Text measurement backends.

use crate::draw::FontDescriptor;

/// Vertical metrics of a font, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontMetrics {
    /// Distance from the top of the line box to the baseline.
    pub ascent: f64,
    /// Distance from the baseline to the bottom of the line box.
    pub descent: f64,
}

impl FontMetrics {
    pub fn height(&self) -> f64 {
        self.ascent + self.descent
    }
}

/// Resolves a font descriptor to advance widths and line metrics.
pub trait TextMeasurer {
    /// Horizontal advance of `text` set in `font`, including trailing spaces.
    fn advance(&self, font: &FontDescriptor, text: &str) -> f64;

    fn metrics(&self, font: &FontDescriptor) -> FontMetrics;
}

/// Measures text with Pango on a throwaway 1x1 Cairo surface.
///
/// Uses the same font resolution as the painter, so measured advances match
/// what gets drawn.
pub struct PangoMeasurer {
    ctx: cairo::Context,
}

impl PangoMeasurer {
    pub fn new() -> Result<Self, cairo::Error> {
        let surface = cairo::ImageSurface::create(cairo::Format::ARgb32, 1, 1)?;
        let ctx = cairo::Context::new(&surface)?;
        ctx.set_antialias(cairo::Antialias::Best);
        Ok(Self { ctx })
    }

    fn layout_for(&self, font: &FontDescriptor, text: &str) -> pango::Layout {
        let layout = pangocairo::functions::create_layout(&self.ctx);
        layout.set_font_description(Some(&font.to_pango()));
        layout.set_text(text);
        layout
    }
}

impl TextMeasurer for PangoMeasurer {
    fn advance(&self, font: &FontDescriptor, text: &str) -> f64 {
        if text.is_empty() {
            return 0.0;
        }
        let (_ink, logical) = self.layout_for(font, text).extents();
        logical.width() as f64 / pango::SCALE as f64
    }

    fn metrics(&self, font: &FontDescriptor) -> FontMetrics {
        let layout = self.layout_for(font, "M");
        let (_ink, logical) = layout.extents();
        let height = logical.height() as f64 / pango::SCALE as f64;
        let ascent = layout.baseline() as f64 / pango::SCALE as f64;
        FontMetrics {
            ascent,
            descent: (height - ascent).max(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pango_advance_grows_with_text() {
        let measurer = PangoMeasurer::new().unwrap();
        let font = FontDescriptor::new("Monospace", 20.0, false, false);
        let one = measurer.advance(&font, "x");
        let three = measurer.advance(&font, "xxx");
        assert!(one > 0.0);
        assert!(three > one);
        assert_eq!(measurer.advance(&font, ""), 0.0);
    }

    #[test]
    fn pango_metrics_are_positive() {
        let measurer = PangoMeasurer::new().unwrap();
        let metrics = measurer.metrics(&FontDescriptor::new("Monospace", 20.0, false, false));
        assert!(metrics.ascent > 0.0);
        assert!(metrics.height() >= metrics.ascent);
    }
}
