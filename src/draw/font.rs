//! Font descriptor for text rendering.

use serde::{Deserialize, Serialize};

/// Font configuration for a run of text.
///
/// Describes which font to use, including family name, pixel size, and style
/// bits. This descriptor travels from the styled-text model through layout
/// into the painter so measurement and drawing resolve the same face.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontDescriptor {
    /// Font family name (e.g., "Monospace", "JetBrains Mono")
    pub family: String,

    /// Font size in pixels
    pub size: f64,

    #[serde(default)]
    pub bold: bool,

    #[serde(default)]
    pub italic: bool,
}

impl FontDescriptor {
    /// Creates a new font descriptor with the specified parameters.
    pub fn new(family: impl Into<String>, size: f64, bold: bool, italic: bool) -> Self {
        Self {
            family: family.into(),
            size,
            bold,
            italic,
        }
    }

    /// Returns a copy of this descriptor with the size multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            size: self.size * factor,
            ..self.clone()
        }
    }

    /// Converts this font descriptor to a Pango font description string.
    ///
    /// The size is left out; it is applied as an absolute pixel size by
    /// [`FontDescriptor::to_pango`].
    ///
    /// Example: "JetBrains Mono Bold Italic"
    pub fn to_pango_string(&self) -> String {
        let mut parts = vec![self.family.clone()];

        if self.bold {
            parts.push("Bold".to_string());
        }

        if self.italic {
            parts.push("Italic".to_string());
        }

        parts.join(" ")
    }

    /// Builds the Pango font description with an absolute pixel size.
    pub fn to_pango(&self) -> pango::FontDescription {
        let mut desc = pango::FontDescription::from_string(&self.to_pango_string());
        desc.set_absolute_size(self.size * pango::SCALE as f64);
        desc
    }
}

impl Default for FontDescriptor {
    fn default() -> Self {
        Self {
            family: "Monospace".to_string(),
            size: 14.0,
            bold: false,
            italic: false,
        }
    }
}
