//! Configuration enum types.

use crate::draw::Color;
use log::warn;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Color specification - either a color string or RGB values.
///
/// # Examples
/// ```toml
/// # Named or hex color
/// opaque_background = "white"
/// opaque_background = "#1e1e1e"
///
/// # Custom RGB color (0-255 per component)
/// opaque_background = [30, 30, 30]
/// ```
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
#[serde(untagged)]
pub enum ColorSpec {
    /// Named color (white, black, transparent) or `#rgb`, `#rrggbb`, `#rrggbbaa`
    Name(String),
    /// RGB color as [red, green, blue] where each component is 0-255
    Rgb([u8; 3]),
}

impl ColorSpec {
    /// Converts the color specification to a [`Color`] struct.
    ///
    /// Unparseable strings resolve to `fallback` with a warning. RGB arrays
    /// are always fully opaque.
    pub fn to_color(&self, fallback: Color) -> Color {
        match self {
            ColorSpec::Name(name) => crate::util::parse_color(name).unwrap_or_else(|| {
                warn!("Unknown color '{}', using {}", name, fallback.to_hex());
                fallback
            }),
            ColorSpec::Rgb([r, g, b]) => Color::from_rgba8(*r, *g, *b, 255),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::color::{BLACK, WHITE};

    #[test]
    fn color_spec_forms() {
        assert_eq!(ColorSpec::Name("black".into()).to_color(WHITE), BLACK);
        assert_eq!(
            ColorSpec::Name("#ff000080".into()).to_color(WHITE).to_rgba8(),
            [255, 0, 0, 128]
        );
        assert_eq!(ColorSpec::Rgb([0, 0, 0]).to_color(WHITE), BLACK);
        assert_eq!(ColorSpec::Name("mauve-ish".into()).to_color(WHITE), WHITE);
    }
}
