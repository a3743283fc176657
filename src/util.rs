//! Utility functions for color parsing and tab expansion.
//!
//! This module provides:
//! - Color name and hex-string parsing shared by the model and config loaders
//! - Tab expansion and leading-whitespace measurement in columns

use crate::draw::{Color, color::*};

// ============================================================================
// Color Parsing
// ============================================================================

/// Maps color name strings to Color values.
///
/// # Supported Names (case-insensitive)
/// - "white", "black", "transparent"
pub fn name_to_color(name: &str) -> Option<Color> {
    match name.to_lowercase().as_str() {
        "white" => Some(WHITE),
        "black" => Some(BLACK),
        "transparent" => Some(TRANSPARENT),
        _ => None,
    }
}

/// Parses `#rgb`, `#rrggbb`, `#rrggbbaa` or a color name.
///
/// # Returns
/// - `Some(Color)` if the string is well-formed
/// - `None` otherwise
pub fn parse_color(raw: &str) -> Option<Color> {
    let trimmed = raw.trim();
    let Some(hex) = trimmed.strip_prefix('#') else {
        return name_to_color(trimmed);
    };

    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let byte = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 => {
            let mut channels = [0u8; 3];
            for (i, c) in hex.chars().enumerate() {
                let v = c.to_digit(16)? as u8;
                channels[i] = v * 17;
            }
            Some(Color::from_rgba8(channels[0], channels[1], channels[2], 255))
        }
        6 => Some(Color::from_rgba8(
            byte(&hex[0..2])?,
            byte(&hex[2..4])?,
            byte(&hex[4..6])?,
            255,
        )),
        8 => Some(Color::from_rgba8(
            byte(&hex[0..2])?,
            byte(&hex[2..4])?,
            byte(&hex[4..6])?,
            byte(&hex[6..8])?,
        )),
        _ => None,
    }
}

// ============================================================================
// Columns
// ============================================================================

/// Expands tabs in `text` to spaces, given the absolute column the text starts at.
///
/// Tab stops fall on multiples of `tab_size`. A `tab_size` of 0 is treated as 1.
pub fn expand_tabs(text: &str, start_column: usize, tab_size: usize) -> String {
    if !text.contains('\t') {
        return text.to_string();
    }

    let tab_size = tab_size.max(1);
    let mut out = String::with_capacity(text.len());
    let mut column = start_column;
    for c in text.chars() {
        if c == '\t' {
            let width = tab_size - column % tab_size;
            out.extend(std::iter::repeat_n(' ', width));
            column += width;
        } else {
            out.push(c);
            column += 1;
        }
    }
    out
}

/// Number of leading whitespace columns in already tab-expanded text.
pub fn leading_whitespace_columns(text: &str) -> usize {
    text.chars().take_while(|c| c.is_whitespace()).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_forms() {
        assert_eq!(parse_color("#fff").unwrap().to_rgba8(), [255, 255, 255, 255]);
        assert_eq!(parse_color("#102030").unwrap().to_rgba8(), [16, 32, 48, 255]);
        assert_eq!(parse_color("#10203040").unwrap().to_rgba8(), [16, 32, 48, 64]);
        assert!(parse_color("#12345").is_none());
        assert!(parse_color("#zzzzzz").is_none());
    }

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!(parse_color("White"), Some(WHITE));
        assert_eq!(parse_color(" black "), Some(BLACK));
        assert!(parse_color("chartreuse").is_none());
    }

    #[test]
    fn expands_tabs_to_next_stop() {
        assert_eq!(expand_tabs("\tx", 0, 4), "    x");
        assert_eq!(expand_tabs("a\tb", 0, 4), "a   b");
        assert_eq!(expand_tabs("\tx", 2, 4), "  x");
        assert_eq!(expand_tabs("no tabs", 3, 4), "no tabs");
    }

    #[test]
    fn counts_leading_whitespace() {
        assert_eq!(leading_whitespace_columns("    let x"), 4);
        assert_eq!(leading_whitespace_columns("x"), 0);
        assert_eq!(leading_whitespace_columns("   "), 3);
    }
}
