//! Styled-text model describing an editor selection.
//!
//! This module defines the input to the rendering pipeline:
//! - [`TextSegment`]: a run of text sharing one font and color set
//! - [`CaretMarker`]: a caret position captured with the selection
//! - [`StyledTextModel`]: the ordered segments plus model-wide defaults
//! - [`StyleSource`] / [`ModelBuilder`]: the narrow interface an editor
//!   implements to produce a model

pub mod builder;

pub use builder::{ModelBuilder, StyleSource, TextStyle, UniformStyle};

use crate::draw::{Color, FontDescriptor, color::BLACK};
use crate::util;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use thiserror::Error;

/// Highest visual column a segment or caret may reach.
pub const MAX_COLUMN: usize = 100_000;

/// Most lines a selection may span, blank lines included.
pub const MAX_LINE_SPAN: usize = 100_000;

/// A run of text on one line with uniform visual attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSegment {
    /// Text content; never contains a line break. Tabs are allowed.
    pub text: String,
    pub font: FontDescriptor,
    pub foreground: Color,
    #[serde(default)]
    pub background: Option<Color>,
    /// Zero-based line index within the selection.
    pub line: usize,
    /// Visual columns covered, after tab expansion.
    pub columns: Range<usize>,
}

/// A caret position captured at selection time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CaretMarker {
    pub line: usize,
    pub column: usize,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

impl CaretMarker {
    pub fn new(line: usize, column: usize) -> Self {
        Self {
            line,
            column,
            visible: true,
        }
    }
}

/// Ordered, attributed representation of a text selection.
///
/// Segment order is rendering order: top-to-bottom, then left-to-right.
/// On each line the first segment's start column is where the selection
/// begins visually; every later segment on that line starts where the
/// previous one ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyledTextModel {
    pub segments: Vec<TextSegment>,

    #[serde(default)]
    pub carets: Vec<CaretMarker>,

    #[serde(default = "default_tab_size")]
    pub tab_size: usize,

    /// Font used for lines without segments and for implicit leading columns.
    #[serde(default)]
    pub default_font: FontDescriptor,

    #[serde(default = "default_caret_color")]
    pub caret_color: Color,

    /// Editor canvas color; covers the whole image when set.
    #[serde(default)]
    pub background: Option<Color>,

    /// Editor line number of the selection's line 0, shown in the gutter.
    #[serde(default = "default_first_line_number")]
    pub first_line_number: usize,

    #[serde(default = "default_line_number_color")]
    pub line_number_color: Color,

    /// Gutter fill behind line numbers; the canvas shows through when unset.
    #[serde(default)]
    pub gutter_background: Option<Color>,
}

impl Default for StyledTextModel {
    fn default() -> Self {
        Self {
            segments: Vec::new(),
            carets: Vec::new(),
            tab_size: default_tab_size(),
            default_font: FontDescriptor::default(),
            caret_color: default_caret_color(),
            background: None,
            first_line_number: default_first_line_number(),
            line_number_color: default_line_number_color(),
            gutter_background: None,
        }
    }
}

/// Errors for selections that cannot be rendered.
#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("Selection is empty")]
    EmptySelection,

    #[error("Segment {index} on line {line} is out of order")]
    OutOfOrder { index: usize, line: usize },

    #[error("Segment on line {line} starts at column {found}, expected {expected}")]
    NonContiguous {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("Segment on line {line} spans columns {start}..{end} but its text is {width} columns wide")]
    ColumnMismatch {
        line: usize,
        start: usize,
        end: usize,
        width: usize,
    },

    #[error("Segment on line {line} contains a line break")]
    LineBreakInSegment { line: usize },

    #[error("Segment on line {line} has invalid font size {size}")]
    InvalidFontSize { line: usize, size: f64 },

    #[error("Column {column} on line {line} is beyond the last supported column ({MAX_COLUMN})")]
    ColumnOutOfRange { line: usize, column: usize },

    #[error("Selection spans lines {first}..={last}, more than {MAX_LINE_SPAN} lines")]
    TooManyLines { first: usize, last: usize },
}

/// Segments of one line, borrowed from the model.
#[derive(Debug, Clone)]
pub struct ModelLine<'a> {
    pub index: usize,
    pub segments: Vec<&'a TextSegment>,
}

impl ModelLine<'_> {
    /// Column where the selection begins on this line.
    pub fn start_column(&self) -> usize {
        self.segments.first().map(|s| s.columns.start).unwrap_or(0)
    }
}

impl StyledTextModel {
    /// True when there is nothing to render.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Checks the structural rules documented on [`StyledTextModel`].
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.is_empty() {
            return Err(ModelError::EmptySelection);
        }

        let mut previous: Option<&TextSegment> = None;
        for (index, segment) in self.segments.iter().enumerate() {
            let line = segment.line;

            if segment.text.contains(['\n', '\r']) {
                return Err(ModelError::LineBreakInSegment { line });
            }

            if !(segment.font.size.is_finite() && segment.font.size > 0.0) {
                return Err(ModelError::InvalidFontSize {
                    line,
                    size: segment.font.size,
                });
            }

            if segment.columns.start > MAX_COLUMN || segment.columns.end > MAX_COLUMN {
                return Err(ModelError::ColumnOutOfRange {
                    line,
                    column: segment.columns.start.max(segment.columns.end),
                });
            }

            let width =
                util::expand_tabs(&segment.text, segment.columns.start, self.tab_size)
                    .chars()
                    .count();
            if segment.columns.end < segment.columns.start
                || segment.columns.end - segment.columns.start != width
            {
                return Err(ModelError::ColumnMismatch {
                    line,
                    start: segment.columns.start,
                    end: segment.columns.end,
                    width,
                });
            }

            if let Some(prev) = previous {
                if line < prev.line {
                    return Err(ModelError::OutOfOrder { index, line });
                }
                if line == prev.line && segment.columns.start != prev.columns.end {
                    return Err(ModelError::NonContiguous {
                        line,
                        expected: prev.columns.end,
                        found: segment.columns.start,
                    });
                }
            }
            previous = Some(segment);
        }

        if let (Some(first), Some(last)) = (self.segments.first(), self.segments.last())
            && last.line - first.line >= MAX_LINE_SPAN
        {
            return Err(ModelError::TooManyLines {
                first: first.line,
                last: last.line,
            });
        }

        if let Some(caret) = self.carets.iter().find(|c| c.column > MAX_COLUMN) {
            return Err(ModelError::ColumnOutOfRange {
                line: caret.line,
                column: caret.column,
            });
        }

        Ok(())
    }

    /// Groups segments by line, from the first to the last line index.
    ///
    /// Line indices without segments between two populated lines yield empty
    /// lines so vertical extent matches the selection. At most
    /// [`MAX_LINE_SPAN`] empty lines are inserted per gap. Segments that go
    /// back to an earlier line are skipped.
    pub fn lines(&self) -> Vec<ModelLine<'_>> {
        let mut lines: Vec<ModelLine<'_>> = Vec::new();

        for segment in &self.segments {
            match lines.last().map(|line| line.index) {
                Some(index) if index == segment.line => {
                    if let Some(current) = lines.last_mut() {
                        current.segments.push(segment);
                    }
                }
                Some(index) if index > segment.line => {
                    log::debug!("Skipping out-of-order segment on line {}", segment.line);
                }
                previous => {
                    if let Some(index) = previous {
                        let blanks = (segment.line - index - 1).min(MAX_LINE_SPAN);
                        lines.extend((1..=blanks).map(|offset| ModelLine {
                            index: index + offset,
                            segments: Vec::new(),
                        }));
                    }
                    lines.push(ModelLine {
                        index: segment.line,
                        segments: vec![segment],
                    });
                }
            }
        }

        lines
    }
}

fn default_visible() -> bool {
    true
}

fn default_tab_size() -> usize {
    4
}

fn default_caret_color() -> Color {
    BLACK
}

fn default_first_line_number() -> usize {
    1
}

fn default_line_number_color() -> Color {
    Color::from_rgba8(0x99, 0x99, 0x99, 0xff)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(line: usize, start: usize, text: &str) -> TextSegment {
        TextSegment {
            text: text.to_string(),
            font: FontDescriptor::default(),
            foreground: BLACK,
            background: None,
            line,
            columns: start..start + text.chars().count(),
        }
    }

    fn model(segments: Vec<TextSegment>) -> StyledTextModel {
        StyledTextModel {
            segments,
            ..StyledTextModel::default()
        }
    }

    #[test]
    fn empty_model_is_rejected() {
        assert_eq!(model(vec![]).validate(), Err(ModelError::EmptySelection));
    }

    #[test]
    fn contiguous_segments_validate() {
        let m = model(vec![segment(0, 0, "let "), segment(0, 4, "x"), segment(2, 2, "y")]);
        assert_eq!(m.validate(), Ok(()));
    }

    #[test]
    fn gap_between_segments_is_rejected() {
        let m = model(vec![segment(0, 0, "let "), segment(0, 5, "x")]);
        assert_eq!(
            m.validate(),
            Err(ModelError::NonContiguous {
                line: 0,
                expected: 4,
                found: 5
            })
        );
    }

    #[test]
    fn lines_going_backwards_are_rejected() {
        let m = model(vec![segment(1, 0, "a"), segment(0, 0, "b")]);
        assert_eq!(m.validate(), Err(ModelError::OutOfOrder { index: 1, line: 0 }));
    }

    #[test]
    fn tab_width_is_checked_against_columns() {
        let mut seg = segment(0, 0, "\tx");
        assert!(matches!(
            model(vec![seg.clone()]).validate(),
            Err(ModelError::ColumnMismatch { width: 5, .. })
        ));
        seg.columns = 0..5;
        assert_eq!(model(vec![seg]).validate(), Ok(()));
    }

    #[test]
    fn line_breaks_and_bad_sizes_are_rejected() {
        assert_eq!(
            model(vec![segment(0, 0, "a\nb")]).validate(),
            Err(ModelError::LineBreakInSegment { line: 0 })
        );
        let mut seg = segment(0, 0, "a");
        seg.font.size = 0.0;
        assert!(matches!(
            model(vec![seg]).validate(),
            Err(ModelError::InvalidFontSize { .. })
        ));
    }

    #[test]
    fn lines_fill_gaps_with_empty_lines() {
        let m = model(vec![segment(3, 0, "a"), segment(5, 0, "b"), segment(5, 1, "c")]);
        let lines = m.lines();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].index, 3);
        assert!(lines[1].segments.is_empty());
        assert_eq!(lines[2].segments.len(), 2);
    }

    #[test]
    fn far_apart_lines_are_rejected_and_never_expanded() {
        let m = model(vec![segment(0, 0, "a"), segment(usize::MAX, 0, "b")]);
        assert_eq!(
            m.validate(),
            Err(ModelError::TooManyLines {
                first: 0,
                last: usize::MAX
            })
        );

        let lines = m.lines();
        assert_eq!(lines.len(), MAX_LINE_SPAN + 2);
        assert_eq!(lines.last().map(|l| l.index), Some(usize::MAX));
        assert_eq!(lines.last().map(|l| l.segments.len()), Some(1));
    }

    #[test]
    fn out_of_order_segments_are_skipped_by_lines() {
        let m = model(vec![segment(2, 0, "a"), segment(1, 0, "b"), segment(2, 1, "c")]);
        let lines = m.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].segments.len(), 2);
    }

    #[test]
    fn far_out_columns_are_rejected() {
        let m = model(vec![segment(0, MAX_COLUMN + 1, "x")]);
        assert!(matches!(
            m.validate(),
            Err(ModelError::ColumnOutOfRange { line: 0, .. })
        ));

        let mut m = model(vec![segment(0, 0, "x")]);
        m.carets.push(CaretMarker::new(0, 1 << 62));
        assert_eq!(
            m.validate(),
            Err(ModelError::ColumnOutOfRange {
                line: 0,
                column: 1 << 62
            })
        );
    }

    #[test]
    fn model_deserializes_with_defaults() {
        let json = r##"{
            "segments": [{
                "text": "fn",
                "font": { "family": "Monospace", "size": 20.0, "bold": true },
                "foreground": "#000080",
                "line": 0,
                "columns": { "start": 0, "end": 2 }
            }]
        }"##;
        let m: StyledTextModel = serde_json::from_str(json).unwrap();
        assert_eq!(m.tab_size, 4);
        assert_eq!(m.first_line_number, 1);
        assert!(m.gutter_background.is_none());
        assert!(m.carets.is_empty());
        assert!(m.segments[0].font.bold);
        assert!(!m.segments[0].font.italic);
        assert_eq!(m.validate(), Ok(()));
    }
}
