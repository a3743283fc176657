//! Building a [`StyledTextModel`] from an editor's style capability.

use super::{CaretMarker, StyledTextModel, TextSegment};
use crate::draw::{Color, FontDescriptor};
use crate::util;

/// Visual attributes active at one position.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font: FontDescriptor,
    pub foreground: Color,
    pub background: Option<Color>,
}

/// Capability an editor exposes to the renderer: "given a position, return
/// the active font and colors".
///
/// `column` is the visual column after tab expansion.
pub trait StyleSource {
    fn style_at(&self, line: usize, column: usize) -> TextStyle;
}

/// A style source that returns the same style everywhere (plain text input).
#[derive(Debug, Clone)]
pub struct UniformStyle(pub TextStyle);

impl StyleSource for UniformStyle {
    fn style_at(&self, _line: usize, _column: usize) -> TextStyle {
        self.0.clone()
    }
}

/// Incremental construction of a model with columns computed automatically.
#[derive(Debug, Clone, Default)]
pub struct ModelBuilder {
    model: StyledTextModel,
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tab_size(mut self, tab_size: usize) -> Self {
        self.model.tab_size = tab_size;
        self
    }

    pub fn default_font(mut self, font: FontDescriptor) -> Self {
        self.model.default_font = font;
        self
    }

    pub fn background(mut self, background: Option<Color>) -> Self {
        self.model.background = background;
        self
    }

    pub fn caret_color(mut self, color: Color) -> Self {
        self.model.caret_color = color;
        self
    }

    /// Line number shown in the gutter for the selection's first line.
    pub fn first_line_number(mut self, number: usize) -> Self {
        self.model.first_line_number = number;
        self
    }

    pub fn gutter(mut self, numbers: Color, background: Option<Color>) -> Self {
        self.model.line_number_color = numbers;
        self.model.gutter_background = background;
        self
    }

    /// Adds a caret marker.
    pub fn caret(mut self, line: usize, column: usize) -> Self {
        self.model.carets.push(CaretMarker::new(line, column));
        self
    }

    /// Appends `text` to `line`, continuing after the line's last segment or
    /// starting at column 0.
    pub fn push(self, line: usize, text: &str, style: &TextStyle) -> Self {
        let start = self
            .model
            .segments
            .last()
            .filter(|s| s.line == line)
            .map(|s| s.columns.end)
            .unwrap_or(0);
        self.push_at(line, start, text, style)
    }

    /// Appends `text` to `line` starting at an explicit visual column.
    pub fn push_at(mut self, line: usize, column: usize, text: &str, style: &TextStyle) -> Self {
        let width = util::expand_tabs(text, column, self.model.tab_size)
            .chars()
            .count();
        self.model.segments.push(TextSegment {
            text: text.to_string(),
            font: style.font.clone(),
            foreground: style.foreground,
            background: style.background,
            line,
            columns: column..column + width,
        });
        self
    }

    /// Builds segments for `lines` by querying `source` at every column and
    /// coalescing runs of equal style.
    ///
    /// The first line begins at `first_column` (a selection that starts
    /// mid-line); the rest begin at column 0.
    pub fn from_source(
        mut self,
        lines: &[&str],
        first_column: usize,
        source: &dyn StyleSource,
    ) -> Self {
        let tab_size = self.model.tab_size.max(1);

        for (line, text) in lines.iter().enumerate() {
            let mut column = if line == 0 { first_column } else { 0 };
            let mut run_start = column;
            let mut run = String::new();
            let mut run_style: Option<TextStyle> = None;

            for c in text.chars() {
                let style = source.style_at(line, column);
                if let Some(current) = run_style.take_if(|current| *current != style) {
                    self = self.push_at(line, run_start, &std::mem::take(&mut run), &current);
                    run_start = column;
                }
                run_style = Some(style);
                run.push(c);
                column += if c == '\t' {
                    tab_size - column % tab_size
                } else {
                    1
                };
            }

            if let Some(style) = run_style {
                self = self.push_at(line, run_start, &run, &style);
            }
        }

        self
    }

    pub fn build(self) -> StyledTextModel {
        self.model
    }
}
