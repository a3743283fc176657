//! Leading-whitespace analysis and indentation chopping.

use crate::draw::FontDescriptor;
use crate::model::{MAX_COLUMN, ModelLine, StyledTextModel};
use crate::util;

/// A run of expanded text on one line, before measurement.
#[derive(Debug, Clone)]
pub(crate) struct Piece<'a> {
    pub text: String,
    pub font: &'a FontDescriptor,
    /// `None` for the implicit whitespace before a mid-line selection start.
    pub foreground: Option<crate::draw::Color>,
    pub background: Option<crate::draw::Color>,
}

/// One line as a sequence of pieces with its leading-whitespace width.
#[derive(Debug, Clone)]
pub(crate) struct LinePieces<'a> {
    pub pieces: Vec<Piece<'a>>,
    pub leading: usize,
    pub blank: bool,
}

impl LinePieces<'_> {
    pub fn columns(&self) -> usize {
        self.pieces.iter().map(|p| p.text.chars().count()).sum()
    }
}

/// Expands a model line into pieces, including implicit leading columns.
pub(crate) fn split_line<'a>(model: &'a StyledTextModel, line: &ModelLine<'a>) -> LinePieces<'a> {
    let mut pieces = Vec::with_capacity(line.segments.len() + 1);

    let start = line.start_column().min(MAX_COLUMN);
    if start > 0 {
        pieces.push(Piece {
            text: " ".repeat(start),
            font: &model.default_font,
            foreground: None,
            background: None,
        });
    }

    for segment in line.segments.iter().copied() {
        pieces.push(Piece {
            text: util::expand_tabs(&segment.text, segment.columns.start, model.tab_size),
            font: &segment.font,
            foreground: Some(segment.foreground),
            background: segment.background,
        });
    }

    let full: String = pieces.iter().map(|p| p.text.as_str()).collect();
    LinePieces {
        leading: util::leading_whitespace_columns(&full),
        blank: full.trim().is_empty(),
        pieces,
    }
}

/// Minimum leading whitespace over non-blank lines; 0 when every line is blank.
pub(crate) fn min_indent(lines: &[LinePieces<'_>]) -> usize {
    lines
        .iter()
        .filter(|line| !line.blank)
        .map(|line| line.leading)
        .min()
        .unwrap_or(0)
}

/// Removes `columns` leading columns from the line.
///
/// Only whitespace is removed; blank lines may be shorter than `columns`.
pub(crate) fn chop(line: &mut LinePieces<'_>, columns: usize) {
    let mut remaining = columns;
    for piece in &mut line.pieces {
        if remaining == 0 {
            break;
        }
        let removable = piece
            .text
            .chars()
            .take(remaining)
            .take_while(|c| c.is_whitespace())
            .count();
        let byte_offset = piece
            .text
            .char_indices()
            .nth(removable)
            .map(|(i, _)| i)
            .unwrap_or(piece.text.len());
        piece.text.drain(..byte_offset);
        remaining -= removable;
        if !piece.text.is_empty() {
            break;
        }
    }
    line.leading = line.leading.saturating_sub(columns - remaining);
}
