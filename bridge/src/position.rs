//! Offsets, ranges and line/column positions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Half-open `[start, end)` offset range into the program text.
///
/// Serialized as a two-element array, matching the `range` field of ESTree nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "(usize, usize)", into = "(usize, usize)")]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "range start {} past end {}", start, end);
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }

    /// Smallest range covering both `self` and `other`.
    pub fn union(self, other: TextRange) -> TextRange {
        TextRange {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Smallest range covering every range in `ranges`, or `None` when empty.
    pub fn cover<I>(ranges: I) -> Option<TextRange>
    where
        I: IntoIterator<Item = TextRange>,
    {
        ranges.into_iter().reduce(TextRange::union)
    }
}

impl From<(usize, usize)> for TextRange {
    fn from((start, end): (usize, usize)) -> Self {
        TextRange { start, end }
    }
}

impl From<TextRange> for (usize, usize) {
    fn from(range: TextRange) -> Self {
        (range.start, range.end)
    }
}

/// Human-readable position: `line` is 1-based, `column` is 0-based in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct LineColumn {
    pub line: usize,
    pub column: usize,
}

impl LineColumn {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// The `loc` pair stamped on target nodes, tokens and comments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SourceLocation {
    pub start: LineColumn,
    pub end: LineColumn,
}

/// A point in the program text carrying both representations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn line_column(&self) -> LineColumn {
        LineColumn::new(self.line, self.column)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Line start table for one program text.
///
/// Recognizes `\n`, `\r\n`, a lone `\r`, U+2028 and U+2029 as line terminators,
/// the same set the upstream scanner uses when it reports line numbers.
#[derive(Debug, Clone)]
pub struct LineIndex<'a> {
    text: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut line_starts = vec![0];
        let mut chars = text.char_indices().peekable();

        while let Some((index, ch)) = chars.next() {
            match ch {
                '\r' => {
                    if let Some(&(next, '\n')) = chars.peek() {
                        chars.next();
                        line_starts.push(next + 1);
                    } else {
                        line_starts.push(index + 1);
                    }
                }
                '\n' => line_starts.push(index + 1),
                '\u{2028}' | '\u{2029}' => line_starts.push(index + ch.len_utf8()),
                _ => {}
            }
        }

        Self { text, line_starts }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Resolve an offset. Offsets past the end of the text clamp to its end.
    pub fn position(&self, offset: usize) -> Position {
        let offset = offset.min(self.text.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let line_start = self.line_starts[line];
        let column = self
            .text
            .get(line_start..offset)
            .map(|prefix| prefix.chars().count())
            .unwrap_or(offset - line_start);

        Position {
            offset,
            line: line + 1,
            column,
        }
    }

    pub fn location(&self, range: TextRange) -> SourceLocation {
        SourceLocation {
            start: self.position(range.start).line_column(),
            end: self.position(range.end).line_column(),
        }
    }
}
