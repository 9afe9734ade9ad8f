//! Input and position tracking.
//!
//! The engine matches against a fully materialized sequence of code points.
//! A [`Position`] is a plain `Copy` value, so every combinator can snapshot
//! it before an attempt and simply keep the snapshot on failure.

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// POSITION
// ============================================================================

/// A location in the input: code point offset plus 1-based line and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Position {
    /// The position of the first code point.
    pub const fn start() -> Self {
        Self {
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    /// The position after consuming one ordinary code point.
    pub const fn advanced(self) -> Self {
        Self {
            offset: self.offset + 1,
            line: self.line,
            column: self.column + 1,
        }
    }

    /// The position after a successful newline match: same offset, next line.
    pub const fn next_line(self) -> Self {
        Self {
            offset: self.offset,
            line: self.line + 1,
            column: 1,
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::start()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, col {}", self.line, self.column)
    }
}

// ============================================================================
// INPUT RANGE
// ============================================================================

/// Half-open range `[begin, end)` of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputRange {
    pub begin: Position,
    pub end: Position,
}

impl InputRange {
    pub fn new(begin: Position, end: Position) -> Self {
        debug_assert!(begin.offset <= end.offset, "inverted input range");
        Self { begin, end }
    }

    /// An empty range located at `at`.
    pub fn empty(at: Position) -> Self {
        Self { begin: at, end: at }
    }

    pub fn len(&self) -> usize {
        self.end.offset - self.begin.offset
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// INPUT
// ============================================================================

/// An indexed view over the code points being parsed.
///
/// Byte offsets of every code point are kept alongside so that ranges can be
/// mapped back onto the original UTF-8 text for diagnostics.
#[derive(Debug, Clone, Default)]
pub struct Input {
    chars: Vec<char>,
    byte_offsets: Vec<usize>,
}

impl Input {
    pub fn new(text: &str) -> Self {
        let mut chars = Vec::with_capacity(text.len());
        let mut byte_offsets = Vec::with_capacity(text.len() + 1);
        for (offset, c) in text.char_indices() {
            chars.push(c);
            byte_offsets.push(offset);
        }
        byte_offsets.push(text.len());
        Self {
            chars,
            byte_offsets,
        }
    }

    /// Number of code points.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn get(&self, offset: usize) -> Option<char> {
        self.chars.get(offset).copied()
    }

    pub fn at_end(&self, pos: Position) -> bool {
        pos.offset >= self.chars.len()
    }

    /// Consumes exactly one code point at `pos`.
    pub fn advance(&self, pos: Position) -> Option<(char, Position)> {
        self.get(pos.offset).map(|c| (c, pos.advanced()))
    }

    /// Code points from `pos` to the end of the input.
    pub fn rest(&self, pos: Position) -> &[char] {
        self.chars.get(pos.offset..).unwrap_or(&[])
    }

    pub fn chars(&self, range: InputRange) -> &[char] {
        let end = range.end.offset.min(self.chars.len());
        let begin = range.begin.offset.min(end);
        &self.chars[begin..end]
    }

    pub fn text(&self, range: InputRange) -> String {
        self.chars(range).iter().collect()
    }

    /// Byte offset in the original text of the code point at `offset`.
    pub fn byte_offset(&self, offset: usize) -> usize {
        let last = self.byte_offsets.len() - 1;
        self.byte_offsets[offset.min(last)]
    }

    /// Byte span of `range` as `(start, length)`, suitable for miette labels.
    pub fn byte_span(&self, range: InputRange) -> (usize, usize) {
        let start = self.byte_offset(range.begin.offset);
        let end = self.byte_offset(range.end.offset);
        (start, end - start)
    }

    pub fn source_text(&self) -> String {
        self.chars.iter().collect()
    }
}

impl From<&str> for Input {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for Input {
    fn from(text: String) -> Self {
        Self::new(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_moves_column() {
        let input = Input::new("ab");
        let (c, pos) = input.advance(Position::start()).unwrap();
        assert_eq!(c, 'a');
        assert_eq!(pos, Position { offset: 1, line: 1, column: 2 });
        let (c, pos) = input.advance(pos).unwrap();
        assert_eq!(c, 'b');
        assert!(input.at_end(pos));
        assert!(input.advance(pos).is_none());
    }

    #[test]
    fn test_next_line_resets_column() {
        let pos = Position::start().advanced().advanced().next_line();
        assert_eq!(pos, Position { offset: 2, line: 2, column: 1 });
    }

    #[test]
    fn test_byte_span_multibyte() {
        let input = Input::new("añb");
        let begin = Position::start().advanced();
        let range = InputRange::new(begin, begin.advanced());
        assert_eq!(input.text(range), "ñ");
        assert_eq!(input.byte_span(range), (1, 2));
        assert_eq!(input.byte_offset(3), 4);
        assert_eq!(input.byte_offset(99), 4);
    }
}
