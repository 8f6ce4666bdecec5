//! Positions and line lookup for source location tracking.
//!
//! Offsets count Unicode scalar values (the scanner walks a `Vec<char>`),
//! lines are 1-based and columns 0-based.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// An offset into source text, measured in characters.
pub type TextPos = u32;

/// A line/column pair. Lines are 1-based, columns 0-based.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    #[inline]
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The start and end position of a token or node, with an optional file name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    pub start: Position,
    pub end: Position,
    #[serde(rename = "filename", skip_serializing_if = "Option::is_none")]
    pub filename: Option<Arc<str>>,
}

impl SourceLocation {
    pub fn new(start: Position, end: Position, filename: Option<Arc<str>>) -> Self {
        Self { start, end, filename }
    }
}

/// Whether `ch` ends a line (`\n`, `\r`, U+2028, U+2029).
#[inline]
pub fn is_newline(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

/// The position of character `offset` in `text`.
///
/// `\r\n` counts as a single line break.
pub fn get_line_info(text: &[char], offset: usize) -> Position {
    let mut line = 1;
    let mut line_start = 0;
    let mut i = 0;
    let end = offset.min(text.len());
    while i < end {
        let ch = text[i];
        if is_newline(ch) {
            if ch == '\r' && text.get(i + 1) == Some(&'\n') {
                i += 1;
            }
            line += 1;
            line_start = i + 1;
        }
        i += 1;
    }
    Position::new(line, offset.saturating_sub(line_start) as u32)
}

/// Line start offsets, for repeated position lookups over one text.
#[derive(Debug, Clone)]
pub struct LineMap {
    line_starts: Vec<TextPos>,
    first_line: u32,
}

impl LineMap {
    /// Index the lines of `text`. `first_line` is the number of its first line.
    pub fn new(text: &[char], first_line: u32) -> Self {
        let mut line_starts = vec![0];
        let mut i = 0;
        while i < text.len() {
            let ch = text[i];
            if is_newline(ch) {
                if ch == '\r' && text.get(i + 1) == Some(&'\n') {
                    i += 1;
                }
                line_starts.push((i + 1) as TextPos);
            }
            i += 1;
        }
        Self { line_starts, first_line }
    }

    /// The 0-based line index holding `pos`.
    pub fn line_of(&self, pos: TextPos) -> usize {
        match self.line_starts.binary_search(&pos) {
            Ok(line) => line,
            Err(line) => line - 1,
        }
    }

    /// The position of character `pos`.
    pub fn position_of(&self, pos: TextPos) -> Position {
        let line = self.line_of(pos);
        Position::new(self.first_line + line as u32, pos - self.line_starts[line])
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_get_line_info() {
        let text = chars("ab\u{2028}cd");
        assert_eq!(get_line_info(&text, 4), Position::new(2, 1));
        assert_eq!(get_line_info(&text, 1), Position::new(1, 1));
    }

    #[test]
    fn test_crlf_is_one_break() {
        let text = chars("line1\nline2\r\nline3");
        assert_eq!(get_line_info(&text, 8), Position::new(2, 2));
        assert_eq!(get_line_info(&text, 13), Position::new(3, 0));
    }

    #[test]
    fn test_offset_past_end() {
        let text = chars("ab");
        assert_eq!(get_line_info(&text, 5), Position::new(1, 5));
    }

    #[test]
    fn test_line_map_matches_line_info() {
        let text = chars("one\ntwo\u{2028}three\u{2029}four");
        let map = LineMap::new(&text, 1);
        assert_eq!(map.line_count(), 4);
        for offset in 0..=text.len() {
            assert_eq!(map.position_of(offset as TextPos), get_line_info(&text, offset));
        }
    }

    #[test]
    fn test_line_map_crlf() {
        let text = chars("ab\r\ncd");
        let map = LineMap::new(&text, 1);
        assert_eq!(map.line_count(), 2);
        assert_eq!(map.position_of(4), Position::new(2, 0));
        assert_eq!(map.position_of(5), Position::new(2, 1));
    }

    #[test]
    fn test_line_map_first_line() {
        let text = chars("a\nb");
        let map = LineMap::new(&text, 10);
        assert_eq!(map.position_of(0), Position::new(10, 0));
        assert_eq!(map.position_of(2), Position::new(11, 0));
    }
}
