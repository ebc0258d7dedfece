//! Source location tracking for error messages.

use std::fmt;
use std::sync::Arc;

/// Identifies the source a location points into (usually a file path).
pub type FileId = Arc<str>;

/// A location in source text (file, line, column).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    /// Source the location belongs to
    pub file: FileId,
    /// Line number (1-indexed)
    pub row: u32,
    /// Column number (1-indexed, in bytes)
    pub column: u32,
}

impl Location {
    pub fn new(file: impl Into<FileId>, row: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            row,
            column,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.row, self.column)
    }
}

/// Byte range of a token in its source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// Start offset (inclusive)
    pub begin: usize,
    /// End offset (exclusive)
    pub end: usize,
}

impl Span {
    pub fn new(begin: usize, end: usize) -> Self {
        Self { begin, end }
    }

    /// Byte length of the span.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.begin)
    }

    /// Whether the span is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_display() {
        let loc = Location::new("grammar.bnf", 3, 14);
        assert_eq!(loc.to_string(), "grammar.bnf:3:14");
    }

    #[test]
    fn test_span_len() {
        assert_eq!(Span::new(6, 11).len(), 5);
    }

    #[test]
    fn test_span_empty() {
        assert!(Span::new(4, 4).is_empty());
        assert!(Span::new(5, 4).is_empty());
    }
}
