use std::fmt;

use serde::Serialize;

/// Byte-offset span into source text. Start is inclusive, end is exclusive.
///
/// Spans are relative to the text they were lexed from: the authored file
/// for user code, or the joined lines of one generated record for
/// synthesized code. [`SourcePosition::origin`] tells the two apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    /// Create a new span from byte offsets.
    pub fn new(start: u32, end: u32) -> Self {
        debug_assert!(start <= end, "span start ({start}) must be <= end ({end})");
        Self { start, end }
    }

    /// Length of the span in bytes.
    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    /// Whether the span is empty (zero-length).
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Merge two spans into one that covers both.
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// Which text a position points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum SourceOrigin {
    /// The user-authored translation unit.
    #[default]
    Authored,
    /// The n-th generated source record of the compilation unit.
    Generated(u32),
}

/// A 1-based (line, column) position with its origin.
///
/// The default value (authored, line 0, column 0) is the "unknown"
/// position used when a diagnostic has no better location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct SourcePosition {
    pub origin: SourceOrigin,
    pub line: u32,
    pub col: u32,
}

impl SourcePosition {
    pub fn new(origin: SourceOrigin, line: u32, col: u32) -> Self {
        Self { origin, line, col }
    }

    /// Whether this is the empty/unknown position.
    pub fn is_unknown(&self) -> bool {
        self.line == 0
    }

    /// Whether this position points into synthesized code.
    pub fn is_generated(&self) -> bool {
        matches!(self.origin, SourceOrigin::Generated(_))
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unknown() {
            return write!(f, "?");
        }
        match self.origin {
            SourceOrigin::Authored => write!(f, "{}:{}", self.line, self.col),
            SourceOrigin::Generated(n) => write!(f, "<generated #{n}>:{}:{}", self.line, self.col),
        }
    }
}

/// Pre-computed index of line start positions for on-demand line/column lookup.
///
/// Constructed once per source text, then used to convert byte offsets to
/// human-readable (line, column) pairs via binary search, and back.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte offset of the start of each line. The first entry is always 0.
    line_starts: Vec<u32>,
    len: u32,
}

impl LineIndex {
    /// Build a line index by scanning the source text for newline characters.
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0u32];
        for (i, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push((i + 1) as u32);
            }
        }
        Self {
            line_starts,
            len: source.len() as u32,
        }
    }

    /// Convert a byte offset to a 1-based (line, column) pair.
    ///
    /// Column is measured in bytes from the start of the line (1-based).
    pub fn line_col(&self, offset: u32) -> (u32, u32) {
        // partition_point returns the index of the first line_start > offset,
        // so the line index is one less than that.
        let line_idx = self.line_starts.partition_point(|&start| start <= offset);
        let line_idx = line_idx.saturating_sub(1);
        let line = (line_idx as u32) + 1;
        let col = offset - self.line_starts[line_idx] + 1;
        (line, col)
    }

    /// Convert a 1-based (line, column) pair back to a byte offset.
    ///
    /// Returns `None` for line 0 or a line past the end of the text. The
    /// column is clamped to the end of the text.
    pub fn offset(&self, line: u32, col: u32) -> Option<u32> {
        let start = *self.line_starts.get(line.checked_sub(1)? as usize)?;
        Some((start + col.saturating_sub(1)).min(self.len))
    }

    /// Return the number of lines in the source.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_new_and_len() {
        let span = Span::new(5, 10);
        assert_eq!(span.len(), 5);
        assert!(!span.is_empty());
        assert!(Span::new(3, 3).is_empty());
    }

    #[test]
    fn span_merge() {
        let merged = Span::new(5, 10).merge(Span::new(8, 15));
        assert_eq!(merged, Span::new(5, 15));
    }

    #[test]
    fn default_position_is_unknown() {
        let pos = SourcePosition::default();
        assert!(pos.is_unknown());
        assert!(!pos.is_generated());
        assert_eq!(pos.to_string(), "?");
    }

    #[test]
    fn position_display() {
        let authored = SourcePosition::new(SourceOrigin::Authored, 3, 7);
        assert_eq!(authored.to_string(), "3:7");
        let generated = SourcePosition::new(SourceOrigin::Generated(2), 1, 1);
        assert!(generated.is_generated());
        assert_eq!(generated.to_string(), "<generated #2>:1:1");
    }

    #[test]
    fn line_index_multiple_lines() {
        let idx = LineIndex::new("hello\nworld\nfoo");
        assert_eq!(idx.line_col(0), (1, 1));
        assert_eq!(idx.line_col(6), (2, 1));
        assert_eq!(idx.line_col(13), (3, 2));
        assert_eq!(idx.line_count(), 3);
    }

    #[test]
    fn line_index_newline_at_offset() {
        let idx = LineIndex::new("ab\ncd");
        // '\n' is at offset 2 -> still line 1, col 3
        assert_eq!(idx.line_col(2), (1, 3));
        assert_eq!(idx.line_col(3), (2, 1));
    }

    #[test]
    fn line_index_offset_inverts_line_col() {
        let src = "a: int;\nb: () = { }\n";
        let idx = LineIndex::new(src);
        for offset in [0u32, 3, 8, 12] {
            let (line, col) = idx.line_col(offset);
            assert_eq!(idx.offset(line, col), Some(offset));
        }
        assert_eq!(idx.offset(0, 1), None);
        assert_eq!(idx.offset(9, 1), None);
    }
}
