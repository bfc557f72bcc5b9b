//! Offset/position mapping.
//!
//! Line starts are computed once per parse pass and binary-searched, so each
//! conversion is `O(log lines)` regardless of the order queries arrive in.

use crate::error::{Error, Result};
use crate::model::{Position, Range};

/// Sorted table of line-start offsets for one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    /// Build the index for `text`. Only `LF` terminates a line, so the text
    /// is expected to be normalized already.
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            text.bytes()
                .enumerate()
                .filter(|&(_, b)| b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self {
            line_starts,
            len: text.len(),
        }
    }

    /// Number of lines (a trailing `LF` opens an empty last line).
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Length of the indexed text in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the indexed text is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Byte offset at which `line` starts.
    pub fn line_start(&self, line: usize) -> Option<usize> {
        self.line_starts.get(line).copied()
    }

    /// Zero-based line containing `offset` (clamped to the last line).
    pub fn line_of(&self, offset: usize) -> usize {
        let offset = offset.min(self.len);
        match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        }
    }

    /// Convert a byte offset to a position; offsets past the end clamp to the
    /// last valid position.
    pub fn position(&self, offset: usize) -> Position {
        let offset = offset.min(self.len);
        let line = self.line_of(offset);
        let character = offset - self.line_starts[line];
        Position::new(line as u32, character as u32)
    }

    /// Convert a possibly negative offset, rejecting negative values.
    pub fn try_position(&self, offset: i64) -> Result<Position> {
        if offset < 0 {
            return Err(Error::NegativeOffset(offset));
        }
        Ok(self.position(usize::try_from(offset).unwrap_or(usize::MAX)))
    }

    /// Convert a span of byte offsets to a range.
    pub fn range(&self, start: usize, end: usize) -> Range {
        Range::new(self.position(start), self.position(end.max(start)))
    }

    /// Convert a position back to a byte offset.
    pub fn offset(&self, pos: Position) -> Result<usize> {
        let out_of_range = || Error::PositionOutOfRange {
            line: pos.line,
            character: pos.character,
        };
        let line = pos.line as usize;
        let start = self.line_start(line).ok_or_else(out_of_range)?;
        let line_end = self
            .line_start(line + 1)
            .map(|next| next - 1)
            .unwrap_or(self.len);
        let offset = start + pos.character as usize;
        if offset > line_end {
            return Err(out_of_range());
        }
        Ok(offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = "%PDF-1.7\n1 0 obj\n<<>>\nendobj\n";

    #[test]
    fn test_offset_zero() {
        let index = LineIndex::new(TEXT);
        assert_eq!(index.position(0), Position::new(0, 0));
    }

    #[test]
    fn test_line_boundaries() {
        let index = LineIndex::new(TEXT);
        assert_eq!(index.line_count(), 5);
        assert_eq!(index.position(8), Position::new(0, 8));
        assert_eq!(index.position(9), Position::new(1, 0));
        assert_eq!(index.position(13), Position::new(1, 4));
    }

    #[test]
    fn test_past_end_clamps() {
        let index = LineIndex::new(TEXT);
        let last = index.position(TEXT.len());
        assert_eq!(index.position(TEXT.len() + 100), last);
        assert_eq!(last, Position::new(4, 0));
    }

    #[test]
    fn test_negative_offset_is_error() {
        let index = LineIndex::new(TEXT);
        assert!(matches!(
            index.try_position(-1),
            Err(Error::NegativeOffset(-1))
        ));
        assert_eq!(index.try_position(9).unwrap(), Position::new(1, 0));
    }

    #[test]
    fn test_offset_round_trip() {
        let index = LineIndex::new(TEXT);
        for offset in [0, 5, 9, 16, 17, 22, TEXT.len()] {
            let pos = index.position(offset);
            assert_eq!(index.offset(pos).unwrap(), offset);
        }
        assert!(index.offset(Position::new(0, 40)).is_err());
        assert!(index.offset(Position::new(9, 0)).is_err());
    }

    #[test]
    fn test_empty_text() {
        let index = LineIndex::new("");
        assert!(index.is_empty());
        assert_eq!(index.position(3), Position::new(0, 0));
        assert_eq!(index.range(0, 0), Range::document_start());
    }
}
