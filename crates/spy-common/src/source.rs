//! Source text loading and line/column bookkeeping.
//!
//! `SourceText` owns the character buffer for one compilation. A leading
//! UTF-8 BOM is tolerated and stripped at load time so byte offsets always
//! refer to the text the lexer actually sees.

use std::path::Path;

use crate::span::Span;

const BOM: char = '\u{feff}';

/// One-based line/column position, suitable for `file:line:col` output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineCol {
    pub line: u32,
    pub col: u32,
}

/// The source buffer for a single `.spc` file.
#[derive(Debug)]
pub struct SourceText {
    text: String,
    line_index: LineIndex,
}

impl SourceText {
    /// Wrap an in-memory string, stripping a leading BOM if present.
    pub fn new(text: impl Into<String>) -> Self {
        let mut text = text.into();
        if text.starts_with(BOM) {
            text.drain(..BOM.len_utf8());
        }
        let line_index = LineIndex::new(&text);
        Self { text, line_index }
    }

    /// Read a file from disk. The handle is scoped to this call.
    pub fn read(path: &Path) -> std::io::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::new(text))
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }

    /// Line/column of the start of `span`.
    pub fn line_col(&self, span: Span) -> LineCol {
        self.line_index.line_col(span.start)
    }
}

/// Precomputed line-start offsets for offset -> line/col translation.
#[derive(Debug)]
pub struct LineIndex {
    line_starts: Vec<u32>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i as u32 + 1);
            }
        }
        Self { line_starts }
    }

    /// Translate a byte offset into a one-based line/column pair.
    ///
    /// Columns count bytes from the line start; offsets past the end of the
    /// text clamp to the final line.
    pub fn line_col(&self, offset: u32) -> LineCol {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        LineCol {
            line: line as u32 + 1,
            col: offset - self.line_starts[line] + 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bom_is_stripped() {
        let src = SourceText::new("\u{feff}class A {}");
        assert_eq!(src.text(), "class A {}");
    }

    #[test]
    fn line_col_basics() {
        let idx = LineIndex::new("ab\ncde\n\nf");
        assert_eq!(idx.line_col(0), LineCol { line: 1, col: 1 });
        assert_eq!(idx.line_col(1), LineCol { line: 1, col: 2 });
        assert_eq!(idx.line_col(3), LineCol { line: 2, col: 1 });
        assert_eq!(idx.line_col(5), LineCol { line: 2, col: 3 });
        assert_eq!(idx.line_col(7), LineCol { line: 3, col: 1 });
        assert_eq!(idx.line_col(8), LineCol { line: 4, col: 1 });
    }

    #[test]
    fn line_col_clamps_past_end() {
        let idx = LineIndex::new("ab");
        assert_eq!(idx.line_col(10), LineCol { line: 1, col: 11 });
    }
}
