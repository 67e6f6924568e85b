//! Scan position over an immutable text buffer
//!
//! Offsets are byte offsets into the full text, so a [`Source`] bounded to
//! one line of a file still produces ranges in file coordinates.

use quill_ast::Range;

#[derive(Debug, Clone)]
pub struct Source<'a> {
    text: &'a str,
    /// Current byte offset, `start <= cursor <= end`
    pub cursor: usize,
    end: usize,
}

impl<'a> Source<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            cursor: 0,
            end: text.len(),
        }
    }

    /// A source restricted to `range` of `text`
    pub fn bounded(text: &'a str, range: Range) -> Self {
        let end = range.end.min(text.len());
        Self {
            text,
            cursor: range.start.min(end),
            end,
        }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    /// Offset one past the last readable byte
    pub fn end(&self) -> usize {
        self.end
    }

    pub fn can_read(&self) -> bool {
        self.cursor < self.end
    }

    /// Unread text up to the bound
    pub fn remaining(&self) -> &'a str {
        &self.text[self.cursor..self.end]
    }

    pub fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    pub fn peek_is(&self, expected: &str) -> bool {
        self.remaining().starts_with(expected)
    }

    pub fn skip(&mut self) {
        if let Some(c) = self.peek() {
            self.cursor += c.len_utf8();
        }
    }

    /// Advance over `expected` if it comes next; returns whether it did
    pub fn try_read(&mut self, expected: &str) -> bool {
        if self.peek_is(expected) {
            self.cursor += expected.len();
            true
        } else {
            false
        }
    }

    pub fn read(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.cursor += c.len_utf8();
        Some(c)
    }

    /// Read the longest run of characters satisfying `pred`
    pub fn read_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.cursor;
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.cursor += c.len_utf8();
        }
        &self.text[start..self.cursor]
    }

    /// Skip whitespace, returning the skipped range
    pub fn skip_whitespace(&mut self) -> Range {
        let start = self.cursor;
        self.read_while(char::is_whitespace);
        Range::new(start, self.cursor)
    }

    /// A range starting at `start` and ending at the cursor
    pub fn range_from(&self, start: usize) -> Range {
        Range::new(start, self.cursor)
    }

    pub fn slice(&self, range: Range) -> &'a str {
        &self.text[range.start..range.end]
    }
}

pub fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}
