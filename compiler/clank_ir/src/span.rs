//! Source location spans.
//!
//! Spans are line/column based because diagnostics sort on
//! `(file, line, column)` and the input JSON model carries positions that
//! way. The byte `offset` is optional: AST produced from JSON may omit it.

use std::fmt;

use serde::Serialize;

/// A single source position (1-based line and column).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, Debug, Serialize)]
pub struct Pos {
    pub line: u32,
    pub col: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

impl Pos {
    /// Create a position without a byte offset.
    #[inline]
    pub const fn new(line: u32, col: u32) -> Self {
        Pos {
            line,
            col,
            offset: None,
        }
    }
}

/// Source location span.
///
/// The file name is optional: single-file compilations and synthesized
/// nodes leave it empty.
#[derive(Clone, Eq, PartialEq, Hash, Default, Serialize)]
pub struct Span {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub start: Pos,
    pub end: Pos,
}

impl Span {
    /// Dummy span for generated nodes.
    pub const DUMMY: Span = Span {
        file: None,
        start: Pos::new(0, 0),
        end: Pos::new(0, 0),
    };

    /// Create a span within an unnamed file.
    pub const fn new(start: Pos, end: Pos) -> Self {
        Span {
            file: None,
            start,
            end,
        }
    }

    /// Create a single-line span from `(line, col_start, col_end)`.
    pub const fn line(line: u32, col_start: u32, col_end: u32) -> Self {
        Span::new(Pos::new(line, col_start), Pos::new(line, col_end))
    }

    /// Attach a file name.
    #[must_use]
    pub fn in_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Check if this is the dummy span.
    pub fn is_dummy(&self) -> bool {
        *self == Span::DUMMY
    }

    /// Merge two spans to create one covering both.
    ///
    /// The file name of `self` wins when both are set.
    #[must_use]
    pub fn merge(self, other: Span) -> Span {
        let (start, end) = (
            min_pos(self.start, other.start),
            max_pos(self.end, other.end),
        );
        Span {
            file: self.file.or(other.file),
            start,
            end,
        }
    }

    /// Sort key for diagnostic ordering: `(file, line, column)`.
    pub fn sort_key(&self) -> (String, u32, u32) {
        (
            self.file.clone().unwrap_or_default(),
            self.start.line,
            self.start.col,
        )
    }
}

fn min_pos(a: Pos, b: Pos) -> Pos {
    if (a.line, a.col) <= (b.line, b.col) {
        a
    } else {
        b
    }
}

fn max_pos(a: Pos, b: Pos) -> Pos {
    if (a.line, a.col) >= (b.line, b.col) {
        a
    } else {
        b
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) => write!(f, "{file}:{}:{}", self.start.line, self.start.col),
            None => write!(f, "{}:{}", self.start.line, self.start.col),
        }
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Span({}:{}..{}:{})",
            self.start.line, self.start.col, self.end.line, self.end.col
        )
    }
}
