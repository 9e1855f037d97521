//! # Document Snapshots
//!
//! The engine never mutates text. It reads immutable [`DocumentSnapshot`]s, each a
//! cheap-to-clone `xi_rope::Rope` tagged with a stable document id and a monotonic
//! version. Edits compile to a single `Delta` and produce a successor snapshot plus
//! the line-range mapping that incremental maintenance needs.
//!
//! ## Modules
//!
//! - **`span`**: `LineSpan`, the inclusive 1-based line range used everywhere
//! - **`change`**: `TextEdit`, `LineChange` and atomic edit application

pub mod change;
pub mod span;

use std::borrow::Cow;

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;
use xi_rope::Rope;

pub use change::{EditError, LineChange, TextEdit};
pub use span::LineSpan;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("document is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
}

/// Stable identity of one document across all of its snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DocId(Uuid);

impl DocId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DocId {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache key for everything derived from one snapshot at one tab width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SnapshotKey {
    pub doc: DocId,
    pub version: u64,
    pub tab_width: usize,
}

/// A single line of a snapshot with its byte offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRef {
    /// 1-based line number.
    pub number: usize,
    /// Line text without its terminator.
    pub text: String,
    /// Byte offset of the first character of the line.
    pub from: usize,
    /// Byte offset just past the last character (before `\n` / `\r\n`).
    pub to: usize,
}

/// Immutable view of a document at one version.
#[derive(Debug, Clone)]
pub struct DocumentSnapshot {
    id: DocId,
    version: u64,
    rope: Rope,
    line_count: usize,
}

impl DocumentSnapshot {
    /// Creates the first snapshot of a new document.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self::with_identity(DocId::new(), 0, Rope::from(text))
    }

    /// Creates the first snapshot from raw bytes, validating UTF-8.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DocumentError> {
        let text = std::str::from_utf8(bytes)?;
        Ok(Self::from_text(text))
    }

    /// Creates the next snapshot of this document from text produced elsewhere
    /// (e.g. by the host editor applying its own transaction).
    #[must_use]
    pub fn successor(&self, text: &str) -> Self {
        Self::with_identity(self.id, self.version + 1, Rope::from(text))
    }

    pub(crate) fn with_identity(id: DocId, version: u64, rope: Rope) -> Self {
        let line_count = rope.line_of_offset(rope.len()) + 1;
        Self {
            id,
            version,
            rope,
            line_count,
        }
    }

    #[must_use]
    pub fn id(&self) -> DocId {
        self.id
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    #[must_use]
    pub fn key(&self, tab_width: usize) -> SnapshotKey {
        SnapshotKey {
            doc: self.id,
            version: self.version,
            tab_width,
        }
    }

    /// Number of lines; never zero.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_count
    }

    /// Total length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rope.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rope.len() == 0
    }

    /// The whole document as a `String`.
    #[must_use]
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    pub(crate) fn rope(&self) -> &Rope {
        &self.rope
    }

    /// Returns line `number` (1-based), or `None` when out of range.
    #[must_use]
    pub fn line(&self, number: usize) -> Option<LineRef> {
        if number == 0 || number > self.line_count {
            return None;
        }
        let from = self.rope.offset_of_line(number - 1);
        let end = if number < self.line_count {
            self.rope.offset_of_line(number)
        } else {
            self.rope.len()
        };
        let raw = self.rope.slice_to_cow(from..end);
        let text = raw.trim_end_matches(['\r', '\n']).to_string();
        let to = from + text.len();
        Some(LineRef {
            number,
            text,
            from,
            to,
        })
    }

    /// Text of line `number`, empty when out of range.
    #[must_use]
    pub fn line_text(&self, number: usize) -> String {
        self.line(number).map(|l| l.text).unwrap_or_default()
    }

    /// Maps a byte offset to its 1-based line number, clamping to the document.
    #[must_use]
    pub fn line_at_offset(&self, offset: usize) -> usize {
        let offset = offset.min(self.rope.len());
        self.rope.line_of_offset(offset) + 1
    }

    /// Slices `[start, end)`, clamping the range to the document.
    #[must_use]
    pub fn slice(&self, range: std::ops::Range<usize>) -> Cow<'_, str> {
        let len = self.rope.len();
        let start = range.start.min(len);
        let end = range.end.min(len).max(start);
        self.rope.slice_to_cow(start..end)
    }

    /// True when `offset` sits on a UTF-8 character boundary.
    #[must_use]
    pub fn is_char_boundary(&self, offset: usize) -> bool {
        if offset == 0 || offset == self.rope.len() {
            return true;
        }
        if offset > self.rope.len() {
            return false;
        }
        match self.line(self.line_at_offset(offset)) {
            Some(line) if offset < line.to => line.text.is_char_boundary(offset - line.from),
            _ => true,
        }
    }

    /// Iterates every line in a single pass over the rope.
    pub fn lines(&self) -> impl Iterator<Item = LineRef> + '_ {
        let mut offset = 0usize;
        let tail_line = self.ends_with_newline() || self.is_empty();
        let len = self.rope.len();
        let last = self.line_count;
        self.rope
            .lines_raw(..)
            .enumerate()
            .map(move |(idx, raw)| {
                let from = offset;
                offset += raw.len();
                let text = raw.trim_end_matches(['\r', '\n']).to_string();
                let to = from + text.len();
                LineRef {
                    number: idx + 1,
                    text,
                    from,
                    to,
                }
            })
            .chain(tail_line.then(|| LineRef {
                number: last,
                text: String::new(),
                from: len,
                to: len,
            }))
    }

    fn ends_with_newline(&self) -> bool {
        let len = self.rope.len();
        len > 0 && self.rope.slice_to_cow(len - 1..len) == "\n"
    }
}

impl PartialEq for DocumentSnapshot {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.version == other.version && self.text() == other.text()
    }
}
