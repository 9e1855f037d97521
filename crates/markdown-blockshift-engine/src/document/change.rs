use std::ops::Range;

use serde::Serialize;
use thiserror::Error;
use xi_rope::{Rope, delta::Builder};

use super::{DocumentSnapshot, LineSpan};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditError {
    #[error("edit range {start}..{end} is outside the document (length {len})")]
    OutOfBounds { start: usize, end: usize, len: usize },
    #[error("edit ranges {first:?} and {second:?} overlap")]
    Overlapping {
        first: Range<usize>,
        second: Range<usize>,
    },
    #[error("edit boundary {0} is not on a character boundary")]
    NotCharBoundary(usize),
}

/// Replace the bytes in `range` with `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub range: Range<usize>,
    pub text: String,
}

impl TextEdit {
    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self {
            range: at..at,
            text: text.into(),
        }
    }

    pub fn delete(range: Range<usize>) -> Self {
        Self {
            range,
            text: String::new(),
        }
    }

    pub fn replace(range: Range<usize>, text: impl Into<String>) -> Self {
        Self {
            range,
            text: text.into(),
        }
    }
}

/// One contiguous edited region: the old lines it replaced and the new lines it became.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LineChange {
    pub old: LineSpan,
    pub new: LineSpan,
}

impl LineChange {
    /// Signed change in line count contributed by this region.
    #[must_use]
    pub fn line_delta(&self) -> isize {
        self.new.len() as isize - self.old.len() as isize
    }
}

impl DocumentSnapshot {
    /// Applies all `edits` as one atomic delta.
    ///
    /// Ranges are in the coordinates of `self`. They are sorted before use; any
    /// overlap, out-of-bounds range or split character rejects the whole batch.
    pub fn apply_edits(
        &self,
        mut edits: Vec<TextEdit>,
    ) -> Result<(DocumentSnapshot, Vec<LineChange>), EditError> {
        let len = self.len();
        edits.sort_by_key(|e| (e.range.start, e.range.end));

        for edit in &edits {
            if edit.range.start > edit.range.end || edit.range.end > len {
                return Err(EditError::OutOfBounds {
                    start: edit.range.start,
                    end: edit.range.end,
                    len,
                });
            }
            for offset in [edit.range.start, edit.range.end] {
                if !self.is_char_boundary(offset) {
                    return Err(EditError::NotCharBoundary(offset));
                }
            }
        }
        for pair in edits.windows(2) {
            if pair[1].range.start < pair[0].range.end {
                return Err(EditError::Overlapping {
                    first: pair[0].range.clone(),
                    second: pair[1].range.clone(),
                });
            }
        }

        let changes = self.line_changes(&edits);

        let mut builder = Builder::new(len);
        for edit in &edits {
            builder.replace(edit.range.clone(), Rope::from(edit.text.as_str()));
        }
        let delta = builder.build();
        let rope = delta.apply(self.rope());

        let next = DocumentSnapshot::with_identity(self.id(), self.version() + 1, rope);
        Ok((next, changes))
    }

    /// Derives the line-range mapping of sorted, non-overlapping edits.
    fn line_changes(&self, edits: &[TextEdit]) -> Vec<LineChange> {
        let mut changes: Vec<LineChange> = Vec::with_capacity(edits.len());
        let mut shift: isize = 0;

        for edit in edits {
            let old_start = self.line_at_offset(edit.range.start);
            let old_end = self.line_at_offset(edit.range.end);
            let inserted_breaks = edit.text.matches('\n').count();
            let removed_breaks = old_end - old_start;

            let new_start = (old_start as isize + shift) as usize;
            let new_end = new_start + inserted_breaks;
            shift += inserted_breaks as isize - removed_breaks as isize;

            let change = LineChange {
                old: LineSpan::new(old_start, old_end),
                new: LineSpan::new(new_start, new_end),
            };

            match changes.last_mut() {
                // Two edits on the same line form one region.
                Some(prev) if change.old.start <= prev.old.end => {
                    prev.old.end = prev.old.end.max(change.old.end);
                    prev.new.end = change.new.end;
                }
                _ => changes.push(change),
            }
        }
        changes
    }
}
