use serde::Serialize;

use crate::blocks::BlockInfo;
use crate::document::{DocumentSnapshot, LineChange, LineSpan, TextEdit};
use crate::error::EngineError;
use crate::policy::{DropValidationResult, RejectReason};

/// The single atomic edit that moves a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveEdit {
    pub edits: Vec<TextEdit>,
    /// First line of the inserted text in the resulting document.
    pub inserted_start: usize,
    /// Where the source's first range used to begin, in the resulting document.
    pub vacated_line: usize,
}

/// Result of a committed move.
#[derive(Debug, Clone, Serialize)]
pub struct MoveOutcome {
    #[serde(skip)]
    pub snapshot: DocumentSnapshot,
    pub changes: Vec<LineChange>,
    /// Lines occupied by the inserted text, separator blanks included.
    pub inserted: LineSpan,
    pub vacated_line: usize,
}

/// Compiles a validated move into edits against `snapshot`.
///
/// Every source range is deleted with its line terminator. A drop at the
/// source's own start or just past its end becomes one replace of that range.
pub fn plan_move(
    snapshot: &DocumentSnapshot,
    source: &BlockInfo,
    target: usize,
    text: &str,
) -> MoveEdit {
    let n = snapshot.line_count();
    let t = target.clamp(1, n + 1);
    let ranges = source.ranges();
    let text_lines = text.split('\n').count();
    let own = ranges
        .iter()
        .position(|r| t == r.start || t == r.end + 1);

    let from = |line: usize| snapshot.line(line).map(|l| l.from).unwrap_or(snapshot.len());
    let to = |line: usize| snapshot.line(line).map(|l| l.to).unwrap_or(snapshot.len());

    let mut edits = Vec::with_capacity(ranges.len() + 1);
    for (idx, range) in ranges.iter().enumerate() {
        if Some(idx) == own {
            edits.push(TextEdit::replace(from(range.start)..to(range.end), text));
        } else if range.end < n {
            edits.push(TextEdit::delete(from(range.start)..from(range.end + 1)));
        } else if range.start > 1 {
            edits.push(TextEdit::delete(to(range.start - 1)..snapshot.len()));
        } else {
            edits.push(TextEdit::delete(0..snapshot.len()));
        }
    }

    let removed_before = |line: usize| -> usize {
        ranges
            .iter()
            .filter(|r| r.end < line)
            .map(|r| r.len())
            .sum()
    };

    let inserted_start = match own {
        Some(idx) => ranges[idx].start - removed_before(ranges[idx].start),
        None => {
            if t <= n {
                edits.push(TextEdit::insert(from(t), format!("{text}\n")));
            } else {
                edits.push(TextEdit::insert(snapshot.len(), format!("\n{text}")));
            }
            t - removed_before(t)
        }
    };

    let vacated_line = match (own, ranges.first()) {
        (Some(_), _) | (None, None) => inserted_start,
        (None, Some(first)) if t < first.start => first.start + text_lines,
        (None, Some(first)) => first.start,
    };

    MoveEdit {
        edits,
        inserted_start,
        vacated_line,
    }
}

/// Applies a validated move as one atomic edit.
pub fn commit_move(
    snapshot: &DocumentSnapshot,
    source: &BlockInfo,
    validation: &DropValidationResult,
    text: &str,
) -> Result<MoveOutcome, EngineError> {
    if !validation.allowed {
        return Err(EngineError::Rejected(
            validation.reason.unwrap_or(RejectReason::ContainerPolicy),
        ));
    }
    let target = validation
        .target_line_number
        .ok_or(EngineError::Rejected(RejectReason::NoTarget))?;

    let plan = plan_move(snapshot, source, target, text);
    let (next, changes) = snapshot.apply_edits(plan.edits)?;
    let text_lines = text.split('\n').count();
    let last = next.line_count();
    let inserted = LineSpan::new(
        plan.inserted_start.min(last),
        (plan.inserted_start + text_lines - 1).min(last),
    );

    Ok(MoveOutcome {
        snapshot: next,
        changes,
        inserted,
        vacated_line: plan.vacated_line.min(last),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::BlockDetector;
    use crate::lines::LineClassifier;
    use crate::mutation::build_insert_text;
    use crate::policy::{IndentIntent, validate_drop};
    use crate::view::StructureView;
    use pretty_assertions::assert_eq;

    fn move_block(
        text: &str,
        source: &[LineSpan],
        target: usize,
        intent: Option<IndentIntent>,
    ) -> Result<MoveOutcome, EngineError> {
        let doc = DocumentSnapshot::from_text(text);
        let classifier = LineClassifier::new(4);
        let blocks = BlockDetector::new(64);
        let view = StructureView::new(&doc, None, classifier, &blocks);
        let block = if source.len() == 1 && source[0].len() == 1 {
            (*view.detect_block(source[0].start).unwrap()).clone()
        } else {
            blocks.composite(&view, source).unwrap()
        };
        let validation = validate_drop(&view, &block, target, intent);
        let inserted = build_insert_text(&view, &block, &validation);
        commit_move(&doc, &block, &validation, &inserted)
    }

    #[test]
    fn moves_block_up() {
        let out = move_block("a\nb\nc", &[LineSpan::single(3)], 1, None).unwrap();
        assert_eq!(out.snapshot.text(), "c\na\nb");
        assert_eq!(out.inserted, LineSpan::single(1));
        assert_eq!(out.vacated_line, 3);
    }

    #[test]
    fn moves_block_down() {
        let out = move_block("a\nb\nc\nd", &[LineSpan::single(1)], 4, None).unwrap();
        assert_eq!(out.snapshot.text(), "b\nc\na\nd");
        assert_eq!(out.inserted, LineSpan::single(3));
        assert_eq!(out.vacated_line, 1);
    }

    #[test]
    fn moves_last_line_to_top() {
        let out = move_block("x\ny", &[LineSpan::single(2)], 1, None).unwrap();
        assert_eq!(out.snapshot.text(), "y\nx");
    }

    #[test]
    fn moves_to_document_end() {
        let out = move_block("a\nb\nc", &[LineSpan::single(1)], 4, None).unwrap();
        assert_eq!(out.snapshot.text(), "b\nc\na");
        assert_eq!(out.inserted, LineSpan::single(3));
    }

    #[test]
    fn list_subtree_moves_together() {
        let out = move_block("- a\n  - a1\n- b", &[LineSpan::single(1)], 4, None).unwrap();
        assert_eq!(out.snapshot.text(), "- b\n- a\n  - a1");
        assert_eq!(out.inserted, LineSpan::new(2, 3));
    }

    #[test]
    fn in_place_indent_is_one_replace() {
        let doc = "- a\n- b\n- c";
        let out = move_block(doc, &[LineSpan::single(2)], 2, Some(IndentIntent::Levels(1)))
            .unwrap();
        assert_eq!(out.snapshot.text(), "- a\n  - b\n- c");
        assert_eq!(out.changes.len(), 1);
        assert_eq!(out.inserted, LineSpan::single(2));
    }

    #[test]
    fn in_place_outdent_at_document_end() {
        let out = move_block("- a\n  - b", &[LineSpan::single(2)], 3, Some(IndentIntent::Width(0)))
            .unwrap();
        assert_eq!(out.snapshot.text(), "- a\n- b");
    }

    #[test]
    fn composite_ranges_are_gathered() {
        let out = move_block(
            "a\nb\nc\nd\ne",
            &[LineSpan::single(1), LineSpan::single(3)],
            6,
            None,
        )
        .unwrap();
        assert_eq!(out.snapshot.text(), "b\nd\ne\na\nc");
        assert_eq!(out.inserted, LineSpan::new(4, 5));
    }

    #[test]
    fn rejected_validation_does_not_commit() {
        let err = move_block("a\nb", &[LineSpan::single(1)], 1, None).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Rejected(RejectReason::SelfRangeBlocked)
        ));
    }

    #[test]
    fn separator_blank_is_part_of_inserted_span() {
        let out = move_block("> q\n\npara", &[LineSpan::single(3)], 2, None).unwrap();
        assert_eq!(out.snapshot.text(), "> q\n\npara\n");
        assert_eq!(out.inserted, LineSpan::new(2, 3));
    }
}
