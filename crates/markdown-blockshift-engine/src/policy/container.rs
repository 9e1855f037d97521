use std::sync::Arc;

use crate::blocks::{BlockInfo, BlockType};
use crate::view::StructureView;

use super::rules::SlotContext;

/// A slot context together with the list container that produced it.
#[derive(Debug, Clone)]
pub struct SlotResolution {
    /// The insertion line after clamping to `[1, lines + 1]`.
    pub target_line: usize,
    pub context: SlotContext,
    /// The enclosing list item when `context` is [`SlotContext::InsideList`].
    pub container: Option<Arc<BlockInfo>>,
}

/// Clamps an insertion line to `[1, lines + 1]`.
pub fn clamp_target(view: &StructureView<'_>, target: usize) -> usize {
    target.clamp(1, view.line_count() + 1)
}

/// Classifies the insertion point directly before line `target`.
pub fn resolve_slot(view: &StructureView<'_>, target: usize) -> SlotResolution {
    let t = clamp_target(view, target);
    let prev = view.meta(t - 1);
    let next = view.meta(t);

    let context = if prev.is_quote && !next.is_quote && ends_callout(view, t - 1) {
        SlotContext::CalloutAfter
    } else if next.is_table {
        SlotContext::TableBefore
    } else if next.is_hr {
        SlotContext::HrBefore
    } else if prev.is_quote && next.is_quote {
        SlotContext::InsideQuoteRun
    } else if prev.is_quote {
        SlotContext::QuoteAfter
    } else if next.is_quote {
        SlotContext::QuoteBefore
    } else if let Some(item) = enclosing_list_item(view, t) {
        log::trace!("slot before line {t}: inside_list (container line {item})");
        return SlotResolution {
            target_line: t,
            context: SlotContext::InsideList,
            container: view.detect_block(item),
        };
    } else {
        SlotContext::Outside
    };

    log::trace!("slot before line {t}: {context}");
    SlotResolution {
        target_line: t,
        context,
        container: None,
    }
}

pub fn resolve_slot_context(view: &StructureView<'_>, target: usize) -> SlotContext {
    resolve_slot(view, target).context
}

/// The list item enclosing the insertion point, when the slot is inside a list.
pub fn container_context_at_insertion(
    view: &StructureView<'_>,
    target: usize,
) -> Option<Arc<BlockInfo>> {
    resolve_slot(view, target).container
}

fn ends_callout(view: &StructureView<'_>, line: usize) -> bool {
    view.detect_block(line)
        .is_some_and(|b| b.block_type == BlockType::Callout && b.end_line == line)
}

/// Innermost list item with a body such that `start < t <= end + 1`.
///
/// Candidates around `t` are expanded through their ancestor chains so that a
/// slot below a deep child still sees the item that owns it.
fn enclosing_list_item(view: &StructureView<'_>, t: usize) -> Option<usize> {
    let n = view.line_count();
    let candidates = [
        t - 1,
        t,
        t + 1,
        view.prev_non_empty(t - 1),
        view.next_non_empty(t),
    ];

    let mut best: Option<usize> = None;
    for candidate in candidates {
        if candidate == 0 || candidate > n {
            continue;
        }
        let mut item = view.list_owner(candidate);
        while item != 0 {
            let end = view.list_subtree_end(item);
            if end > item && item < t && t <= end + 1 {
                if best.is_none_or(|b| item > b) {
                    best = Some(item);
                }
                break;
            }
            item = view.list_parent(item);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::BlockDetector;
    use crate::document::DocumentSnapshot;
    use crate::lines::{LineClassifier, LineMap};
    use rstest::rstest;

    fn slot(text: &str, target: usize) -> SlotContext {
        let doc = DocumentSnapshot::from_text(text);
        let classifier = LineClassifier::new(4);
        let map = LineMap::build(&doc, classifier);
        let blocks = BlockDetector::new(64);
        let view = StructureView::new(&doc, Some(&map), classifier, &blocks);
        resolve_slot_context(&view, target)
    }

    #[rstest]
    #[case("- a\n- b", 2, SlotContext::Outside)]
    #[case("> line 1\n> line 2", 2, SlotContext::InsideQuoteRun)]
    #[case("| h |\n| - |\n| v |", 1, SlotContext::TableBefore)]
    #[case("| h |\n| - |\n| v |", 2, SlotContext::TableBefore)]
    #[case("| h |\n| - |\n| v |", 4, SlotContext::Outside)]
    #[case("text\n---", 2, SlotContext::HrBefore)]
    #[case("text\n> q", 2, SlotContext::QuoteBefore)]
    #[case("text\n> | x |", 2, SlotContext::QuoteBefore)]
    #[case("> a\n> | x |", 2, SlotContext::InsideQuoteRun)]
    #[case("> q\ntext", 2, SlotContext::QuoteAfter)]
    #[case("> [!note]\n> body\ntext", 3, SlotContext::CalloutAfter)]
    #[case("> [!note]\n> body", 3, SlotContext::CalloutAfter)]
    #[case("- root\n  - child\n- sibling", 1, SlotContext::Outside)]
    #[case("- root\n  - child\n- sibling", 2, SlotContext::InsideList)]
    #[case("- root\n  - child\n- sibling", 3, SlotContext::InsideList)]
    #[case("- root\n  - child\n- sibling", 4, SlotContext::Outside)]
    fn slot_contexts(#[case] text: &str, #[case] target: usize, #[case] expected: SlotContext) {
        assert_eq!(slot(text, target), expected);
    }

    #[test]
    fn out_of_range_targets_clamp() {
        assert_eq!(slot("| a |", 0), SlotContext::TableBefore);
        assert_eq!(slot("| a |", 99), SlotContext::Outside);
    }

    #[test]
    fn container_is_innermost_item() {
        let doc = DocumentSnapshot::from_text("- a\n  - b\n    - c\n  - d");
        let classifier = LineClassifier::new(4);
        let blocks = BlockDetector::new(64);
        let view = StructureView::new(&doc, None, classifier, &blocks);

        let inner = container_context_at_insertion(&view, 3).unwrap();
        assert_eq!((inner.start_line, inner.end_line), (2, 3));

        let outer = container_context_at_insertion(&view, 4).unwrap();
        assert_eq!((outer.start_line, outer.end_line), (2, 3));

        let root = container_context_at_insertion(&view, 5).unwrap();
        assert_eq!((root.start_line, root.end_line), (1, 4));

        assert!(container_context_at_insertion(&view, 1).is_none());
    }
}
