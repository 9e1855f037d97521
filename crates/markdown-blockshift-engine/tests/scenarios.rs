use markdown_blockshift_engine::policy::resolve_insertion_rule;
use markdown_blockshift_engine::{
    BlockType, DocumentSnapshot, EngineSettings, RejectReason, RelocationEngine, SlotContext,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn engine(lines: &[&str]) -> RelocationEngine {
    RelocationEngine::new(
        DocumentSnapshot::from_text(&lines.join("\n")),
        EngineSettings::default(),
    )
}

#[test]
fn top_level_siblings_are_not_inside_each_other() {
    let engine = engine(&["- a", "- b"]);
    assert_eq!(engine.slot_context(2), SlotContext::Outside);

    let rule = resolve_insertion_rule(BlockType::ListItem, SlotContext::Outside);
    assert!(rule.allow_drop);
}

#[test]
fn list_item_drops_between_top_level_siblings() {
    let engine = engine(&["- a", "- b", "", "- c"]);
    let source = engine.detect_block(4).unwrap();

    let verdict = engine.validate_drop(&source, 2, None);

    assert!(verdict.allowed);
    assert_eq!(verdict.slot_context, Some(SlotContext::Outside));
    assert_eq!(verdict.target_line_number, Some(2));
}

#[test]
fn paragraph_cannot_split_a_quote_run() {
    let engine = engine(&["> line 1", "> line 2", "", "para"]);
    let source = engine.detect_block(4).unwrap();

    let verdict = engine.validate_drop(&source, 2, None);

    assert!(!verdict.allowed);
    assert_eq!(verdict.slot_context, Some(SlotContext::InsideQuoteRun));
    assert_eq!(verdict.reason, Some(RejectReason::InsideQuoteRun));
}

#[rstest]
#[case(BlockType::Paragraph)]
#[case(BlockType::ListItem)]
#[case(BlockType::Heading)]
#[case(BlockType::Blockquote)]
#[case(BlockType::Table)]
fn nothing_lands_directly_before_a_table(#[case] source: BlockType) {
    let engine = engine(&["| h |", "| - |", "| v |"]);
    assert_eq!(engine.slot_context(1), SlotContext::TableBefore);

    let rule = resolve_insertion_rule(source, SlotContext::TableBefore);
    assert!(!rule.allow_drop);
    assert_eq!(rule.reject_reason, Some(RejectReason::TableBefore));
}

#[rstest]
#[case(1, true, None)]
#[case(3, false, Some(RejectReason::InsideList))]
#[case(4, true, None)]
fn paragraph_around_a_nested_list(
    #[case] target: usize,
    #[case] allowed: bool,
    #[case] reason: Option<RejectReason>,
) {
    let engine = engine(&["- root", "  - child", "- sibling", "", "para"]);
    let source = engine.detect_block(5).unwrap();
    assert_eq!(source.block_type, BlockType::Paragraph);

    let verdict = engine.validate_drop(&source, target, None);

    assert_eq!(verdict.allowed, allowed);
    assert_eq!(verdict.reason, reason);
}

#[rstest]
#[case(1, SlotContext::Outside)]
#[case(2, SlotContext::InsideList)]
#[case(3, SlotContext::InsideList)]
#[case(4, SlotContext::Outside)]
fn slots_of_a_nested_list(#[case] target: usize, #[case] expected: SlotContext) {
    let engine = engine(&["- root", "  - child", "- sibling"]);
    assert_eq!(engine.slot_context(target), expected);
}

#[test]
fn inside_list_exposes_its_container() {
    let engine = engine(&["- root", "  - child", "- sibling"]);

    let container = engine.container_context_at_insertion(3).unwrap();

    assert_eq!(container.block_type, BlockType::ListItem);
    assert_eq!((container.start_line, container.end_line), (1, 2));
    assert!(engine.container_context_at_insertion(4).is_none());
}

#[test]
fn nothing_lands_directly_after_a_callout() {
    let engine = engine(&["> [!note] Title", "> body", "", "para"]);
    let source = engine.detect_block(4).unwrap();

    let callout = engine.detect_block(2).unwrap();
    assert_eq!(callout.block_type, BlockType::Callout);
    assert_eq!((callout.start_line, callout.end_line), (1, 2));

    let verdict = engine.validate_drop(&source, 3, None);
    assert_eq!(verdict.slot_context, Some(SlotContext::CalloutAfter));
    assert_eq!(verdict.reason, Some(RejectReason::CalloutAfter));
}

#[test]
fn callout_cannot_touch_a_bare_quote() {
    let engine = engine(&["> quoted", "", "> [!tip] Hint", "> more"]);
    let callout = engine.detect_block(3).unwrap();

    let verdict = engine.validate_drop(&callout, 2, None);

    assert_eq!(verdict.slot_context, Some(SlotContext::QuoteAfter));
    assert_eq!(verdict.reason, Some(RejectReason::QuoteBoundary));
}

#[test]
fn nothing_lands_directly_before_a_rule() {
    let engine = engine(&["para", "", "---", "end"]);
    let source = engine.detect_block(1).unwrap();

    let verdict = engine.validate_drop(&source, 3, None);

    assert_eq!(verdict.reason, Some(RejectReason::HrBefore));
    assert!(engine.validate_drop(&source, 4, None).allowed);
}

#[test]
fn bare_quote_lines_are_separately_draggable() {
    let engine = engine(&["> one", "> two", "> three"]);
    let source = engine.detect_block(3).unwrap();
    assert_eq!(source.block_type, BlockType::Blockquote);
    assert_eq!(source.line_count(), 1);

    let verdict = engine.validate_drop(&source, 2, None);

    assert!(verdict.allowed);
    assert_eq!(verdict.slot_context, Some(SlotContext::InsideQuoteRun));
}

#[test]
fn fenced_code_is_one_block_from_any_line() {
    let engine = engine(&["intro", "```rust", "- not a list", "```", "outro"]);

    for line in 2..=4 {
        let block = engine.detect_block(line).unwrap();
        assert_eq!(block.block_type, BlockType::CodeBlock);
        assert_eq!((block.start_line, block.end_line), (2, 4));
    }
    assert_eq!(engine.detect_block(5).unwrap().block_type, BlockType::Paragraph);
}

#[test]
fn plain_same_position_drop_is_a_no_op() {
    let engine = engine(&["- a", "- b", "- c"]);
    let source = engine.detect_block(2).unwrap();

    for target in [2, 3] {
        let verdict = engine.validate_drop(&source, target, None);
        assert_eq!(verdict.reason, Some(RejectReason::SelfRangeBlocked));
        assert_eq!(verdict.slot_context, None);
    }
}
