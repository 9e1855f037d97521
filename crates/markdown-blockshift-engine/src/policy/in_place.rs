use serde::Serialize;

use crate::blocks::{BlockInfo, BlockType};
use crate::lines::kinds::ListMarker;
use crate::view::StructureView;

use super::container::{clamp_target, resolve_slot};
use super::list_indent::{IndentIntent, ListIndentPlan, plan_list_indent};
use super::rules::{RejectReason, SlotContext, resolve_insertion_rule};

/// Verdict for dropping a source block before a target line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DropValidationResult {
    pub allowed: bool,
    pub reason: Option<RejectReason>,
    pub target_line_number: Option<usize>,
    pub list_context_line_number: Option<usize>,
    pub list_indent_delta: Option<isize>,
    pub list_target_indent_width: Option<usize>,
    /// Slot classification; absent for drops inside the source's own range.
    pub slot_context: Option<SlotContext>,
    /// Marker the first source line takes at the destination, if it changes.
    pub list_marker: Option<ListMarker>,
}

impl DropValidationResult {
    /// A refusal that carries no target information.
    pub fn rejected(reason: RejectReason) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
            target_line_number: None,
            list_context_line_number: None,
            list_indent_delta: None,
            list_target_indent_width: None,
            slot_context: None,
            list_marker: None,
        }
    }

    fn new(
        allowed: bool,
        reason: Option<RejectReason>,
        target: usize,
        plan: Option<ListIndentPlan>,
        slot_context: Option<SlotContext>,
    ) -> Self {
        let (context, delta, width, marker) = match plan {
            Some(p) => (
                (p.list_context_line_number != 0).then_some(p.list_context_line_number),
                Some(p.indent_delta),
                Some(p.target_indent_width),
                p.marker,
            ),
            None => (None, None, None, None),
        };
        Self {
            allowed,
            reason,
            target_line_number: Some(target),
            list_context_line_number: context,
            list_indent_delta: delta,
            list_target_indent_width: width,
            slot_context,
            list_marker: marker,
        }
    }
}

/// Decides whether `source` may be dropped before line `target`.
///
/// Targets outside the source's own lines go straight to the insertion
/// matrix. Targets within `[start, end + 1]` of any source range are a no-op
/// unless a list item changes its indentation in a way that is not a
/// self-nesting.
pub fn validate_drop(
    view: &StructureView<'_>,
    source: &BlockInfo,
    target: usize,
    intent: Option<IndentIntent>,
) -> DropValidationResult {
    let t = clamp_target(view, target);
    let is_list = source.block_type == BlockType::ListItem;
    let plan = is_list.then(|| plan_list_indent(view, source, t, intent));

    let ranges = source.ranges();
    let Some(own) = ranges.iter().find(|r| r.start <= t && t <= r.end + 1).copied() else {
        let slot = resolve_slot(view, t);
        let rule = resolve_insertion_rule(source.block_type, slot.context);
        log::trace!(
            "drop before line {t}: {} ({})",
            if rule.allow_drop { "allowed" } else { "rejected" },
            slot.context
        );
        return DropValidationResult::new(
            rule.allow_drop,
            rule.reject_reason,
            t,
            plan,
            Some(slot.context),
        );
    };

    let (Some(plan), Some(_)) = (plan, intent) else {
        log::trace!("drop before line {t}: self range without indent change");
        return DropValidationResult::new(false, Some(RejectReason::SelfRangeBlocked), t, None, None);
    };

    let source_width = source.indent_width;
    let width = plan.target_indent_width;
    let context = plan.list_context_line_number;

    let context_in_source = context != 0 && ranges.iter().any(|r| r.contains(context));
    if context_in_source && width > source_width {
        log::trace!("drop before line {t}: would nest inside itself");
        return DropValidationResult::new(false, Some(RejectReason::SelfEmbedding), t, Some(plan), None);
    }

    let after_end = t == own.end + 1 && width != source_width;
    let at_start = t == own.start && width != source_width && context != own.start;
    let outdent_before = t <= own.start && width < source_width;

    if after_end || at_start || outdent_before {
        log::trace!("drop before line {t}: in-place indent change to {width}");
        DropValidationResult::new(true, None, t, Some(plan), None)
    } else {
        DropValidationResult::new(false, Some(RejectReason::SelfRangeBlocked), t, Some(plan), None)
    }
}
