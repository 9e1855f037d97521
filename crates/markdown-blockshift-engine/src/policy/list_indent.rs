use serde::Serialize;

use crate::blocks::{BlockInfo, BlockType};
use crate::lines::IndentStyle;
use crate::lines::kinds::{ListLine, ListMarker};
use crate::view::StructureView;

use super::container::clamp_target;

/// A caller's request to change list nesting at the drop point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IndentIntent {
    /// Nest deeper (positive) or shallower (negative) than the list context,
    /// one indent unit per level.
    Levels(i32),
    /// Land at exactly this indent width.
    Width(usize),
}

/// Indentation and marker adjustments for moving a list item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListIndentPlan {
    pub target_indent_width: usize,
    /// Line whose list item the plan is relative to; 0 when there is none.
    pub list_context_line_number: usize,
    /// Signed width change applied to every source line.
    pub indent_delta: isize,
    /// Column width of one nesting level at the destination.
    pub indent_unit: usize,
    /// Replacement marker for the first line, or `None` to keep the source's.
    pub marker: Option<ListMarker>,
}

/// Parses the list marker of `line`, after its quote prefixes.
pub fn list_line(view: &StructureView<'_>, line: usize) -> Option<ListLine> {
    let text = view.line_text(line);
    let (_, remainder) = view.classifier().remainder(&text);
    ListMarker::parse(remainder, view.tab_width())
}

/// The list item the insertion point before `target` is relative to: the item
/// owning the line above, else a list item at `target` itself.
pub fn list_context_line(view: &StructureView<'_>, target: usize) -> usize {
    let t = clamp_target(view, target);
    match view.list_owner(t - 1) {
        0 if view.meta(t).is_list => t,
        owner => owner,
    }
}

/// Column width of one nesting level around `context` (0 for none).
pub fn indent_unit(view: &StructureView<'_>, context: usize, fallback: Option<&ListLine>) -> usize {
    if view.indent_style() == IndentStyle::Tabs {
        return view.tab_width();
    }
    let sample = if context != 0 {
        list_line(view, context)
    } else {
        None
    };
    sample
        .as_ref()
        .or(fallback)
        .map(|l| l.bullet_width)
        .unwrap_or(2)
}

/// Plans where a list item lands when dropped before `target`.
pub fn plan_list_indent(
    view: &StructureView<'_>,
    source: &BlockInfo,
    target: usize,
    intent: Option<IndentIntent>,
) -> ListIndentPlan {
    let t = clamp_target(view, target);
    let source_line = list_line(view, source.start_line);
    let context = list_context_line(view, t);
    let unit = indent_unit(view, context, source_line.as_ref());
    let base = if context == 0 {
        0
    } else {
        view.meta(context).indent_width
    };

    let target_indent_width = match intent {
        None => base,
        Some(IndentIntent::Levels(levels)) => {
            let shifted = base as i64 + i64::from(levels) * unit as i64;
            shifted.max(0) as usize
        }
        Some(IndentIntent::Width(width)) => width,
    };

    let marker = match (&source_line, source.block_type) {
        (Some(line), BlockType::ListItem) => sibling_at(view, context, t, target_indent_width)
            .and_then(|sibling| list_line(view, sibling))
            .map(|sibling| line.marker.retarget(&sibling.marker)),
        _ => None,
    };

    ListIndentPlan {
        target_indent_width,
        list_context_line_number: context,
        indent_delta: target_indent_width as isize - source.indent_width as isize,
        indent_unit: unit,
        marker,
    }
}

/// A list line at `width` that the moved item will sit beside.
fn sibling_at(view: &StructureView<'_>, context: usize, t: usize, width: usize) -> Option<usize> {
    if context != 0 {
        let chain = std::iter::once(context).chain(view.ancestors(context));
        for line in chain {
            let meta = view.meta(line);
            if meta.indent_width == width {
                return Some(line);
            }
            if meta.indent_width < width {
                break;
            }
        }
    }
    let at = view.meta(t);
    (at.is_list && at.indent_width == width).then_some(t)
}
