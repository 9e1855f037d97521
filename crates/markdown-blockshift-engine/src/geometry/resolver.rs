use crate::blocks::{BlockInfo, BlockType};
use crate::lines::kinds::BlockQuote;
use crate::policy::list_indent::{indent_unit, list_context_line, list_line};
use crate::policy::{IndentIntent, RejectReason};
use crate::view::StructureView;

use super::cache::{TargetCache, TargetKey};
use super::{LineGeometry, PointerPosition};

/// A pointer position resolved to an insertion point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedTarget {
    /// Insert before this line; `lines + 1` appends.
    pub target_line: usize,
    /// The line under the pointer.
    pub probed_line: usize,
    /// Indent width a list item source should land at.
    pub intent: Option<IndentIntent>,
    /// The pointer sat past the probed list item's content start.
    pub child_intent: bool,
}

/// Resolves pointer positions to targets, caching list refinement per gesture.
#[derive(Debug)]
pub struct TargetResolver {
    cache: TargetCache,
}

impl TargetResolver {
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: TargetCache::new(capacity),
        }
    }

    /// Starts a new pointer session.
    pub fn begin_gesture(&mut self) {
        self.cache.clear();
    }

    pub fn cache(&self) -> &TargetCache {
        &self.cache
    }

    pub fn resolve(
        &mut self,
        view: &StructureView<'_>,
        geometry: &dyn LineGeometry,
        pointer: PointerPosition,
        source: &BlockInfo,
    ) -> Result<ResolvedTarget, RejectReason> {
        let line = geometry
            .line_at(pointer.y)
            .filter(|&l| l >= 1 && l <= view.line_count())
            .ok_or(RejectReason::NoTarget)?;
        let rect = geometry.line_rect(line).ok_or(RejectReason::NoAnchor)?;
        let char_width = geometry.char_width();

        let meta = view.meta(line);
        let mut target = if meta.is_empty || pointer.y < rect.mid_y() {
            line
        } else {
            line + 1
        };

        let mut child_intent = false;
        let mut forced_line = 0;
        if meta.is_list {
            if let Some(parsed) = list_line(view, line) {
                let quote_cols = BlockQuote::prefix(meta.quote_depth).len();
                let content_col = quote_cols + parsed.indent_width + parsed.marker_span.len();
                if pointer.x > rect.left + content_col as f32 * char_width {
                    child_intent = true;
                    target = line + 1;
                    forced_line = target;
                }
            }
        }

        if source.block_type != BlockType::ListItem {
            return Ok(ResolvedTarget {
                target_line: target,
                probed_line: line,
                intent: None,
                child_intent,
            });
        }

        let snapshot_key = view.snapshot().key(view.tab_width());
        let key = TargetKey {
            target_line: target,
            probed_line: line,
            forced_line,
            child_intent,
            x_bucket: x_bucket(pointer.x - rect.left, char_width),
            source: (source.from_offset, source.to_offset),
        };
        if let Some(hit) = self.cache.get(snapshot_key, &key) {
            return Ok(hit);
        }

        let resolved = ResolvedTarget {
            target_line: target,
            probed_line: line,
            intent: refine_list_width(view, rect.left, char_width, pointer.x, line, target),
            child_intent,
        };
        log::trace!(
            "pointer at line {line} resolved to target {target} ({:?})",
            resolved.intent
        );
        self.cache.insert(snapshot_key, key, resolved);
        Ok(resolved)
    }
}

fn x_bucket(offset: f32, char_width: f32) -> i64 {
    if char_width > 0.0 {
        (offset / char_width).floor() as i64
    } else {
        offset.floor() as i64
    }
}

/// Picks the nesting slot nearest the pointer among the base item's own
/// marker, a child slot one unit deeper and each ancestor's marker, then
/// clamps it between the neighbouring items.
///
/// The base is the probed line when it is a list item, else the list context
/// of the target.
fn refine_list_width(
    view: &StructureView<'_>,
    left: f32,
    char_width: f32,
    x: f32,
    probed: usize,
    target: usize,
) -> Option<IndentIntent> {
    let base = if view.meta(probed).is_list {
        probed
    } else {
        list_context_line(view, target)
    };
    if base == 0 {
        return None;
    }
    let unit = indent_unit(view, base, None);
    let base_meta = view.meta(base);

    let prev_context = view.list_owner(target - 1);
    let upper = if prev_context == 0 {
        0
    } else {
        view.meta(prev_context).indent_width + unit
    };
    let next_line = view.next_non_empty(target - 1);
    let lower = if next_line != 0 && view.meta(next_line).is_list {
        view.meta(next_line).indent_width.saturating_sub(unit)
    } else {
        0
    };

    let quote_cols = BlockQuote::prefix(base_meta.quote_depth).len();
    let project = |width: usize| left + (quote_cols + width) as f32 * char_width;

    let mut candidates = vec![base_meta.indent_width];
    let child = base_meta.indent_width + unit;
    if child <= upper {
        candidates.push(child);
    }
    candidates.extend(
        view.ancestors(base)
            .into_iter()
            .map(|a| view.meta(a).indent_width),
    );

    let mut best = base_meta.indent_width;
    let mut best_distance = f32::INFINITY;
    for width in candidates {
        let distance = (project(width) - x).abs();
        if distance < best_distance {
            best = width;
            best_distance = distance;
        }
    }

    Some(IndentIntent::Width(best.max(lower).min(upper)))
}
