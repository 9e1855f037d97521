use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use crate::document::{DocumentSnapshot, LineSpan, SnapshotKey};
use crate::lines::IndentStyle;
use crate::lines::kinds::{FenceKind, Heading};
use crate::view::StructureView;

use super::fences::FenceIndex;
use super::types::{BlockInfo, BlockType, normalize_ranges};

#[derive(Debug, Default)]
struct Memo {
    key: Option<SnapshotKey>,
    blocks: HashMap<usize, Option<Arc<BlockInfo>>>,
    fences: Option<Arc<FenceIndex>>,
    indent_style: Option<IndentStyle>,
}

impl Memo {
    /// Drops everything derived from a previous snapshot.
    fn sync(&mut self, key: SnapshotKey) {
        if self.key == Some(key) {
            return;
        }
        if let Some(old) = self.key {
            log::debug!(
                "block memo invalidated: version {} -> {}",
                old.version,
                key.version
            );
        }
        *self = Memo {
            key: Some(key),
            ..Memo::default()
        };
    }
}

/// Expands a line to the block that owns it.
///
/// Results are memoised per snapshot, tab width and line, since one drag
/// gesture probes the same lines on every frame. The memo is cleared wholesale
/// when it reaches `capacity` and whenever a different snapshot is probed.
#[derive(Debug)]
pub struct BlockDetector {
    capacity: usize,
    memo: RefCell<Memo>,
}

impl BlockDetector {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            memo: RefCell::new(Memo::default()),
        }
    }

    /// Forgets all memoised results.
    pub fn clear(&self) {
        *self.memo.borrow_mut() = Memo::default();
    }

    /// Number of memoised lines for the current snapshot.
    pub fn memo_len(&self) -> usize {
        self.memo.borrow().blocks.len()
    }

    pub fn detect(&self, view: &StructureView<'_>, line: usize) -> Option<Arc<BlockInfo>> {
        if line == 0 || line > view.line_count() {
            return None;
        }
        let key = view.snapshot().key(view.tab_width());
        {
            let mut memo = self.memo.borrow_mut();
            memo.sync(key);
            if let Some(hit) = memo.blocks.get(&line) {
                return hit.clone();
            }
        }

        let fences = self.fences(view.snapshot(), key);
        let detected = compute(view, &fences, line).map(Arc::new);

        let mut memo = self.memo.borrow_mut();
        if memo.blocks.len() >= self.capacity {
            log::debug!("block memo full ({} entries), clearing", memo.blocks.len());
            memo.blocks.clear();
        }
        memo.blocks.insert(line, detected.clone());
        detected
    }

    /// Builds a multi-range source from `ranges`.
    ///
    /// Ranges are clamped, sorted and merged. A selection that collapses to
    /// one range is an ordinary block over that range.
    pub fn composite(&self, view: &StructureView<'_>, ranges: &[LineSpan]) -> Option<BlockInfo> {
        let n = view.line_count();
        let clamped: Vec<LineSpan> = ranges
            .iter()
            .filter(|r| r.start <= n && r.end >= 1)
            .map(|r| LineSpan::new(r.start.max(1), r.end.min(n)))
            .collect();
        let merged = normalize_ranges(&clamped);
        let first = *merged.first()?;
        let last = *merged.last()?;

        let lead = self.detect(view, first.start);
        let block_type = lead
            .as_ref()
            .map(|b| b.block_type)
            .unwrap_or(BlockType::Paragraph);
        let indent_level = lead.as_ref().map(|b| b.indent_level).unwrap_or(0);
        let indent_width = view.meta(first.start).indent_width;

        if merged.len() == 1 {
            if let Some(block) = lead.filter(|b| b.span() == first) {
                return Some((*block).clone());
            }
            return Some(make_block(
                view,
                block_type,
                first.start,
                first.end,
                indent_level,
            ));
        }

        let snapshot = view.snapshot();
        let content = merged
            .iter()
            .map(|r| span_text(snapshot, *r))
            .collect::<Vec<_>>()
            .join("\n");
        Some(BlockInfo {
            block_type,
            start_line: first.start,
            end_line: last.end,
            from_offset: line_from(snapshot, first.start),
            to_offset: line_to(snapshot, last.end),
            indent_level,
            indent_width,
            content,
            composite_selection: Some(merged),
        })
    }

    /// Indentation style of `snapshot`, computed once per snapshot.
    pub fn indent_style(&self, snapshot: &DocumentSnapshot, tab_width: usize) -> IndentStyle {
        let mut memo = self.memo.borrow_mut();
        memo.sync(snapshot.key(tab_width));
        if let Some(style) = memo.indent_style {
            return style;
        }
        let style = snapshot
            .lines()
            .find(|l| !l.text.trim().is_empty() && l.text.starts_with([' ', '\t']))
            .map(|l| IndentStyle::detect([l.text.as_str()]))
            .unwrap_or_default();
        memo.indent_style = Some(style);
        style
    }

    fn fences(&self, snapshot: &DocumentSnapshot, key: SnapshotKey) -> Arc<FenceIndex> {
        let mut memo = self.memo.borrow_mut();
        memo.sync(key);
        memo.fences
            .get_or_insert_with(|| Arc::new(FenceIndex::build(snapshot)))
            .clone()
    }
}

fn compute(view: &StructureView<'_>, fences: &FenceIndex, line: usize) -> Option<BlockInfo> {
    let meta = view.meta(line);
    if meta.is_empty {
        return None;
    }

    if let Some(fence) = fences.containing(line) {
        let block_type = match fence.kind {
            FenceKind::Math => BlockType::MathBlock,
            FenceKind::Backticks | FenceKind::Tildes => BlockType::CodeBlock,
        };
        return Some(make_block(view, block_type, fence.start, fence.end, 0));
    }

    if meta.is_quote {
        if let Some(header) = callout_header(view, line) {
            let end = callout_end(view, header);
            return Some(make_block(view, BlockType::Callout, header, end, 0));
        }
    }

    if meta.is_list {
        let end = view.list_subtree_end(line);
        let depth = view.list_depth(line);
        return Some(make_block(view, BlockType::ListItem, line, end, depth));
    }

    if meta.is_quote {
        return Some(make_block(view, BlockType::Blockquote, line, line, 0));
    }

    if meta.is_table {
        let is_row = |n: usize| view.meta(n).is_table;
        let mut start = line;
        while start > 1 && is_row(start - 1) {
            start -= 1;
        }
        let mut end = line;
        while end < view.line_count() && is_row(end + 1) {
            end += 1;
        }
        return Some(make_block(view, BlockType::Table, start, end, 0));
    }

    if meta.is_hr {
        return Some(make_block(view, BlockType::HorizontalRule, line, line, 0));
    }

    if let Some(level) = Heading::level(&view.line_text(line)) {
        let end = heading_section_end(view, fences, line, level);
        return Some(make_block(view, BlockType::Heading, line, end, 0));
    }

    Some(make_block(view, BlockType::Paragraph, line, line, 0))
}

/// Nearest callout header governing a quote line: reached through contiguous
/// quote lines, none of them shallower than the header.
fn callout_header(view: &StructureView<'_>, line: usize) -> Option<usize> {
    let mut min_depth = u8::MAX;
    for j in (1..=line).rev() {
        let m = view.meta(j);
        if !m.is_quote {
            return None;
        }
        min_depth = min_depth.min(m.quote_depth);
        if m.is_callout && m.quote_depth <= min_depth {
            return Some(j);
        }
    }
    None
}

fn callout_end(view: &StructureView<'_>, header: usize) -> usize {
    let depth = view.meta(header).quote_depth;
    let mut end = header;
    while end < view.line_count() {
        let m = view.meta(end + 1);
        if !m.is_quote || m.quote_depth < depth {
            break;
        }
        end += 1;
    }
    end
}

/// Last non-blank line before the next heading of `level` or higher, skipping
/// fenced regions.
fn heading_section_end(
    view: &StructureView<'_>,
    fences: &FenceIndex,
    line: usize,
    level: u8,
) -> usize {
    let n = view.line_count();
    let mut k = line + 1;
    while k <= n {
        if let Some(fence) = fences.containing(k) {
            k = fence.end + 1;
            continue;
        }
        if Heading::level(&view.line_text(k)).is_some_and(|l| l <= level) {
            break;
        }
        k += 1;
    }
    view.prev_non_empty(k).max(line)
}

fn make_block(
    view: &StructureView<'_>,
    block_type: BlockType,
    start: usize,
    end: usize,
    indent_level: usize,
) -> BlockInfo {
    let snapshot = view.snapshot();
    BlockInfo {
        block_type,
        start_line: start,
        end_line: end,
        from_offset: line_from(snapshot, start),
        to_offset: line_to(snapshot, end),
        indent_level,
        indent_width: view.meta(start).indent_width,
        content: span_text(snapshot, LineSpan::new(start, end)),
        composite_selection: None,
    }
}

fn line_from(snapshot: &DocumentSnapshot, line: usize) -> usize {
    snapshot.line(line).map(|l| l.from).unwrap_or(0)
}

fn line_to(snapshot: &DocumentSnapshot, line: usize) -> usize {
    snapshot.line(line).map(|l| l.to).unwrap_or(snapshot.len())
}

/// Text of `span` in `snapshot`, without the final line terminator.
pub(crate) fn span_text(snapshot: &DocumentSnapshot, span: LineSpan) -> String {
    snapshot
        .slice(line_from(snapshot, span.start)..line_to(snapshot, span.end))
        .into_owned()
}
