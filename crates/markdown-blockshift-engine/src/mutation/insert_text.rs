use crate::blocks::{BlockInfo, BlockType};
use crate::document::LineSpan;
use crate::lines::kinds::{BlockQuote, ListMarker};
use crate::lines::{LineMeta, leading_width};
use crate::policy::DropValidationResult;
use crate::view::StructureView;

/// The lines around an insertion point, skipping the source's own lines.
#[derive(Debug, Clone, Copy)]
struct Neighbours {
    prev: LineMeta,
    next: LineMeta,
}

impl Neighbours {
    fn around(view: &StructureView<'_>, ranges: &[LineSpan], target: usize) -> Self {
        let inside = |line: usize| ranges.iter().any(|r| r.contains(line));
        let mut prev = target.saturating_sub(1);
        while prev > 0 && inside(prev) {
            prev -= 1;
        }
        let mut next = target;
        while next <= view.line_count() && inside(next) {
            next += 1;
        }
        Self {
            prev: view.meta(prev),
            next: view.meta(next),
        }
    }

    /// Quote depth content should take at the insertion point.
    fn quote_depth(&self) -> u8 {
        if self.prev.is_quote && self.next.is_quote {
            self.prev.quote_depth.min(self.next.quote_depth)
        } else {
            0
        }
    }
}

/// Builds the literal text inserted for `source` at the validated target.
///
/// The result carries no trailing line terminator. Quote-like, code, math and
/// table sources are copied verbatim. Other lines shift their quote depth by
/// the difference between the target depth and the source's own, and list
/// items are re-indented and re-marked per the plan. Lines inside unquoted
/// fenced regions are never re-quoted.
pub fn build_insert_text(
    view: &StructureView<'_>,
    source: &BlockInfo,
    validation: &DropValidationResult,
) -> String {
    let Some(target) = validation.target_line_number else {
        return source.content.clone();
    };
    let around = Neighbours::around(view, &source.ranges(), target);
    let depth = around.quote_depth();

    let body = match source.block_type {
        t if t.keeps_verbatim() => source.content.clone(),
        BlockType::ListItem => rewrite_list(view, source, validation, depth),
        _ => requote(view, source, depth),
    };

    let mut text = String::with_capacity(body.len() + 2);
    if around.prev.is_quote && !around.next.is_quote && !source.block_type.is_quote_like() {
        text.push('\n');
    }
    text.push_str(&body);
    if around.next.is_table && !around.prev.is_table {
        text.push('\n');
    }
    text
}

/// Document line numbers of the source's content lines, in content order.
fn source_lines(source: &BlockInfo) -> impl Iterator<Item = usize> {
    source.ranges().into_iter().flat_map(|r| r.start..=r.end)
}

fn fenced(view: &StructureView<'_>, line: usize) -> bool {
    view.detect_block(line)
        .is_some_and(|b| matches!(b.block_type, BlockType::CodeBlock | BlockType::MathBlock))
}

fn requote(view: &StructureView<'_>, source: &BlockInfo, depth: u8) -> String {
    let base = view.meta(source.start_line).quote_depth;
    if depth == base {
        return source.content.clone();
    }
    let shift = i16::from(depth) - i16::from(base);

    source
        .content
        .split('\n')
        .zip(source_lines(source))
        .map(|(text, line)| {
            if text.trim().is_empty() || fenced(view, line) {
                return text.to_string();
            }
            let (own, _) = BlockQuote::strip_prefixes(text);
            let shifted = (i16::from(own) + shift).clamp(0, i16::from(u8::MAX)) as u8;
            BlockQuote::with_depth(text, shifted)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn rewrite_list(
    view: &StructureView<'_>,
    source: &BlockInfo,
    validation: &DropValidationResult,
    depth: u8,
) -> String {
    let tab_width = view.tab_width();
    let style = view.indent_style();
    let delta = validation.list_indent_delta.unwrap_or(0);

    source
        .content
        .split('\n')
        .enumerate()
        .map(|(idx, line)| {
            if line.trim().is_empty() {
                return line.to_string();
            }
            let (_, quote_end) = BlockQuote::strip_prefixes(line);
            let remainder = &line[quote_end..];
            let (width, indent_bytes) = leading_width(remainder, tab_width);
            let new_width = (width as isize + delta).max(0) as usize;

            let mut body = remainder[indent_bytes..].to_string();
            if idx == 0 && width == source.indent_width {
                if let (Some(marker), Some(parsed)) = (
                    validation.list_marker,
                    ListMarker::parse(remainder, tab_width),
                ) {
                    body = format!("{}{}", marker.render(), &remainder[parsed.marker_span.end..]);
                }
            }

            let mut out = BlockQuote::prefix(depth);
            out.push_str(&style.render(new_width, tab_width));
            out.push_str(&body);
            out
        })
        .collect::<Vec<_>>()
        .join("\n")
}
