//! Map-free scans over line metadata.
//!
//! Used when no [`LineMap`](super::line_map::LineMap) has been built for a
//! snapshot. Every function here answers exactly what the corresponding
//! `LineMap` index would; `meta` must treat out-of-range lines as empty.

use super::classify::LineMeta;

pub fn prev_non_empty(meta: impl Fn(usize) -> LineMeta, line: usize) -> usize {
    (1..line).rev().find(|&j| !meta(j).is_empty).unwrap_or(0)
}

pub fn next_non_empty(meta: impl Fn(usize) -> LineMeta, line_count: usize, line: usize) -> usize {
    (line + 1..=line_count)
        .find(|&j| !meta(j).is_empty)
        .unwrap_or(0)
}

pub fn prev_list_line(meta: impl Fn(usize) -> LineMeta, line: usize) -> usize {
    (1..line).rev().find(|&j| meta(j).is_list).unwrap_or(0)
}

/// Nearest preceding list line that still has `line` open beneath it.
///
/// Every non-blank line between the parent and `line` must sit at the same
/// quote depth and deeper than the parent.
pub fn list_parent(meta: impl Fn(usize) -> LineMeta, line: usize) -> usize {
    let own = meta(line);
    if !own.is_list {
        return 0;
    }
    let mut bound = own.indent_width;
    for j in (1..line).rev() {
        if bound == 0 {
            return 0;
        }
        let m = meta(j);
        if m.is_empty {
            continue;
        }
        if m.quote_depth != own.quote_depth {
            return 0;
        }
        if m.is_list && m.indent_width < bound {
            return j;
        }
        bound = bound.min(m.indent_width);
    }
    0
}

/// Last non-blank line of the subtree opened by `line`, or `line` itself for
/// non-list lines.
pub fn list_subtree_end(meta: impl Fn(usize) -> LineMeta, line_count: usize, line: usize) -> usize {
    let own = meta(line);
    if !own.is_list {
        return line;
    }
    let mut end = line;
    for k in line + 1..=line_count {
        let m = meta(k);
        if m.is_empty {
            continue;
        }
        if m.quote_depth != own.quote_depth || m.indent_width <= own.indent_width {
            break;
        }
        end = k;
    }
    end
}
