use std::collections::BTreeSet;

use crate::document::TextEdit;
use crate::lines::kinds::{ListLine, MarkerKind};
use crate::policy::list_indent::list_line;
use crate::view::StructureView;

/// An ordered list line with the parts renumbering needs.
struct Ordered {
    line: usize,
    number: u64,
    delimiter: char,
    indent_width: usize,
    quote_depth: u8,
}

fn ordered(view: &StructureView<'_>, line: usize) -> Option<Ordered> {
    let meta = view.meta(line);
    if !meta.is_list {
        return None;
    }
    let parsed: ListLine = list_line(view, line)?;
    match parsed.marker.kind {
        MarkerKind::Ordered { number, delimiter } => Some(Ordered {
            line,
            number,
            delimiter,
            indent_width: meta.indent_width,
            quote_depth: meta.quote_depth,
        }),
        MarkerKind::Bullet(_) => None,
    }
}

/// Whether `line` continues a run of `seed`'s siblings, ends it, or is skipped.
enum Step {
    Member(Ordered),
    Skip,
    Stop,
}

fn step(view: &StructureView<'_>, seed: &Ordered, line: usize) -> Step {
    let meta = view.meta(line);
    if meta.is_empty {
        return Step::Skip;
    }
    if meta.quote_depth != seed.quote_depth || meta.indent_width < seed.indent_width {
        return Step::Stop;
    }
    if meta.indent_width > seed.indent_width {
        return Step::Skip;
    }
    match ordered(view, line) {
        Some(o) if o.delimiter == seed.delimiter => Step::Member(o),
        _ => Step::Stop,
    }
}

/// Renumbers the ordered sibling runs touching any of `anchors` from `1`.
///
/// For each anchor the lines directly above and at it seed a run; runs walk
/// over blank and deeper lines. Only markers whose number changes are edited.
pub fn renumber_ordered_runs(view: &StructureView<'_>, anchors: &[usize]) -> Vec<TextEdit> {
    let n = view.line_count();
    let mut seen = BTreeSet::new();
    let mut edits = Vec::new();

    let seeds = anchors
        .iter()
        .flat_map(|&a| [a.saturating_sub(1), a])
        .filter(|&l| l >= 1 && l <= n);

    for seed_line in seeds {
        let Some(seed) = ordered(view, seed_line) else {
            continue;
        };

        let mut start = seed.line;
        for line in (1..seed.line).rev() {
            match step(view, &seed, line) {
                Step::Member(o) => start = o.line,
                Step::Skip => {}
                Step::Stop => break,
            }
        }
        if !seen.insert(start) {
            continue;
        }

        let mut members = vec![];
        for line in start..=n {
            match step(view, &seed, line) {
                Step::Member(o) => members.push(o),
                Step::Skip => {}
                Step::Stop => break,
            }
        }

        for (idx, member) in members.iter().enumerate() {
            let expected = idx as u64 + 1;
            if member.number == expected {
                continue;
            }
            if let Some(edit) = number_edit(view, member.line, expected) {
                edits.push(edit);
            }
        }
    }
    edits.sort_by_key(|e| e.range.start);
    edits
}

fn number_edit(view: &StructureView<'_>, line: usize, number: u64) -> Option<TextEdit> {
    let line_ref = view.snapshot().line(line)?;
    let (_, remainder) = view.classifier().remainder(&line_ref.text);
    let quote_bytes = line_ref.text.len() - remainder.len();
    let digits = list_line(view, line)?.number?;
    let from = line_ref.from + quote_bytes;
    Some(TextEdit::replace(
        from + digits.start..from + digits.end,
        number.to_string(),
    ))
}
