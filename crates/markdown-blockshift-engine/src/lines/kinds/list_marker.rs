use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::lines::indent::leading_width;

/// Bullet or ordinal part of a list marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MarkerKind {
    /// `-`, `*` or `+`.
    Bullet(char),
    /// `N.` or `N)`.
    Ordered { number: u64, delimiter: char },
}

/// A complete list marker, including an optional task checkbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ListMarker {
    pub kind: MarkerKind,
    /// The character between the task brackets (`' '`, `'x'`, …), if any.
    pub task: Option<char>,
}

/// A list line split into its parts. All ranges index the parsed text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListLine {
    pub marker: ListMarker,
    /// Leading whitespace before the marker.
    pub indent: Range<usize>,
    /// Tab-normalised width of `indent`.
    pub indent_width: usize,
    /// The ordinal digits of an ordered marker.
    pub number: Option<Range<usize>>,
    /// Marker token through the end of the checkbox and its trailing gap.
    pub marker_span: Range<usize>,
    /// Width of the bullet token plus its gap (`"- "` → 2, `"10. "` → 4).
    pub bullet_width: usize,
}

fn list_regex() -> &'static Regex {
    static LIST_REGEX: OnceLock<Regex> = OnceLock::new();
    LIST_REGEX.get_or_init(|| {
        Regex::new(
            r"^(?P<indent>[ \t]*)(?P<token>[-*+]|(?P<num>\d{1,9})(?P<delim>[.)]))(?P<gap>[ \t]+|$)(?:(?P<task>\[(?P<state>[^\]])\])(?P<tgap>[ \t]+|$))?",
        )
        .expect("Invalid list marker regex")
    })
}

impl ListMarker {
    /// Parses the marker of a quote-stripped line.
    pub fn parse(remainder: &str, tab_width: usize) -> Option<ListLine> {
        let caps = list_regex().captures(remainder)?;
        let indent = caps.name("indent")?.range();
        let token = caps.name("token")?;
        let gap = caps.name("gap")?;

        let kind = match (caps.name("num"), caps.name("delim")) {
            (Some(num), Some(delim)) => MarkerKind::Ordered {
                number: num.as_str().parse().ok()?,
                delimiter: delim.as_str().chars().next()?,
            },
            _ => MarkerKind::Bullet(token.as_str().chars().next()?),
        };
        let task = caps
            .name("state")
            .and_then(|state| state.as_str().chars().next());
        let marker_end = caps
            .name("tgap")
            .map(|m| m.end())
            .unwrap_or_else(|| gap.end());

        let (indent_width, _) = leading_width(remainder, tab_width);
        let gap_width = if gap.as_str().is_empty() { 1 } else { gap.len() };

        Some(ListLine {
            marker: ListMarker { kind, task },
            indent,
            indent_width,
            number: caps.name("num").map(|m| m.range()),
            marker_span: token.start()..marker_end,
            bullet_width: token.len() + gap_width.min(4),
        })
    }

    #[must_use]
    pub fn is_ordered(&self) -> bool {
        matches!(self.kind, MarkerKind::Ordered { .. })
    }

    /// Renders the marker with single-space gaps, e.g. `"1. "` or `"- [x] "`.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = match self.kind {
            MarkerKind::Bullet(c) => format!("{c} "),
            MarkerKind::Ordered { number, delimiter } => format!("{number}{delimiter} "),
        };
        if let Some(state) = self.task {
            out.push('[');
            out.push(state);
            out.push_str("] ");
        }
        out
    }

    /// Adopts the destination list's convention.
    ///
    /// Ordered destinations always restart at `1` (siblings are renumbered after
    /// the move); a task destination gives a non-task source an unchecked box,
    /// while a task source keeps its own state.
    #[must_use]
    pub fn retarget(&self, destination: &ListMarker) -> ListMarker {
        let kind = match destination.kind {
            MarkerKind::Ordered { delimiter, .. } => MarkerKind::Ordered {
                number: 1,
                delimiter,
            },
            MarkerKind::Bullet(c) => MarkerKind::Bullet(c),
        };
        let task = match (self.task, destination.task) {
            (Some(state), _) => Some(state),
            (None, Some(_)) => Some(' '),
            (None, None) => None,
        };
        ListMarker { kind, task }
    }
}
