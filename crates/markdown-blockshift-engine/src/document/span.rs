use serde::Serialize;

/// An inclusive, 1-based range of line numbers `[start, end]`.
///
/// Line spans never describe an empty range: every edit touches at least the
/// line its start offset falls on, and every block owns at least one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct LineSpan {
    /// First line of the span.
    pub start: usize,
    /// Last line of the span (inclusive).
    pub end: usize,
}

impl LineSpan {
    /// Builds a span, swapping the bounds if they arrive reversed.
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// A span covering exactly one line.
    #[must_use]
    pub fn single(line: usize) -> Self {
        Self {
            start: line,
            end: line,
        }
    }

    /// Number of lines covered. Uses saturating arithmetic for safety.
    #[must_use]
    pub fn len(self) -> usize {
        (self.end + 1).saturating_sub(self.start)
    }

    /// True only for a degenerate span (`end < start`), which `new` never builds.
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn contains(self, line: usize) -> bool {
        self.start <= line && line <= self.end
    }

    /// True when both spans share at least one line or sit directly next to each other.
    #[must_use]
    pub fn touches(self, other: LineSpan) -> bool {
        self.start <= other.end.saturating_add(1) && other.start <= self.end.saturating_add(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_orders_bounds() {
        assert_eq!(LineSpan::new(5, 2), LineSpan { start: 2, end: 5 });
    }

    #[test]
    fn single_line_span_has_len_one() {
        let span = LineSpan::single(7);
        assert_eq!(span.len(), 1);
        assert!(!span.is_empty());
        assert!(span.contains(7));
        assert!(!span.contains(8));
    }

    #[test]
    fn touches_detects_adjacency() {
        let a = LineSpan::new(1, 3);
        assert!(a.touches(LineSpan::new(4, 6)));
        assert!(a.touches(LineSpan::new(3, 3)));
        assert!(!a.touches(LineSpan::new(5, 6)));
    }
}
