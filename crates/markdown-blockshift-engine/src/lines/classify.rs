use serde::Serialize;

use super::indent::leading_width;
use super::kinds::{BlockQuote, ListMarker, TableRow, ThematicBreak};

/// Structural facts about a single line.
///
/// Pure function of the line text and the tab width; no cross-line state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct LineMeta {
    /// Whitespace only.
    pub is_empty: bool,
    /// Carries a bullet or ordered marker after its quote prefixes.
    pub is_list: bool,
    /// Tab-normalised leading width of the quote-stripped remainder.
    pub indent_width: usize,
    pub is_quote: bool,
    /// Number of `>` prefixes.
    pub quote_depth: u8,
    /// Quote line whose remainder opens a `[!type]` callout.
    pub is_callout: bool,
    /// Unquoted `|` row. Rows inside quotes stay quote content.
    pub is_table: bool,
    pub is_hr: bool,
}

/// Classifies individual lines into [`LineMeta`].
#[derive(Debug, Clone, Copy)]
pub struct LineClassifier {
    tab_width: usize,
}

impl LineClassifier {
    #[must_use]
    pub fn new(tab_width: usize) -> Self {
        Self {
            tab_width: tab_width.max(1),
        }
    }

    #[must_use]
    pub fn tab_width(&self) -> usize {
        self.tab_width
    }

    /// Classifies one line. Any trailing line terminator is ignored.
    #[must_use]
    pub fn classify(&self, text: &str) -> LineMeta {
        let trimmed = text.trim_end_matches(['\r', '\n']);
        if trimmed.trim().is_empty() {
            return LineMeta {
                is_empty: true,
                ..LineMeta::default()
            };
        }

        let (quote_depth, idx) = BlockQuote::strip_prefixes(trimmed);
        let remainder = &trimmed[idx..];
        let is_quote = quote_depth > 0;
        let (indent_width, _) = leading_width(remainder, self.tab_width);

        let is_hr = ThematicBreak::is_break(remainder);
        let is_list = !is_hr && ListMarker::parse(remainder, self.tab_width).is_some();

        LineMeta {
            is_empty: false,
            is_list,
            indent_width,
            is_quote,
            quote_depth,
            is_callout: is_quote && BlockQuote::is_callout_header(remainder),
            is_table: !is_quote && TableRow::is_row(remainder),
            is_hr,
        }
    }

    /// Quote-stripped remainder of `text`, with its depth.
    #[must_use]
    pub fn remainder<'a>(&self, text: &'a str) -> (u8, &'a str) {
        let trimmed = text.trim_end_matches(['\r', '\n']);
        let (depth, idx) = BlockQuote::strip_prefixes(trimmed);
        (depth, &trimmed[idx..])
    }
}

impl Default for LineClassifier {
    fn default() -> Self {
        Self::new(4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn classify(text: &str) -> LineMeta {
        LineClassifier::new(4).classify(text)
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\t")]
    fn blank_lines(#[case] text: &str) {
        assert_eq!(
            classify(text),
            LineMeta {
                is_empty: true,
                ..LineMeta::default()
            }
        );
    }

    #[test]
    fn indented_list_item() {
        let meta = classify("    - child");
        assert!(meta.is_list);
        assert_eq!(meta.indent_width, 4);
        assert!(!meta.is_quote);
    }

    #[test]
    fn tab_indent_expands() {
        assert_eq!(classify("\t- child").indent_width, 4);
        assert_eq!(LineClassifier::new(2).classify("\t\t1. x").indent_width, 4);
    }

    #[test]
    fn quoted_list_line_is_both() {
        let meta = classify("> - a");
        assert!(meta.is_quote);
        assert!(meta.is_list);
        assert_eq!(meta.quote_depth, 1);
        assert_eq!(meta.indent_width, 0);
    }

    #[test]
    fn callout_header() {
        let meta = classify("> [!note] Title");
        assert!(meta.is_callout);
        assert!(meta.is_quote);
        assert!(!classify("[!note] not quoted").is_callout);
    }

    #[test]
    fn nested_quote_depth() {
        assert_eq!(classify("> > deep").quote_depth, 2);
        assert_eq!(classify(">>> deeper").quote_depth, 3);
    }

    #[test]
    fn rule_beats_list_marker() {
        let meta = classify("- - -");
        assert!(meta.is_hr);
        assert!(!meta.is_list);
    }

    #[rstest]
    #[case("| a | b |", true)]
    #[case("> | quoted |", false)]
    #[case("> > | deep |", false)]
    #[case("a | b", false)]
    fn table_rows(#[case] text: &str, #[case] expected: bool) {
        assert_eq!(classify(text).is_table, expected);
    }

    #[test]
    fn terminator_is_ignored() {
        assert_eq!(classify("- a\r\n"), classify("- a"));
    }

    #[test]
    fn zero_tab_width_is_clamped() {
        assert_eq!(LineClassifier::new(0).tab_width(), 1);
    }
}
