/// Blockquote and callout syntax.
///
/// All `>`-prefix knowledge lives here; the classifier and the text mutation
/// policy both go through these helpers.
pub struct BlockQuote;

impl BlockQuote {
    /// The blockquote prefix character.
    pub const PREFIX: char = '>';

    /// Opening of a callout header once quote prefixes are stripped (`> [!note]`).
    pub const CALLOUT_OPEN: &'static str = "[!";

    /// Strips blockquote prefixes from a line, returning (depth, byte_offset).
    ///
    /// Handles `> text`, `>> nested` and `> > spaced nested`. Leading spaces are
    /// only consumed when a `>` follows them, so an unquoted line keeps its
    /// indentation (`byte_offset` is 0).
    pub fn strip_prefixes(s: &str) -> (u8, usize) {
        let b = s.as_bytes();
        let mut i = 0usize;
        let mut depth = 0u8;
        let mut content_start = 0usize;

        loop {
            while i < b.len() && b[i] == b' ' {
                i += 1;
            }
            if i < b.len() && b[i] == (Self::PREFIX as u8) {
                depth = depth.saturating_add(1);
                i += 1;
                if i < b.len() && b[i] == b' ' {
                    i += 1;
                }
                content_start = i;
            } else {
                break;
            }
        }
        (depth, content_start)
    }

    /// True when the quote-stripped remainder opens a callout.
    pub fn is_callout_header(remainder: &str) -> bool {
        remainder.trim_start().starts_with(Self::CALLOUT_OPEN)
    }

    /// The canonical prefix for `depth` levels: `"> "` repeated.
    pub fn prefix(depth: u8) -> String {
        "> ".repeat(depth as usize)
    }

    /// Rewrites a line so that it sits at exactly `depth` quote levels.
    ///
    /// Blank lines (after stripping) are returned unchanged.
    pub fn with_depth(line: &str, depth: u8) -> String {
        let (_, idx) = Self::strip_prefixes(line);
        let rest = &line[idx..];
        if rest.trim().is_empty() && idx == 0 {
            return line.to_string();
        }
        let mut out = Self::prefix(depth);
        if depth > 0 && rest.is_empty() {
            out.truncate(out.trim_end().len());
        }
        out.push_str(rest);
        out
    }
}
