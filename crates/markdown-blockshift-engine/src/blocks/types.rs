use serde::Serialize;

use crate::document::LineSpan;

/// The structural unit a line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    /// A single plain line.
    Paragraph,
    /// A heading and its section.
    Heading,
    /// A list item with all of its sub-items and continuation lines.
    ListItem,
    /// A single bare blockquote line.
    Blockquote,
    /// A `[!type]` callout and its whole quote run.
    Callout,
    /// A backtick or tilde fenced region.
    CodeBlock,
    /// A `$$` fenced region.
    MathBlock,
    /// A contiguous run of `|` rows.
    Table,
    HorizontalRule,
}

impl BlockType {
    pub const ALL: [BlockType; 9] = [
        BlockType::Paragraph,
        BlockType::Heading,
        BlockType::ListItem,
        BlockType::Blockquote,
        BlockType::Callout,
        BlockType::CodeBlock,
        BlockType::MathBlock,
        BlockType::Table,
        BlockType::HorizontalRule,
    ];

    /// Blockquotes and callouts carry their own quote depth.
    #[must_use]
    pub fn is_quote_like(self) -> bool {
        matches!(self, BlockType::Blockquote | BlockType::Callout)
    }

    /// Content that is inserted verbatim, without quote-depth rewriting.
    #[must_use]
    pub fn keeps_verbatim(self) -> bool {
        matches!(
            self,
            BlockType::CodeBlock
                | BlockType::MathBlock
                | BlockType::Table
                | BlockType::Blockquote
                | BlockType::Callout
        )
    }
}

/// A detected block: its type, line range, byte range and text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockInfo {
    pub block_type: BlockType,
    pub start_line: usize,
    pub end_line: usize,
    pub from_offset: usize,
    pub to_offset: usize,
    /// List nesting depth of a list item (0 for top level and non-list blocks).
    pub indent_level: usize,
    /// Tab-normalised indent of the first line's quote-stripped remainder.
    pub indent_width: usize,
    pub content: String,
    /// Disjoint, non-adjacent ranges of a multi-select source, in document order.
    pub composite_selection: Option<Vec<LineSpan>>,
}

impl BlockInfo {
    #[must_use]
    pub fn span(&self) -> LineSpan {
        LineSpan::new(self.start_line, self.end_line)
    }

    /// The committed line ranges: the composite parts, or the single block span.
    #[must_use]
    pub fn ranges(&self) -> Vec<LineSpan> {
        match &self.composite_selection {
            Some(ranges) => ranges.clone(),
            None => vec![self.span()],
        }
    }

    #[must_use]
    pub fn is_composite(&self) -> bool {
        self.composite_selection.is_some()
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.ranges().iter().map(|r| r.len()).sum()
    }
}

/// Sorts `ranges` and merges those that overlap or touch.
pub fn normalize_ranges(ranges: &[LineSpan]) -> Vec<LineSpan> {
    let mut sorted = ranges.to_vec();
    sorted.sort();
    let mut out: Vec<LineSpan> = Vec::with_capacity(sorted.len());
    for range in sorted {
        match out.last_mut() {
            Some(last) if last.touches(range) => last.end = last.end.max(range.end),
            _ => out.push(range),
        }
    }
    out
}
