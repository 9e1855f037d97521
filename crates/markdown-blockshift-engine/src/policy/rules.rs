use std::fmt;

use serde::Serialize;

use crate::blocks::BlockType;

/// Structural classification of an insertion point, independent of what is inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotContext {
    InsideList,
    InsideQuoteRun,
    QuoteBefore,
    QuoteAfter,
    CalloutAfter,
    TableBefore,
    HrBefore,
    Outside,
}

impl SlotContext {
    pub const ALL: [SlotContext; 8] = [
        SlotContext::InsideList,
        SlotContext::InsideQuoteRun,
        SlotContext::QuoteBefore,
        SlotContext::QuoteAfter,
        SlotContext::CalloutAfter,
        SlotContext::TableBefore,
        SlotContext::HrBefore,
        SlotContext::Outside,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SlotContext::InsideList => "inside_list",
            SlotContext::InsideQuoteRun => "inside_quote_run",
            SlotContext::QuoteBefore => "quote_before",
            SlotContext::QuoteAfter => "quote_after",
            SlotContext::CalloutAfter => "callout_after",
            SlotContext::TableBefore => "table_before",
            SlotContext::HrBefore => "hr_before",
            SlotContext::Outside => "outside",
        }
    }
}

impl fmt::Display for SlotContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a drop was refused. Rejections are ordinary values; the caller just
/// does not commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    SelfRangeBlocked,
    SelfEmbedding,
    InsideList,
    InsideQuoteRun,
    QuoteBoundary,
    CalloutAfter,
    TableBefore,
    HrBefore,
    /// The pointer did not resolve to a line.
    NoTarget,
    /// The resolved line has no anchor to render an indicator against.
    NoAnchor,
    /// Generic container refusal when nothing more specific applies.
    ContainerPolicy,
    /// The pointer is over rendered table-cell content.
    TableCell,
}

impl RejectReason {
    pub fn as_str(self) -> &'static str {
        match self {
            RejectReason::SelfRangeBlocked => "self_range_blocked",
            RejectReason::SelfEmbedding => "self_embedding",
            RejectReason::InsideList => "inside_list",
            RejectReason::InsideQuoteRun => "inside_quote_run",
            RejectReason::QuoteBoundary => "quote_boundary",
            RejectReason::CalloutAfter => "callout_after",
            RejectReason::TableBefore => "table_before",
            RejectReason::HrBefore => "hr_before",
            RejectReason::NoTarget => "no_target",
            RejectReason::NoAnchor => "no_anchor",
            RejectReason::ContainerPolicy => "container_policy",
            RejectReason::TableCell => "table_cell",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InsertionRule {
    pub allow_drop: bool,
    pub reject_reason: Option<RejectReason>,
}

impl InsertionRule {
    const ALLOW: InsertionRule = InsertionRule {
        allow_drop: true,
        reject_reason: None,
    };

    const fn deny(reason: RejectReason) -> Self {
        InsertionRule {
            allow_drop: false,
            reject_reason: Some(reason),
        }
    }
}

/// Whether a `source` block may land in a `slot`.
///
/// Callouts and quote runs only admit homogeneous content. Nothing may be
/// inserted directly before a table or a rule, or directly after a callout.
pub fn resolve_insertion_rule(source: BlockType, slot: SlotContext) -> InsertionRule {
    match slot {
        SlotContext::InsideList if source == BlockType::ListItem => InsertionRule::ALLOW,
        SlotContext::InsideList => InsertionRule::deny(RejectReason::InsideList),
        SlotContext::InsideQuoteRun if source == BlockType::Blockquote => InsertionRule::ALLOW,
        SlotContext::InsideQuoteRun => InsertionRule::deny(RejectReason::InsideQuoteRun),
        SlotContext::QuoteBefore | SlotContext::QuoteAfter if source == BlockType::Callout => {
            InsertionRule::deny(RejectReason::QuoteBoundary)
        }
        SlotContext::QuoteBefore | SlotContext::QuoteAfter => InsertionRule::ALLOW,
        SlotContext::CalloutAfter => InsertionRule::deny(RejectReason::CalloutAfter),
        SlotContext::TableBefore => InsertionRule::deny(RejectReason::TableBefore),
        SlotContext::HrBefore => InsertionRule::deny(RejectReason::HrBefore),
        SlotContext::Outside => InsertionRule::ALLOW,
    }
}
