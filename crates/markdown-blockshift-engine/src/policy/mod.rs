//! # Drop Policy
//!
//! Decides where a block may land. The insertion point before a line is
//! classified into a [`SlotContext`], checked against the insertion matrix,
//! and for drops onto the source's own lines, run through the in-place guard.
//!
//! ## Modules
//!
//! - **`rules`**: slot contexts, reject reasons and the insertion matrix
//! - **`container`**: slot classification and list container lookup
//! - **`list_indent`**: indent width and marker planning for moved list items
//! - **`in_place`**: the drop validator and its self-range guard

pub mod container;
pub mod in_place;
pub mod list_indent;
pub mod rules;

pub use container::{
    SlotResolution, clamp_target, container_context_at_insertion, resolve_slot,
    resolve_slot_context,
};
pub use in_place::{DropValidationResult, validate_drop};
pub use list_indent::{IndentIntent, ListIndentPlan, list_context_line, plan_list_indent};
pub use rules::{InsertionRule, RejectReason, SlotContext, resolve_insertion_rule};
