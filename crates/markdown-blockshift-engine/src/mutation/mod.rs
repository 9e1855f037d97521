//! # Text Mutation
//!
//! Turns a validated drop into text: the replacement content for the moved
//! block, the single atomic edit that relocates it, and the follow-up edit
//! that renumbers ordered lists around both ends of the move.

pub mod commit;
pub mod insert_text;
pub mod renumber;

pub use commit::{MoveEdit, MoveOutcome, commit_move, plan_move};
pub use insert_text::build_insert_text;
pub use renumber::renumber_ordered_runs;
