//! # Block Detection
//!
//! Expands a line number to the block that owns it: list subtrees, callout
//! containers, table runs, fenced regions, heading sections, and single lines
//! for everything else.
//!
//! ## Modules
//!
//! - **`types`**: `BlockType`, `BlockInfo` and composite range normalisation
//! - **`fences`**: per-snapshot index of fenced code and math regions
//! - **`detect`**: `BlockDetector`, the memoised line → block expansion

pub mod detect;
pub mod fences;
pub mod types;

pub use detect::BlockDetector;
pub(crate) use detect::span_text;
pub use fences::{FenceIndex, FenceRange};
pub use types::{BlockInfo, BlockType, normalize_ranges};
