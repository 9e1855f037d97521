//! # Line Classification
//!
//! Every structural decision starts from per-line facts. This module turns
//! line text into [`LineMeta`] and indexes a whole snapshot into a [`LineMap`].
//!
//! ## Modules
//!
//! - **`kinds`**: syntax helpers for each line construct (quotes, fences, list markers, ...)
//! - **`classify`**: `LineClassifier`, the pure text → `LineMeta` function
//! - **`indent`**: tab-aware indentation width and indent style detection
//! - **`line_map`**: the per-snapshot index and its incremental maintenance
//! - **`scan`**: map-free equivalents of the `LineMap` indices

pub mod classify;
pub mod indent;
pub mod kinds;
pub mod line_map;
pub mod scan;

pub use classify::{LineClassifier, LineMeta};
pub use indent::{IndentStyle, leading_width};
pub use line_map::{LineIndex, LineMap, PrimeOutcome};
