//! Structure-aware block relocation for plain-text markdown.
//!
//! The engine answers three questions while a block is being dragged: what
//! block sits under a line, where a pointer would drop it, and whether that
//! drop is allowed. Once a drop is committed it produces the single edit that
//! moves the block.
//!
//! Everything is derived from immutable [`DocumentSnapshot`]s. The
//! [`RelocationEngine`] facade owns the current snapshot and its caches; the
//! modules below it are usable on their own through a [`StructureView`].

pub mod blocks;
pub mod document;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod lines;
pub mod mutation;
pub mod observer;
pub mod policy;
pub mod settings;
pub mod view;

// Re-export key types for easier usage
pub use blocks::{BlockDetector, BlockInfo, BlockType};
pub use document::{
    DocId, DocumentError, DocumentSnapshot, EditError, LineChange, LineRef, LineSpan,
    SnapshotKey, TextEdit,
};
pub use engine::RelocationEngine;
pub use error::EngineError;
pub use geometry::{GridGeometry, LineGeometry, LineRect, PointerPosition, ResolvedTarget};
pub use lines::{IndentStyle, LineClassifier, LineMap, LineMeta, PrimeOutcome};
pub use mutation::MoveOutcome;
pub use observer::{ResolveObserver, Stage};
pub use policy::{
    DropValidationResult, IndentIntent, ListIndentPlan, RejectReason, SlotContext,
};
pub use settings::EngineSettings;
pub use view::StructureView;
