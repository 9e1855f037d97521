use std::collections::HashMap;

use crate::document::SnapshotKey;

use super::resolver::ResolvedTarget;

/// Everything a refined target depends on within one snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetKey {
    pub target_line: usize,
    pub probed_line: usize,
    /// Target forced by child intent, 0 when the vertical rule decided.
    pub forced_line: usize,
    pub child_intent: bool,
    /// Pointer x in whole character columns.
    pub x_bucket: i64,
    /// Byte range of the source block.
    pub source: (usize, usize),
}

/// Per-gesture memo of refined targets.
///
/// Identical inputs recur on every animation frame. Entries belong to one
/// snapshot; the cache is cleared wholesale on snapshot change and when full.
#[derive(Debug)]
pub struct TargetCache {
    capacity: usize,
    snapshot: Option<SnapshotKey>,
    entries: HashMap<TargetKey, ResolvedTarget>,
}

impl TargetCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            snapshot: None,
            entries: HashMap::new(),
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&mut self, snapshot: SnapshotKey, key: &TargetKey) -> Option<ResolvedTarget> {
        self.sync(snapshot);
        self.entries.get(key).copied()
    }

    pub fn insert(&mut self, snapshot: SnapshotKey, key: TargetKey, value: ResolvedTarget) {
        self.sync(snapshot);
        if self.entries.len() >= self.capacity {
            log::debug!("target cache full ({} entries), clearing", self.entries.len());
            self.entries.clear();
        }
        self.entries.insert(key, value);
    }

    fn sync(&mut self, snapshot: SnapshotKey) {
        if self.snapshot != Some(snapshot) {
            if !self.entries.is_empty() {
                log::debug!("target cache invalidated for version {}", snapshot.version);
            }
            self.entries.clear();
            self.snapshot = Some(snapshot);
        }
    }
}
