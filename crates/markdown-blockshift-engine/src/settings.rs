use serde::{Deserialize, Serialize};

/// Tunables for [`RelocationEngine`](crate::RelocationEngine).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Columns a tab advances to; 0 is treated as 1.
    pub tab_width: usize,
    /// Memoised block detections per snapshot before the memo is cleared.
    pub block_memo_capacity: usize,
    /// Refined pointer targets per gesture before the cache is cleared.
    pub target_cache_capacity: usize,
    /// Documents with more lines start without a line map until warmed.
    pub eager_line_map_limit: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            tab_width: 4,
            block_memo_capacity: 4096,
            target_cache_capacity: 1024,
            eager_line_map_limit: 500_000,
        }
    }
}

impl EngineSettings {
    /// Raises zero widths and capacities to 1.
    #[must_use]
    pub fn sanitized(self) -> Self {
        Self {
            tab_width: self.tab_width.max(1),
            block_memo_capacity: self.block_memo_capacity.max(1),
            target_cache_capacity: self.target_cache_capacity.max(1),
            eager_line_map_limit: self.eager_line_map_limit,
        }
    }
}
