use std::sync::Arc;

use crate::blocks::{BlockDetector, BlockInfo};
use crate::document::DocumentSnapshot;
use crate::lines::{IndentStyle, LineClassifier, LineMap, LineMeta, scan};

/// Read-only structural view over one snapshot.
///
/// Answers line-level questions from the [`LineMap`] when one is attached for
/// this exact snapshot, and by scanning reclassified lines otherwise. Both
/// paths return the same answers.
#[derive(Clone, Copy)]
pub struct StructureView<'a> {
    snapshot: &'a DocumentSnapshot,
    map: Option<&'a LineMap>,
    classifier: LineClassifier,
    blocks: &'a BlockDetector,
}

const EMPTY: LineMeta = LineMeta {
    is_empty: true,
    is_list: false,
    indent_width: 0,
    is_quote: false,
    quote_depth: 0,
    is_callout: false,
    is_table: false,
    is_hr: false,
};

impl<'a> StructureView<'a> {
    /// A map built for another snapshot or tab width is ignored.
    pub fn new(
        snapshot: &'a DocumentSnapshot,
        map: Option<&'a LineMap>,
        classifier: LineClassifier,
        blocks: &'a BlockDetector,
    ) -> Self {
        let map = map.filter(|m| m.key() == snapshot.key(classifier.tab_width()));
        Self {
            snapshot,
            map,
            classifier,
            blocks,
        }
    }

    pub fn snapshot(&self) -> &'a DocumentSnapshot {
        self.snapshot
    }

    pub fn classifier(&self) -> LineClassifier {
        self.classifier
    }

    pub fn tab_width(&self) -> usize {
        self.classifier.tab_width()
    }

    pub fn has_line_map(&self) -> bool {
        self.map.is_some()
    }

    pub fn line_count(&self) -> usize {
        self.snapshot.line_count()
    }

    pub fn line_text(&self, line: usize) -> String {
        self.snapshot.line_text(line)
    }

    /// Metadata of `line`; out-of-range lines read as empty.
    pub fn meta(&self, line: usize) -> LineMeta {
        match self.map {
            Some(map) => map.meta(line).unwrap_or(EMPTY),
            None if line >= 1 && line <= self.line_count() => {
                self.classifier.classify(&self.snapshot.line_text(line))
            }
            None => EMPTY,
        }
    }

    pub fn prev_non_empty(&self, line: usize) -> usize {
        match self.map {
            Some(map) => map.prev_non_empty(line),
            None => scan::prev_non_empty(|n| self.meta(n), line.min(self.line_count() + 1)),
        }
    }

    pub fn next_non_empty(&self, line: usize) -> usize {
        match self.map {
            Some(map) => map.next_non_empty(line),
            None => scan::next_non_empty(|n| self.meta(n), self.line_count(), line),
        }
    }

    pub fn prev_list_line(&self, line: usize) -> usize {
        match self.map {
            Some(map) => map.prev_list_line(line),
            None => scan::prev_list_line(|n| self.meta(n), line.min(self.line_count() + 1)),
        }
    }

    /// Parent list line of `line`, 0 for top-level items and non-list lines.
    pub fn list_parent(&self, line: usize) -> usize {
        match self.map {
            Some(map) => map.list_parent_line(line),
            None => scan::list_parent(|n| self.meta(n), line),
        }
    }

    /// Last line of the list subtree opened at `line`.
    pub fn list_subtree_end(&self, line: usize) -> usize {
        match self.map {
            Some(map) => map.list_subtree_end_line(line),
            None => scan::list_subtree_end(|n| self.meta(n), self.line_count(), line),
        }
    }

    /// The innermost list item whose subtree covers `line`, or 0.
    pub fn list_owner(&self, line: usize) -> usize {
        if line == 0 || line > self.line_count() {
            return 0;
        }
        if self.meta(line).is_list {
            return line;
        }
        let mut candidate = self.prev_list_line(line);
        while candidate != 0 {
            if self.list_subtree_end(candidate) >= line {
                return candidate;
            }
            candidate = self.list_parent(candidate);
        }
        0
    }

    /// Parent chain of a list line, nearest first. Excludes `line` itself.
    pub fn ancestors(&self, line: usize) -> Vec<usize> {
        let mut chain = Vec::new();
        let mut current = self.list_parent(line);
        while current != 0 {
            chain.push(current);
            current = self.list_parent(current);
        }
        chain
    }

    /// Nesting depth of a list line: the number of its ancestors.
    pub fn list_depth(&self, line: usize) -> usize {
        self.ancestors(line).len()
    }

    /// Indentation style of the document, from its first indented line.
    pub fn indent_style(&self) -> IndentStyle {
        self.blocks.indent_style(self.snapshot, self.tab_width())
    }

    pub fn detect_block(&self, line: usize) -> Option<Arc<BlockInfo>> {
        self.blocks.detect(self, line)
    }
}
