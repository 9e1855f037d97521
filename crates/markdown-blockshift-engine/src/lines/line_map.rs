use std::sync::Arc;

use crate::document::{DocumentSnapshot, LineChange, SnapshotKey};

use super::classify::{LineClassifier, LineMeta};

/// Derived per-line indices, each sized `lines + 2` so that `0` and
/// `lines + 1` are valid sentinels. `0` means "none".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    pub prev_non_empty: Vec<usize>,
    pub next_non_empty: Vec<usize>,
    pub prev_list_line: Vec<usize>,
    pub list_parent_line: Vec<usize>,
    pub list_subtree_end_line: Vec<usize>,
}

impl LineIndex {
    /// One forward pass with a stack of open list lines, then one backward pass.
    fn build(metas: &[LineMeta]) -> Self {
        let n = metas.len();
        let mut prev_non_empty = vec![0; n + 2];
        let mut next_non_empty = vec![0; n + 2];
        let mut prev_list_line = vec![0; n + 2];
        let mut list_parent_line = vec![0; n + 2];
        let mut list_subtree_end_line: Vec<usize> = (0..n + 2).collect();

        let mut open: Vec<usize> = Vec::new();
        let mut last_non_empty = 0usize;
        let mut last_list = 0usize;

        for (idx, meta) in metas.iter().enumerate() {
            let line = idx + 1;
            prev_non_empty[line] = last_non_empty;
            prev_list_line[line] = last_list;
            if meta.is_empty {
                continue;
            }

            while let Some(&top) = open.last() {
                let top_meta = &metas[top - 1];
                if top_meta.quote_depth == meta.quote_depth
                    && top_meta.indent_width < meta.indent_width
                {
                    break;
                }
                list_subtree_end_line[top] = last_non_empty;
                open.pop();
            }

            if meta.is_list {
                list_parent_line[line] = open.last().copied().unwrap_or(0);
                open.push(line);
                last_list = line;
            }
            last_non_empty = line;
        }
        for top in open.drain(..) {
            list_subtree_end_line[top] = last_non_empty;
        }
        prev_non_empty[n + 1] = last_non_empty;
        prev_list_line[n + 1] = last_list;

        let mut next = 0usize;
        for line in (0..=n).rev() {
            next_non_empty[line] = next;
            if line >= 1 && !metas[line - 1].is_empty {
                next = line;
            }
        }

        Self {
            prev_non_empty,
            next_non_empty,
            prev_list_line,
            list_parent_line,
            list_subtree_end_line,
        }
    }
}

/// How [`LineMap::prime_from_edits`] produced its result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimeOutcome {
    /// Every changed line kept its metadata; both arrays are shared with the previous map.
    Reused,
    /// Changed lines were reclassified and spliced, indices recomputed.
    Spliced { reclassified: usize },
    /// Incremental assumptions failed.
    Rebuilt { reason: &'static str },
}

/// Per-snapshot structural index: one [`LineMeta`] per line plus derived indices.
///
/// Never mutated after construction. Successor snapshots get a new map that
/// may share its arrays with this one.
#[derive(Debug, Clone)]
pub struct LineMap {
    key: SnapshotKey,
    metas: Arc<Vec<LineMeta>>,
    index: Arc<LineIndex>,
}

impl LineMap {
    /// Classifies every line of `snapshot`.
    pub fn build(snapshot: &DocumentSnapshot, classifier: LineClassifier) -> Self {
        let metas: Vec<LineMeta> = snapshot
            .lines()
            .map(|line| classifier.classify(&line.text))
            .collect();
        Self::from_metas(snapshot.key(classifier.tab_width()), metas)
    }

    fn from_metas(key: SnapshotKey, metas: Vec<LineMeta>) -> Self {
        let index = LineIndex::build(&metas);
        Self {
            key,
            metas: Arc::new(metas),
            index: Arc::new(index),
        }
    }

    /// Derives the map of `snapshot` from this map of its predecessor.
    ///
    /// `changes` are the line-range pairs produced by the edit that led from
    /// the previous snapshot to `snapshot`. Anything that does not line up falls
    /// back to a full rebuild.
    pub fn prime_from_edits(
        &self,
        snapshot: &DocumentSnapshot,
        changes: &[LineChange],
        classifier: LineClassifier,
    ) -> (Self, PrimeOutcome) {
        let key = snapshot.key(classifier.tab_width());
        if let Err(reason) = self.check_changes(&key, snapshot, changes) {
            log::debug!("line map rebuild for version {}: {reason}", key.version);
            return (
                Self::build(snapshot, classifier),
                PrimeOutcome::Rebuilt { reason },
            );
        }

        let reclassified: usize = changes.iter().map(|c| c.new.len()).sum();
        if reclassified * 2 > snapshot.line_count() {
            let reason = "edit covers most of the document";
            log::debug!("line map rebuild for version {}: {reason}", key.version);
            return (
                Self::build(snapshot, classifier),
                PrimeOutcome::Rebuilt { reason },
            );
        }

        let fresh: Vec<Vec<LineMeta>> = changes
            .iter()
            .map(|c| {
                (c.new.start..=c.new.end)
                    .map(|n| classifier.classify(&snapshot.line_text(n)))
                    .collect()
            })
            .collect();

        let unchanged = changes.iter().zip(&fresh).all(|(c, metas)| {
            c.old.len() == c.new.len() && self.metas[c.old.start - 1..c.old.end] == metas[..]
        });
        if unchanged {
            let map = Self {
                key,
                metas: Arc::clone(&self.metas),
                index: Arc::clone(&self.index),
            };
            return (map, PrimeOutcome::Reused);
        }

        let mut metas = Vec::with_capacity(snapshot.line_count());
        let mut cursor = 1usize;
        for (change, replaced) in changes.iter().zip(fresh) {
            metas.extend_from_slice(&self.metas[cursor - 1..change.old.start - 1]);
            metas.extend(replaced);
            cursor = change.old.end + 1;
        }
        metas.extend_from_slice(&self.metas[cursor - 1..]);

        (
            Self::from_metas(key, metas),
            PrimeOutcome::Spliced { reclassified },
        )
    }

    fn check_changes(
        &self,
        key: &SnapshotKey,
        snapshot: &DocumentSnapshot,
        changes: &[LineChange],
    ) -> Result<(), &'static str> {
        if key.doc != self.key.doc {
            return Err("different document");
        }
        if key.tab_width != self.key.tab_width {
            return Err("tab width changed");
        }
        if key.version <= self.key.version {
            return Err("snapshot is not a successor");
        }

        let old_lines = self.line_count();
        let mut shift: isize = 0;
        let mut last_old_end = 0usize;
        for change in changes {
            if change.old.start == 0 || change.new.start == 0 {
                return Err("line numbers are 1-based");
            }
            if change.old.start <= last_old_end {
                return Err("changes overlap or are unsorted");
            }
            if change.old.end > old_lines {
                return Err("change exceeds previous line count");
            }
            if change.new.start as isize != change.old.start as isize + shift {
                return Err("change offsets are inconsistent");
            }
            shift += change.line_delta();
            last_old_end = change.old.end;
        }
        if old_lines as isize + shift != snapshot.line_count() as isize {
            return Err("line count mismatch");
        }
        Ok(())
    }

    #[must_use]
    pub fn key(&self) -> SnapshotKey {
        self.key
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.metas.len()
    }

    /// Metadata of `line`, or `None` when out of range.
    #[must_use]
    pub fn meta(&self, line: usize) -> Option<LineMeta> {
        line.checked_sub(1).and_then(|i| self.metas.get(i)).copied()
    }

    #[must_use]
    pub fn metas(&self) -> &[LineMeta] {
        &self.metas
    }

    #[must_use]
    pub fn index(&self) -> &LineIndex {
        &self.index
    }

    /// True when both maps share their arrays.
    #[must_use]
    pub fn shares_arrays_with(&self, other: &LineMap) -> bool {
        Arc::ptr_eq(&self.metas, &other.metas) && Arc::ptr_eq(&self.index, &other.index)
    }

    fn at(&self, column: &[usize], line: usize) -> usize {
        column[line.min(column.len() - 1)]
    }

    #[must_use]
    pub fn prev_non_empty(&self, line: usize) -> usize {
        self.at(&self.index.prev_non_empty, line)
    }

    #[must_use]
    pub fn next_non_empty(&self, line: usize) -> usize {
        if line > self.line_count() {
            return 0;
        }
        self.at(&self.index.next_non_empty, line)
    }

    #[must_use]
    pub fn prev_list_line(&self, line: usize) -> usize {
        self.at(&self.index.prev_list_line, line)
    }

    #[must_use]
    pub fn list_parent_line(&self, line: usize) -> usize {
        self.at(&self.index.list_parent_line, line)
    }

    #[must_use]
    pub fn list_subtree_end_line(&self, line: usize) -> usize {
        if line > self.line_count() {
            return line;
        }
        self.at(&self.index.list_subtree_end_line, line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::TextEdit;
    use crate::lines::scan;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn classifier() -> LineClassifier {
        LineClassifier::new(4)
    }

    fn map(text: &str) -> LineMap {
        LineMap::build(&DocumentSnapshot::from_text(text), classifier())
    }

    #[test]
    fn nested_list_parents_and_subtrees() {
        let m = map("- root\n  - child\n    - grand\n  - child2\n- sibling");
        assert_eq!(m.index().list_parent_line[1..=5], [0, 1, 2, 1, 0]);
        assert_eq!(m.index().list_subtree_end_line[1..=5], [4, 3, 3, 4, 5]);
    }

    #[test]
    fn sentinels_hold_document_edges() {
        let m = map("a\n\n- b\n");
        assert_eq!(m.line_count(), 4);
        assert_eq!(m.index().prev_non_empty.len(), 6);
        assert_eq!(m.prev_non_empty(5), 3);
        assert_eq!(m.prev_list_line(5), 3);
        assert_eq!(m.next_non_empty(0), 1);
        assert_eq!(m.next_non_empty(3), 0);
    }

    #[test]
    fn out_of_range_lookups_clamp() {
        let m = map("- a");
        assert_eq!(m.prev_non_empty(99), 1);
        assert_eq!(m.next_non_empty(99), 0);
        assert_eq!(m.list_subtree_end_line(99), 99);
        assert_eq!(m.meta(0), None);
        assert_eq!(m.meta(2), None);
    }

    #[test]
    fn content_only_edit_reuses_arrays() {
        let doc = DocumentSnapshot::from_text("- alpha\n- beta\n- gamma");
        let before = LineMap::build(&doc, classifier());
        let (next, changes) = doc
            .apply_edits(vec![TextEdit::replace(10..14, "BETA")])
            .unwrap();
        let (after, outcome) = before.prime_from_edits(&next, &changes, classifier());
        assert_eq!(outcome, PrimeOutcome::Reused);
        assert!(after.shares_arrays_with(&before));
        assert_eq!(after.key().version, next.version());
    }

    #[test]
    fn structural_edit_splices() {
        let doc = DocumentSnapshot::from_text("- a\n- b\n- c");
        let before = LineMap::build(&doc, classifier());
        let (next, changes) = doc
            .apply_edits(vec![TextEdit::replace(4..7, "  - b")])
            .unwrap();
        let (after, outcome) = before.prime_from_edits(&next, &changes, classifier());
        assert_eq!(outcome, PrimeOutcome::Spliced { reclassified: 1 });
        assert!(!after.shares_arrays_with(&before));
        assert_eq!(after.list_parent_line(2), 1);
        assert_eq!(after.index(), map(&next.text()).index());
    }

    #[test]
    fn inconsistent_changes_fall_back_to_rebuild() {
        let doc = DocumentSnapshot::from_text("a\nb");
        let before = LineMap::build(&doc, classifier());
        let next = doc.successor("a\nb\nc\nd\ne\nf");
        let (after, outcome) = before.prime_from_edits(&next, &[], classifier());
        assert_eq!(
            outcome,
            PrimeOutcome::Rebuilt {
                reason: "line count mismatch"
            }
        );
        assert_eq!(after.line_count(), 6);
    }

    #[test]
    fn foreign_document_is_rebuilt() {
        let before = map("a");
        let other = DocumentSnapshot::from_text("b");
        let (_, outcome) = before.prime_from_edits(&other, &[], classifier());
        assert!(matches!(outcome, PrimeOutcome::Rebuilt { .. }));
    }

    fn line_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            Just(String::new()),
            Just("text".to_string()),
            Just("- item".to_string()),
            Just("  - child".to_string()),
            Just("    - grand".to_string()),
            Just("\t- tabbed".to_string()),
            Just("  continuation".to_string()),
            Just("1. one".to_string()),
            Just("> quote".to_string()),
            Just("> - quoted item".to_string()),
            Just(">   - quoted child".to_string()),
            Just("| cell |".to_string()),
            Just("---".to_string()),
        ]
    }

    fn doc_strategy() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec(line_strategy(), 1..40)
    }

    proptest! {
        #[test]
        fn prime_matches_full_rebuild(
            lines in doc_strategy(),
            edits in prop::collection::vec((any::<prop::sample::Index>(), 0usize..3, doc_strategy()), 1..4),
        ) {
            let mut doc = DocumentSnapshot::from_text(&lines.join("\n"));
            let mut current = LineMap::build(&doc, classifier());
            for (at, remove, insert) in edits {
                let count = doc.line_count();
                let first = at.index(count) + 1;
                let last = (first + remove).min(count);
                let from = doc.line(first).unwrap().from;
                let to = doc.line(last).unwrap().to;
                let text = insert[..insert.len().min(3)].join("\n");
                let (next, changes) = doc.apply_edits(vec![TextEdit::replace(from..to, text)]).unwrap();
                let (primed, _) = current.prime_from_edits(&next, &changes, classifier());
                let rebuilt = LineMap::build(&next, classifier());
                prop_assert_eq!(primed.metas(), rebuilt.metas());
                prop_assert_eq!(primed.index(), rebuilt.index());
                doc = next;
                current = primed;
            }
        }

        #[test]
        fn scans_match_index(lines in doc_strategy()) {
            let m = map(&lines.join("\n"));
            let n = m.line_count();
            let meta = |line: usize| m.meta(line).unwrap_or(LineMeta { is_empty: true, ..LineMeta::default() });
            for line in 1..=n {
                prop_assert_eq!(scan::prev_non_empty(meta, line), m.prev_non_empty(line));
                prop_assert_eq!(scan::next_non_empty(meta, n, line), m.next_non_empty(line));
                prop_assert_eq!(scan::prev_list_line(meta, line), m.prev_list_line(line));
                prop_assert_eq!(scan::list_parent(meta, line), m.list_parent_line(line), "parent of {}", line);
                prop_assert_eq!(scan::list_subtree_end(meta, n, line), m.list_subtree_end_line(line), "subtree of {}", line);
            }
        }
    }
}
