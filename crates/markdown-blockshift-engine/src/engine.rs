use std::sync::Arc;
use std::time::Instant;

use crate::blocks::{BlockDetector, BlockInfo, span_text};
use crate::document::{DocumentSnapshot, LineChange, LineSpan};
use crate::error::EngineError;
use crate::geometry::{LineGeometry, PointerPosition, TargetResolver};
use crate::lines::{LineClassifier, LineMap};
use crate::mutation::{self, MoveOutcome};
use crate::observer::{ResolveObserver, Stage, timed};
use crate::policy::{self, DropValidationResult, IndentIntent, ListIndentPlan, SlotContext};
use crate::settings::EngineSettings;
use crate::view::StructureView;

/// Relocation decisions for one document.
///
/// Owns the current snapshot together with everything derived from it: the
/// line map, the block memo and the per-gesture target cache. Every derived
/// structure is replaced, never patched, when a new snapshot is installed.
pub struct RelocationEngine {
    settings: EngineSettings,
    classifier: LineClassifier,
    snapshot: DocumentSnapshot,
    line_map: Option<Arc<LineMap>>,
    blocks: BlockDetector,
    resolver: TargetResolver,
    observer: Option<Box<dyn ResolveObserver>>,
}

impl RelocationEngine {
    pub fn new(snapshot: DocumentSnapshot, settings: EngineSettings) -> Self {
        Self::build(snapshot, settings, None)
    }

    pub fn with_observer(
        snapshot: DocumentSnapshot,
        settings: EngineSettings,
        observer: Box<dyn ResolveObserver>,
    ) -> Self {
        Self::build(snapshot, settings, Some(observer))
    }

    fn build(
        snapshot: DocumentSnapshot,
        settings: EngineSettings,
        observer: Option<Box<dyn ResolveObserver>>,
    ) -> Self {
        let settings = settings.sanitized();
        let mut engine = Self {
            classifier: LineClassifier::new(settings.tab_width),
            blocks: BlockDetector::new(settings.block_memo_capacity),
            resolver: TargetResolver::new(settings.target_cache_capacity),
            settings,
            snapshot,
            line_map: None,
            observer,
        };
        engine.line_map = engine.eager_line_map();
        engine
    }

    fn observer(&self) -> Option<&dyn ResolveObserver> {
        self.observer.as_deref()
    }

    fn eager_line_map(&self) -> Option<Arc<LineMap>> {
        if self.snapshot.line_count() > self.settings.eager_line_map_limit {
            log::debug!(
                "{} lines exceed the eager limit; using fallback scans",
                self.snapshot.line_count()
            );
            return None;
        }
        Some(self.build_line_map())
    }

    fn build_line_map(&self) -> Arc<LineMap> {
        timed(self.observer(), Stage::LineMapBuild, || {
            Arc::new(LineMap::build(&self.snapshot, self.classifier))
        })
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn snapshot(&self) -> &DocumentSnapshot {
        &self.snapshot
    }

    pub fn line_map(&self) -> Option<&LineMap> {
        self.line_map.as_deref()
    }

    /// Structural view over the current snapshot.
    pub fn view(&self) -> StructureView<'_> {
        StructureView::new(
            &self.snapshot,
            self.line_map.as_deref(),
            self.classifier,
            &self.blocks,
        )
    }

    /// Installs the successor of the current snapshot.
    ///
    /// `changes` describe the edit between the two; the line map is primed
    /// from them. A snapshot of a different document is a full replacement.
    pub fn update(&mut self, snapshot: DocumentSnapshot, changes: &[LineChange]) {
        if snapshot.id() != self.snapshot.id() {
            self.replace_snapshot(snapshot);
            return;
        }
        log::debug!(
            "installing version {} over {}",
            snapshot.version(),
            self.snapshot.version()
        );
        self.snapshot = snapshot;
        let previous = self.line_map.take();
        self.line_map = match previous {
            Some(previous) => {
                let (map, outcome) = timed(self.observer(), Stage::LineMapPrime, || {
                    previous.prime_from_edits(&self.snapshot, changes, self.classifier)
                });
                log::trace!("line map primed: {outcome:?}");
                Some(Arc::new(map))
            }
            None => self.eager_line_map(),
        };
        self.invalidate();
    }

    /// Installs an unrelated snapshot, rebuilding everything.
    pub fn replace_snapshot(&mut self, snapshot: DocumentSnapshot) {
        log::debug!("replacing snapshot; full rebuild");
        self.snapshot = snapshot;
        self.line_map = self.eager_line_map();
        self.invalidate();
    }

    fn invalidate(&mut self) {
        self.blocks.clear();
        self.resolver.begin_gesture();
    }

    /// Builds the line map for a document that started on fallback scans.
    pub fn warm_line_map(&mut self) {
        if self.line_map.is_none() {
            self.line_map = Some(self.build_line_map());
        }
    }

    /// Clears the per-gesture target cache.
    pub fn begin_gesture(&mut self) {
        self.resolver.begin_gesture();
    }

    pub fn detect_block(&self, line: usize) -> Option<Arc<BlockInfo>> {
        self.view().detect_block(line)
    }

    pub fn composite_block(&self, ranges: &[LineSpan]) -> Option<BlockInfo> {
        self.blocks.composite(&self.view(), ranges)
    }

    pub fn slot_context(&self, target: usize) -> SlotContext {
        policy::resolve_slot_context(&self.view(), target)
    }

    pub fn container_context_at_insertion(&self, target: usize) -> Option<Arc<BlockInfo>> {
        policy::container_context_at_insertion(&self.view(), target)
    }

    pub fn plan_list_indent(
        &self,
        source: &BlockInfo,
        target: usize,
        intent: Option<IndentIntent>,
    ) -> ListIndentPlan {
        policy::plan_list_indent(&self.view(), source, target, intent)
    }

    pub fn validate_drop(
        &self,
        source: &BlockInfo,
        target: usize,
        intent: Option<IndentIntent>,
    ) -> DropValidationResult {
        timed(self.observer(), Stage::ValidateDrop, || {
            policy::validate_drop(&self.view(), source, target, intent)
        })
    }

    /// Resolves a pointer position and validates the drop in one step.
    pub fn resolve_drop(
        &mut self,
        geometry: &dyn LineGeometry,
        pointer: PointerPosition,
        source: &BlockInfo,
    ) -> DropValidationResult {
        let view = StructureView::new(
            &self.snapshot,
            self.line_map.as_deref(),
            self.classifier,
            &self.blocks,
        );
        let started = Instant::now();
        let resolved = self.resolver.resolve(&view, geometry, pointer, source);
        if let Some(observer) = self.observer.as_deref() {
            observer.record(Stage::ResolveTarget, started.elapsed());
        }

        match resolved {
            Ok(target) => timed(self.observer.as_deref(), Stage::ValidateDrop, || {
                policy::validate_drop(&view, source, target.target_line, target.intent)
            }),
            Err(reason) => DropValidationResult::rejected(reason),
        }
    }

    pub fn build_insert_text(&self, source: &BlockInfo, validation: &DropValidationResult) -> String {
        timed(self.observer(), Stage::BuildText, || {
            mutation::build_insert_text(&self.view(), source, validation)
        })
    }

    /// Applies an allowed drop as one atomic edit and advances to the result.
    pub fn commit(
        &mut self,
        source: &BlockInfo,
        validation: &DropValidationResult,
    ) -> Result<MoveOutcome, EngineError> {
        if !validation.allowed {
            return Err(EngineError::Rejected(
                validation.reason.unwrap_or(policy::RejectReason::ContainerPolicy),
            ));
        }
        if !self.source_is_current(source) {
            return Err(EngineError::NoSource(source.start_line));
        }
        let text = self.build_insert_text(source, validation);

        let started = Instant::now();
        let outcome = mutation::commit_move(&self.snapshot, source, validation, &text)?;
        self.update(outcome.snapshot.clone(), &outcome.changes);
        if let Some(observer) = self.observer() {
            observer.record(Stage::Commit, started.elapsed());
        }
        Ok(outcome)
    }

    /// Renumbers ordered lists around both ends of a committed move.
    ///
    /// Applied as a second atomic edit. Returns the line changes, or `None`
    /// when every list was already numbered.
    pub fn renumber_after(
        &mut self,
        outcome: &MoveOutcome,
    ) -> Result<Option<Vec<LineChange>>, EngineError> {
        let anchors = [
            outcome.inserted.start,
            outcome.inserted.end + 1,
            outcome.vacated_line,
        ];
        let edits = mutation::renumber_ordered_runs(&self.view(), &anchors);
        if edits.is_empty() {
            return Ok(None);
        }
        let (next, changes) = self.snapshot.apply_edits(edits)?;
        self.update(next, &changes);
        Ok(Some(changes))
    }

    fn source_is_current(&self, source: &BlockInfo) -> bool {
        let n = self.snapshot.line_count();
        if source.ranges().iter().any(|r| r.start == 0 || r.end > n) {
            return false;
        }
        let current = source
            .ranges()
            .into_iter()
            .map(|r| span_text(&self.snapshot, r))
            .collect::<Vec<_>>()
            .join("\n");
        current == source.content
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::GridGeometry;
    use crate::policy::RejectReason;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    fn engine(text: &str) -> RelocationEngine {
        RelocationEngine::new(DocumentSnapshot::from_text(text), EngineSettings::default())
    }

    #[test]
    fn commit_moves_and_advances() {
        let mut engine = engine("- a\n- b\n- c");
        let source = engine.detect_block(3).unwrap();
        let validation = engine.validate_drop(&source, 1, None);
        assert!(validation.allowed);
        let outcome = engine.commit(&source, &validation).unwrap();
        assert_eq!(engine.snapshot().text(), "- c\n- a\n- b");
        assert_eq!(engine.snapshot().version(), outcome.snapshot.version());
        assert!(engine.line_map().is_some());
    }

    #[test]
    fn commit_then_renumber() {
        let mut engine = engine("1. a\n2. b\n3. c");
        let source = engine.detect_block(3).unwrap();
        let validation = engine.validate_drop(&source, 1, None);
        let outcome = engine.commit(&source, &validation).unwrap();
        assert_eq!(engine.snapshot().text(), "1. c\n1. a\n2. b");
        let changes = engine.renumber_after(&outcome).unwrap();
        assert!(changes.is_some());
        assert_eq!(engine.snapshot().text(), "1. c\n2. a\n3. b");
        assert!(engine.renumber_after(&outcome).unwrap().is_none());
    }

    #[test]
    fn rejected_drop_is_not_committed() {
        let mut engine = engine("> a\n> b\n\npara");
        let source = engine.detect_block(4).unwrap();
        let validation = engine.validate_drop(&source, 2, None);
        assert_eq!(validation.reason, Some(RejectReason::InsideQuoteRun));
        let err = engine.commit(&source, &validation).unwrap_err();
        assert!(matches!(err, EngineError::Rejected(RejectReason::InsideQuoteRun)));
        assert_eq!(engine.snapshot().version(), 0);
    }

    #[test]
    fn stale_source_is_refused() {
        let mut engine = engine("a\nb\nc");
        let source = engine.detect_block(3).unwrap();
        let validation = engine.validate_drop(&source, 1, None);
        let next = engine.snapshot().successor("a\nb\nz");
        engine.replace_snapshot(next);
        let err = engine.commit(&source, &validation).unwrap_err();
        assert!(matches!(err, EngineError::NoSource(3)));
    }

    #[test]
    fn stale_composite_source_is_refused() {
        let mut engine = engine("one\ntwo\nthree\nfour\nfive");
        let source = engine
            .composite_block(&[LineSpan::single(1), LineSpan::single(3)])
            .unwrap();
        let validation = engine.validate_drop(&source, 6, None);
        assert!(validation.allowed);

        let next = engine
            .snapshot()
            .successor("ONE-CHANGED\ntwo\nTHREE-CHANGED\nfour\nfive");
        engine.replace_snapshot(next);
        let err = engine.commit(&source, &validation).unwrap_err();
        assert!(matches!(err, EngineError::NoSource(1)));
        assert_eq!(
            engine.snapshot().text(),
            "ONE-CHANGED\ntwo\nTHREE-CHANGED\nfour\nfive"
        );
    }

    #[test]
    fn large_documents_start_on_fallback() {
        let settings = EngineSettings {
            eager_line_map_limit: 2,
            ..EngineSettings::default()
        };
        let mut engine = RelocationEngine::new(DocumentSnapshot::from_text("- a\n  - b\n- c"), settings);
        assert!(engine.line_map().is_none());
        let before = engine.detect_block(1).unwrap();
        engine.warm_line_map();
        assert!(engine.line_map().is_some());
        assert_eq!(engine.detect_block(1).unwrap(), before);
    }

    #[test]
    fn update_primes_existing_map() {
        let mut engine = engine("- a\n- b");
        let (next, changes) = engine
            .snapshot()
            .apply_edits(vec![crate::document::TextEdit::replace(6..7, "B")])
            .unwrap();
        let previous = engine.line_map().unwrap().clone();
        engine.update(next, &changes);
        assert!(engine.line_map().unwrap().shares_arrays_with(&previous));
        assert_eq!(engine.detect_block(2).unwrap().content, "- B");
    }

    #[test]
    fn resolve_drop_combines_geometry_and_policy() {
        let mut engine = engine("para\n- a\n- b");
        let grid = GridGeometry {
            line_count: 3,
            line_height: 10.0,
            char_width: 8.0,
            left: 0.0,
        };
        let source = engine.detect_block(1).unwrap();
        let verdict = engine.resolve_drop(&grid, PointerPosition::new(0.0, 27.0), &source);
        assert!(verdict.allowed);
        assert_eq!(verdict.target_line_number, Some(4));

        let miss = engine.resolve_drop(&grid, PointerPosition::new(0.0, 90.0), &source);
        assert_eq!(miss.reason, Some(RejectReason::NoTarget));
    }

    #[test]
    fn observer_sees_each_stage() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let observer = move |stage: Stage, _: Duration| sink.borrow_mut().push(stage);
        let mut engine = RelocationEngine::with_observer(
            DocumentSnapshot::from_text("a\nb"),
            EngineSettings::default(),
            Box::new(observer),
        );
        let source = engine.detect_block(2).unwrap();
        let validation = engine.validate_drop(&source, 1, None);
        engine.commit(&source, &validation).unwrap();

        let stages = seen.borrow().clone();
        assert_eq!(stages[0], Stage::LineMapBuild);
        for stage in [
            Stage::ValidateDrop,
            Stage::BuildText,
            Stage::LineMapPrime,
            Stage::Commit,
        ] {
            assert!(stages.contains(&stage), "missing {stage}");
        }
    }
}
