use crate::document::DocumentSnapshot;
use crate::lines::kinds::{BlockQuote, CodeFence, FenceKind, FenceSig};

/// A fenced region from its opening line through its closing line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FenceRange {
    pub kind: FenceKind,
    pub start: usize,
    pub end: usize,
}

/// All unquoted fenced regions of one snapshot, in document order.
#[derive(Debug, Clone, Default)]
pub struct FenceIndex {
    ranges: Vec<FenceRange>,
}

impl FenceIndex {
    /// Single pass over the snapshot. An unterminated fence runs to the last line.
    pub fn build(snapshot: &DocumentSnapshot) -> Self {
        let mut ranges = Vec::new();
        let mut open: Option<(FenceKind, usize)> = None;

        for line in snapshot.lines() {
            let (depth, _) = BlockQuote::strip_prefixes(&line.text);
            if depth > 0 {
                continue;
            }
            let sig = CodeFence::sig(&line.text);
            match open {
                Some((kind, start)) => {
                    if CodeFence::closes(kind, sig) {
                        ranges.push(FenceRange {
                            kind,
                            start,
                            end: line.number,
                        });
                        open = None;
                    }
                }
                None => match sig {
                    Some(FenceSig::MathInline) => ranges.push(FenceRange {
                        kind: FenceKind::Math,
                        start: line.number,
                        end: line.number,
                    }),
                    Some(sig) => open = Some((CodeFence::kind(sig), line.number)),
                    None => {}
                },
            }
        }
        if let Some((kind, start)) = open {
            ranges.push(FenceRange {
                kind,
                start,
                end: snapshot.line_count(),
            });
        }
        Self { ranges }
    }

    /// The fenced region containing `line`, if any.
    #[must_use]
    pub fn containing(&self, line: usize) -> Option<FenceRange> {
        let idx = self.ranges.partition_point(|r| r.end < line);
        self.ranges
            .get(idx)
            .filter(|r| r.start <= line && line <= r.end)
            .copied()
    }

    #[must_use]
    pub fn ranges(&self) -> &[FenceRange] {
        &self.ranges
    }
}
