use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FenceSig {
    Backticks,
    Tildes,
    Math,
    /// `$$ x $$` on one line: opens and closes at once.
    MathInline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FenceKind {
    Backticks,
    Tildes,
    Math,
}

pub struct CodeFence;

impl CodeFence {
    pub const BACKTICKS: &'static str = "```";
    pub const TILDES: &'static str = "~~~";
    pub const MATH: &'static str = "$$";

    /// Fence signature of a quote-stripped line, ignoring leading indentation.
    pub fn sig(remainder: &str) -> Option<FenceSig> {
        let t = remainder.trim_end_matches(['\r', '\n']).trim_start();
        if t.starts_with(Self::BACKTICKS) {
            Some(FenceSig::Backticks)
        } else if t.starts_with(Self::TILDES) {
            Some(FenceSig::Tildes)
        } else if t.starts_with(Self::MATH) {
            let t = t.trim_end();
            if t.len() > 2 * Self::MATH.len() && t.ends_with(Self::MATH) {
                Some(FenceSig::MathInline)
            } else {
                Some(FenceSig::Math)
            }
        } else {
            None
        }
    }

    pub fn kind(sig: FenceSig) -> FenceKind {
        match sig {
            FenceSig::Backticks => FenceKind::Backticks,
            FenceSig::Tildes => FenceKind::Tildes,
            FenceSig::Math | FenceSig::MathInline => FenceKind::Math,
        }
    }

    pub fn closes(kind: FenceKind, sig: Option<FenceSig>) -> bool {
        matches!(
            (kind, sig),
            (FenceKind::Backticks, Some(FenceSig::Backticks))
                | (FenceKind::Tildes, Some(FenceSig::Tildes))
                | (FenceKind::Math, Some(FenceSig::Math))
        )
    }
}
