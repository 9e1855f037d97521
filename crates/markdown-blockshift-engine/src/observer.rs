use std::fmt;
use std::time::{Duration, Instant};

/// Timed phases of the engine, reported to a [`ResolveObserver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    LineMapBuild,
    LineMapPrime,
    ResolveTarget,
    ValidateDrop,
    BuildText,
    Commit,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::LineMapBuild => "line_map_build",
            Stage::LineMapPrime => "line_map_prime",
            Stage::ResolveTarget => "resolve_target",
            Stage::ValidateDrop => "validate_drop",
            Stage::BuildText => "build_text",
            Stage::Commit => "commit",
        };
        f.write_str(name)
    }
}

/// Receives stage timings. Supplied once, at engine construction.
pub trait ResolveObserver {
    fn record(&self, stage: Stage, elapsed: Duration);
}

impl<F> ResolveObserver for F
where
    F: Fn(Stage, Duration),
{
    fn record(&self, stage: Stage, elapsed: Duration) {
        self(stage, elapsed)
    }
}

/// Runs `f`, reporting its duration when an observer is present.
pub(crate) fn timed<T>(
    observer: Option<&dyn ResolveObserver>,
    stage: Stage,
    f: impl FnOnce() -> T,
) -> T {
    match observer {
        Some(observer) => {
            let started = Instant::now();
            let out = f();
            observer.record(stage, started.elapsed());
            out
        }
        None => f(),
    }
}
