//! Pipeline Observability
//!
//! The pipeline has no direct console I/O: it emits structured stage
//! events through an injected observer, and a collaborator decides how
//! to surface them. The default observer forwards to `tracing`.

use std::sync::Arc;

use tracing::info;

/// Pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Collect,
    Classify,
    Summarize,
    Highlights,
    Compose,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Collect => write!(f, "collect"),
            Self::Classify => write!(f, "classify"),
            Self::Summarize => write!(f, "summarize"),
            Self::Highlights => write!(f, "highlights"),
            Self::Compose => write!(f, "compose"),
        }
    }
}

/// How a stage concluded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    /// Stage produced output through its primary path
    Completed,
    /// Stage produced output through its deterministic fallback
    Fallback,
    /// Stage short-circuited (e.g. no input)
    Skipped,
}

impl std::fmt::Display for StageOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::Fallback => write!(f, "fallback"),
            Self::Skipped => write!(f, "skipped"),
        }
    }
}

/// One structured pipeline event
#[derive(Debug, Clone, Copy)]
pub struct StageEvent {
    pub stage: Stage,
    pub outcome: StageOutcome,
    /// Items flowing out of the stage
    pub items: usize,
}

/// Injected event sink. Implementations must be cheap; events fire on
/// the pipeline's hot path.
pub trait PipelineObserver: Send + Sync {
    fn on_stage(&self, event: StageEvent);
}

pub type SharedObserver = Arc<dyn PipelineObserver>;

/// Default observer forwarding stage events to `tracing`
#[derive(Debug, Default)]
pub struct TracingObserver;

impl TracingObserver {
    pub fn shared() -> SharedObserver {
        Arc::new(Self)
    }
}

impl PipelineObserver for TracingObserver {
    fn on_stage(&self, event: StageEvent) {
        info!(
            stage = %event.stage,
            outcome = %event.outcome,
            items = event.items,
            "pipeline stage"
        );
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Observer recording every event, for pipeline assertions
    #[derive(Debug, Default)]
    pub struct RecordingObserver {
        pub events: Mutex<Vec<StageEvent>>,
    }

    impl RecordingObserver {
        pub fn outcomes(&self) -> Vec<(Stage, StageOutcome)> {
            self.events
                .lock()
                .unwrap()
                .iter()
                .map(|e| (e.stage, e.outcome))
                .collect()
        }
    }

    impl PipelineObserver for RecordingObserver {
        fn on_stage(&self, event: StageEvent) {
            self.events.lock().unwrap().push(event);
        }
    }
}
