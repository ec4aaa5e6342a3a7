//! Stage workers: the unit of work behind every progress increment.
//!
//! The orchestrator owns sequencing, progress bookkeeping and cancellation.
//! A [`StageWorker`] only performs the work between two increments, so a
//! real backend (TTS, avatar renderer, encoder …) can replace
//! [`SimulatedWorker`] without changing what callers observe.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::job::ValidatedJobConfig;

use super::stage::{PipelineStage, StageId};

// ---------------------------------------------------------------------------
// StageError
// ---------------------------------------------------------------------------

/// A stage could not complete. The message ends up in the job's
/// [`StageFailure`](crate::pipeline::StageFailure).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct StageError(pub String);

// ---------------------------------------------------------------------------
// StageWorker trait
// ---------------------------------------------------------------------------

/// Performs one increment of work for a stage.
///
/// Implementors must be `Send + Sync` so they can be shared behind an
/// `Arc<dyn StageWorker>` with the orchestrator's background task.
///
/// # Contract
///
/// - `progress` is the stage's progress before this increment (0 – 99).
/// - Returning `Ok(())` lets the orchestrator add one progress step.
/// - Returning `Err(_)` fails the stage and the job; the orchestrator never
///   retries.
#[async_trait]
pub trait StageWorker: Send + Sync {
    async fn step(
        &self,
        stage: &PipelineStage,
        config: &ValidatedJobConfig,
        progress: u8,
    ) -> Result<(), StageError>;
}

// Compile-time assertion: Box<dyn StageWorker> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn StageWorker>) {}
};

// ---------------------------------------------------------------------------
// SimulatedWorker
// ---------------------------------------------------------------------------

/// Stands in for real compute: every increment is a timer.
///
/// ```rust
/// use std::time::Duration;
/// use video_studio::pipeline::{SimulatedWorker, StageId};
///
/// let worker = SimulatedWorker::new(Duration::from_millis(200));
/// let flaky = SimulatedWorker::new(Duration::ZERO).failing_at(StageId::MusicMix);
/// ```
#[derive(Debug, Clone)]
pub struct SimulatedWorker {
    tick: Duration,
    fail_at: Option<StageId>,
}

impl SimulatedWorker {
    pub fn new(tick: Duration) -> Self {
        Self { tick, fail_at: None }
    }

    /// Make `stage` fail once it is half done.
    pub fn failing_at(mut self, stage: StageId) -> Self {
        self.fail_at = Some(stage);
        self
    }
}

#[async_trait]
impl StageWorker for SimulatedWorker {
    async fn step(
        &self,
        stage: &PipelineStage,
        _config: &ValidatedJobConfig,
        progress: u8,
    ) -> Result<(), StageError> {
        tokio::time::sleep(self.tick).await;

        if self.fail_at == Some(stage.id) && progress >= 50 {
            return Err(StageError(format!(
                "simulated failure in {} at {progress}%",
                stage.display_name
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
