//! Generation orchestrator: drives one job through every pipeline stage.
//!
//! [`GenerationOrchestrator`] keeps a table of jobs behind an
//! `Arc<Mutex<…>>` and runs the active one on a spawned tokio task.
//!
//! # Job flow
//!
//! ```text
//! start_job(config, tier)
//!   └─▶ Job{Running, all stages Pending}            [snapshot]
//!         for stage in registry order:
//!           begin_stage → Processing, 0 %           [snapshot]
//!           loop: worker.step().await               ← suspension point
//!                 advance_stage(+step)              [snapshot]
//!                 100 % → Completed
//!           worker error → stage Failed, job Failed [snapshot]  (stop)
//!         all stages done → Succeeded + artifact    [snapshot]
//! ```
//!
//! Every mutation happens inside one short critical section that also takes
//! and publishes the snapshot, so pollers and subscribers never see a
//! half-applied update and receive a job's snapshots in transition order.
//! The lock is never held across `.await`.
//!
//! Finished jobs stay queryable until they are discarded or pushed out by
//! newer ones (`pipeline.history_limit`).
//!
//! Cancellation is cooperative: [`cancel`](GenerationOrchestrator::cancel)
//! marks the job `Cancelled` right away and the background task notices at
//! its next suspension point, discarding whatever that tick produced.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::config::{AppConfig, ArtifactConfig};
use crate::entitlement::{limits_for, QuotaLedger, Tier};
use crate::job::{validate, JobConfig, ValidatedJobConfig, ValidationError};

use super::stage::all_stages;
use super::state::{GeneratedArtifact, Job, JobId, JobStatus};
use super::worker::{SimulatedWorker, StageWorker};

// ---------------------------------------------------------------------------
// OrchestratorError
// ---------------------------------------------------------------------------

/// Errors returned by orchestrator calls.
///
/// None of these affect the orchestrator itself; they describe why one call
/// was refused. Stage failures are not errors of a call, they are recorded
/// on the job (see [`Job::failure`]).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrchestratorError {
    #[error("job {active} is already running")]
    JobAlreadyRunning { active: JobId },

    #[error("job {id} is not running ({status})")]
    JobNotRunning { id: JobId, status: JobStatus },

    #[error("job {0} is still running")]
    JobStillRunning(JobId),

    #[error("no job with id {0}")]
    UnknownJob(JobId),

    #[error("job {id} has no artifact ({status})")]
    ArtifactUnavailable { id: JobId, status: JobStatus },

    #[error("configuration was validated for the {validated_for} plan, not {requested}")]
    TierMismatch { validated_for: Tier, requested: Tier },

    #[error("monthly quota of {quota} videos used up on the {tier} plan")]
    QuotaExceeded { tier: Tier, quota: u32 },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

// ---------------------------------------------------------------------------
// JobHandle
// ---------------------------------------------------------------------------

/// Returned by [`GenerationOrchestrator::start_job`].
///
/// Dropping the handle does not stop the job; use
/// [`GenerationOrchestrator::cancel`] for that.
#[derive(Debug)]
pub struct JobHandle {
    id: JobId,
    task: JoinHandle<()>,
}

impl JobHandle {
    pub fn id(&self) -> JobId {
        self.id
    }

    /// Wait until the background task has stopped driving the job, whatever
    /// its final status.
    pub async fn finished(self) {
        if let Err(e) = self.task.await {
            log::error!("pipeline: task for job {} aborted: {e}", self.id);
        }
    }
}

// ---------------------------------------------------------------------------
// Internal state
// ---------------------------------------------------------------------------

struct JobTable {
    jobs: HashMap<JobId, Job>,
    /// Submission order, oldest first.
    order: VecDeque<JobId>,
    /// The one job allowed to be `Running`.
    active: Option<JobId>,
    ledger: QuotaLedger,
}

impl JobTable {
    /// Drop the oldest finished jobs until at most `limit` remain.
    fn evict_finished(&mut self, limit: usize) {
        while self.jobs.len() > limit {
            let Some(pos) = self
                .order
                .iter()
                .position(|id| self.jobs.get(id).map_or(true, |job| !job.is_running()))
            else {
                return;
            };
            if let Some(id) = self.order.remove(pos) {
                self.jobs.remove(&id);
                log::debug!("pipeline: job {id} evicted from history");
            }
        }
    }

    fn remove(&mut self, id: JobId) -> Option<Job> {
        self.order.retain(|queued| *queued != id);
        self.jobs.remove(&id)
    }
}

struct Settings {
    progress_step: u8,
    history_limit: usize,
    enforce_quota: bool,
    artifact: ArtifactConfig,
}

// ---------------------------------------------------------------------------
// GenerationOrchestrator
// ---------------------------------------------------------------------------

/// Runs generation jobs, at most one at a time.
///
/// Cheap to clone; clones share the same job table.
///
/// ```rust,no_run
/// use video_studio::config::AppConfig;
/// use video_studio::entitlement::Tier;
/// use video_studio::pipeline::GenerationOrchestrator;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = AppConfig::default();
/// let orchestrator = GenerationOrchestrator::simulated(&config);
///
/// let job = config.defaults.job_config("Hello world");
/// let handle = orchestrator.submit(job, Tier::Free)?;
/// let id = handle.id();
/// handle.finished().await;
///
/// let artifact = orchestrator.artifact_for(id)?;
/// println!("{}", artifact.media_ref);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct GenerationOrchestrator {
    table: Arc<Mutex<JobTable>>,
    worker: Arc<dyn StageWorker>,
    events: broadcast::Sender<Job>,
    settings: Arc<Settings>,
}

impl GenerationOrchestrator {
    /// Create an orchestrator whose stages are executed by `worker`.
    pub fn new(config: &AppConfig, worker: Arc<dyn StageWorker>) -> Self {
        let (events, _) = broadcast::channel(config.pipeline.event_capacity.max(1));
        Self {
            table: Arc::new(Mutex::new(JobTable {
                jobs: HashMap::new(),
                order: VecDeque::new(),
                active: None,
                ledger: QuotaLedger::new(),
            })),
            worker,
            events,
            settings: Arc::new(Settings {
                progress_step: config.pipeline.progress_step.clamp(1, 100),
                history_limit: config.pipeline.history_limit.max(1),
                enforce_quota: config.quota.enforce,
                artifact: config.artifact.clone(),
            }),
        }
    }

    /// Create an orchestrator backed by [`SimulatedWorker`] ticking at
    /// `config.pipeline.tick_interval_ms`.
    pub fn simulated(config: &AppConfig) -> Self {
        let worker = SimulatedWorker::new(config.pipeline.tick_interval());
        Self::new(config, Arc::new(worker))
    }

    // -----------------------------------------------------------------------
    // Submission
    // -----------------------------------------------------------------------

    /// Validate `config` for `tier`, then start it.
    pub fn submit(&self, config: JobConfig, tier: Tier) -> Result<JobHandle, OrchestratorError> {
        let validated = validate(config, tier)?;
        self.start_job(validated, tier)
    }

    /// Start a job for an already validated configuration.
    ///
    /// Fails fast when another job is running; nothing is queued. Must be
    /// called from within a tokio runtime.
    pub fn start_job(
        &self,
        config: ValidatedJobConfig,
        tier: Tier,
    ) -> Result<JobHandle, OrchestratorError> {
        if config.tier() != tier {
            return Err(OrchestratorError::TierMismatch {
                validated_for: config.tier(),
                requested: tier,
            });
        }

        let id = JobId::new();
        {
            let mut table = self.lock();
            if let Some(active) = table.active {
                log::warn!("pipeline: rejected new job, {active} is still running");
                return Err(OrchestratorError::JobAlreadyRunning { active });
            }
            if self.settings.enforce_quota && !table.ledger.has_capacity(tier) {
                return Err(OrchestratorError::QuotaExceeded {
                    tier,
                    quota: limits_for(tier).monthly_video_quota.unwrap_or(0),
                });
            }

            let mut job = Job::new(id, config.clone());
            job.start();
            self.publish(&job);
            table.jobs.insert(id, job);
            table.order.push_back(id);
            table.active = Some(id);
            table.evict_finished(self.settings.history_limit);
        }

        log::info!(
            "pipeline: job {id} accepted ({tier}, {}s, {})",
            config.duration_seconds(),
            config.format()
        );

        let task = tokio::spawn(self.clone().drive(id, config));
        Ok(JobHandle { id, task })
    }

    // -----------------------------------------------------------------------
    // Control and queries
    // -----------------------------------------------------------------------

    /// Cancel a running job. Takes effect at the job's next suspension
    /// point; no artifact is produced.
    pub fn cancel(&self, id: JobId) -> Result<(), OrchestratorError> {
        {
            let mut table = self.lock();
            let job = table
                .jobs
                .get_mut(&id)
                .ok_or(OrchestratorError::UnknownJob(id))?;
            if !job.is_running() {
                return Err(OrchestratorError::JobNotRunning {
                    id,
                    status: job.overall_status,
                });
            }
            job.cancel();
            self.publish(job);
            if table.active == Some(id) {
                table.active = None;
            }
        }

        log::info!("pipeline: job {id} cancelled");
        Ok(())
    }

    /// Snapshot of job `id` as of its latest completed update.
    pub fn current_state(&self, id: JobId) -> Result<Job, OrchestratorError> {
        self.lock()
            .jobs
            .get(&id)
            .cloned()
            .ok_or(OrchestratorError::UnknownJob(id))
    }

    /// The artifact of a succeeded job.
    pub fn artifact_for(&self, id: JobId) -> Result<GeneratedArtifact, OrchestratorError> {
        let table = self.lock();
        let job = table.jobs.get(&id).ok_or(OrchestratorError::UnknownJob(id))?;
        job.artifact
            .clone()
            .ok_or(OrchestratorError::ArtifactUnavailable {
                id,
                status: job.overall_status,
            })
    }

    /// The job currently `Running`, if any.
    pub fn active_job(&self) -> Option<JobId> {
        self.lock().active
    }

    /// Drop a finished job from the history and return its final state.
    pub fn discard(&self, id: JobId) -> Result<Job, OrchestratorError> {
        let mut table = self.lock();
        match table.jobs.get(&id) {
            None => Err(OrchestratorError::UnknownJob(id)),
            Some(job) if job.is_running() => Err(OrchestratorError::JobStillRunning(id)),
            Some(_) => table.remove(id).ok_or(OrchestratorError::UnknownJob(id)),
        }
    }

    /// Every job still on record, oldest first.
    pub fn history(&self) -> Vec<Job> {
        let table = self.lock();
        table
            .order
            .iter()
            .filter_map(|id| table.jobs.get(id).cloned())
            .collect()
    }

    /// Receive a snapshot after every state transition of every job.
    ///
    /// Subscribers that fall more than `pipeline.event_capacity` snapshots
    /// behind miss the oldest ones (`RecvError::Lagged`).
    pub fn subscribe(&self) -> broadcast::Receiver<Job> {
        self.events.subscribe()
    }

    /// Videos produced on `tier` so far.
    pub fn quota_used(&self, tier: Tier) -> u32 {
        self.lock().ledger.used(tier)
    }

    /// Videos `tier` may still produce; `None` when unlimited.
    pub fn quota_remaining(&self, tier: Tier) -> Option<u32> {
        self.lock().ledger.remaining(tier)
    }

    /// Start a new quota period for every tier.
    pub fn reset_quota(&self) {
        self.lock().ledger.reset();
        log::info!("pipeline: quota period reset");
    }

    // -----------------------------------------------------------------------
    // Background task
    // -----------------------------------------------------------------------

    async fn drive(self, id: JobId, config: ValidatedJobConfig) {
        for (index, stage) in all_stages().iter().enumerate() {
            if !self.apply(id, |job| job.begin_stage(index)) {
                return;
            }
            log::info!("pipeline: job {id} → {}", stage.display_name);

            let mut progress = 0u8;
            loop {
                if let Err(e) = self.worker.step(stage, &config, progress).await {
                    log::error!("pipeline: job {id} failed in {}: {e}", stage.id);
                    self.apply(id, |job| job.fail_stage(index, e.to_string()));
                    return;
                }

                progress = progress
                    .saturating_add(self.settings.progress_step)
                    .min(100);
                let mut completed = false;
                if !self.apply(id, |job| completed = job.advance_stage(index, progress)) {
                    log::debug!("pipeline: job {id} stopped during {}", stage.id);
                    return;
                }
                log::trace!("pipeline: job {id} {} at {progress}%", stage.id);
                if completed {
                    break;
                }
            }
        }

        self.finish(id);
    }

    /// Apply `update` to job `id` if it is still running, then publish the
    /// result. Returns `true` while the job keeps running.
    fn apply(&self, id: JobId, update: impl FnOnce(&mut Job)) -> bool {
        let mut table = self.lock();
        let Some(job) = table.jobs.get_mut(&id) else {
            return false;
        };
        if !job.is_running() {
            return false;
        }
        update(job);
        self.publish(job);
        let running = job.is_running();
        if !running && table.active == Some(id) {
            table.active = None;
        }
        running
    }

    fn finish(&self, id: JobId) {
        let mut guard = self.lock();
        let table = &mut *guard;
        let Some(job) = table.jobs.get_mut(&id) else {
            return;
        };
        if !job.is_running() {
            return;
        }
        let artifact = GeneratedArtifact::for_job(job, &self.settings.artifact);
        log::info!("pipeline: job {id} done → {}", artifact.media_ref);
        job.succeed(artifact);
        self.publish(job);
        table.ledger.record(job.tier);
        if table.active == Some(id) {
            table.active = None;
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn lock(&self) -> MutexGuard<'_, JobTable> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Broadcast a snapshot of `job`. Called with the table locked so that
    /// snapshots go out in the order the transitions happened.
    fn publish(&self, job: &Job) {
        // Err only means nobody is subscribed.
        let _ = self.events.send(job.clone());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
