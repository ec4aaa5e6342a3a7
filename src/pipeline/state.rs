//! Per-job runtime state: the [`Job`] aggregate and its state machine.
//!
//! ```text
//! Idle ──start──▶ Running ──last stage done──▶ Succeeded
//!                    ├──────stage failed─────▶ Failed
//!                    └──────cancel───────────▶ Cancelled
//! ```
//!
//! Terminal states are final; retrying means creating a new job.
//!
//! Every transition method keeps the snapshot invariants: a `Completed`
//! stage always shows 100 %, progress never goes down, and a stage is only
//! `Processing` once all earlier stages are `Completed`.

use std::fmt;

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::config::ArtifactConfig;
use crate::entitlement::{limits_for, Resolution, Tier};
use crate::job::ValidatedJobConfig;

use super::stage::{all_stages, StageId};

// ---------------------------------------------------------------------------
// JobId
// ---------------------------------------------------------------------------

/// Unique identifier of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    pub fn new() -> Self {
        JobId(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

// ---------------------------------------------------------------------------
// StageStatus / StageRun
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

/// Runtime status of one stage within one job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageRun {
    pub stage_id: StageId,
    pub status: StageStatus,
    /// Percentage, 0 – 100.
    pub progress: u8,
}

impl StageRun {
    fn pending(stage_id: StageId) -> Self {
        Self {
            stage_id,
            status: StageStatus::Pending,
            progress: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// JobStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Idle,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl JobStatus {
    /// ```
    /// use video_studio::pipeline::JobStatus;
    ///
    /// assert!(!JobStatus::Idle.is_terminal());
    /// assert!(!JobStatus::Running.is_terminal());
    /// assert!(JobStatus::Succeeded.is_terminal());
    /// assert!(JobStatus::Failed.is_terminal());
    /// assert!(JobStatus::Cancelled.is_terminal());
    /// ```
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobStatus::Succeeded | JobStatus::Failed | JobStatus::Cancelled
        )
    }

    /// A short human-readable label suitable for a status line.
    pub fn label(self) -> &'static str {
        match self {
            JobStatus::Idle => "Idle",
            JobStatus::Running => "Generating",
            JobStatus::Succeeded => "Done",
            JobStatus::Failed => "Failed",
            JobStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// StageFailure
// ---------------------------------------------------------------------------

/// Why a job ended in [`JobStatus::Failed`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("stage `{stage}` failed: {reason}")]
pub struct StageFailure {
    pub stage: StageId,
    pub reason: String,
}

// ---------------------------------------------------------------------------
// GeneratedArtifact
// ---------------------------------------------------------------------------

/// What a share sheet is handed for a finished video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShareMessage {
    pub title: String,
    pub text: String,
    pub url: String,
}

impl fmt::Display for ShareMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.text, self.url)
    }
}

/// The media reference produced by a succeeded job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedArtifact {
    pub job_id: JobId,
    /// Opaque handle the caller resolves to the video.
    pub media_ref: String,
    pub watermarked: bool,
    pub format: String,
    pub duration_seconds: u32,
    pub resolution: Resolution,
    /// Suggested download file name.
    pub file_name: String,
    pub share: ShareMessage,
}

impl GeneratedArtifact {
    /// Describe the output of `job` under the naming rules in `settings`.
    pub fn for_job(job: &Job, settings: &ArtifactConfig) -> Self {
        let limits = limits_for(job.tier);
        let suffix = if limits.watermarked { "watermark" } else { "pro" };
        let media_ref = format!(
            "{}/{}.mp4",
            settings.media_base_url.trim_end_matches('/'),
            job.id
        );
        Self {
            job_id: job.id,
            share: ShareMessage {
                title: settings.share_title.clone(),
                text: settings.share_text.clone(),
                url: media_ref.clone(),
            },
            media_ref,
            watermarked: limits.watermarked,
            format: job.config.format().to_string(),
            duration_seconds: job.config.duration_seconds(),
            resolution: limits.max_resolution,
            file_name: format!("{}-{suffix}.mp4", settings.file_prefix),
        }
    }

    /// One-line message for channels without a separate title field.
    pub fn share_text(&self) -> String {
        self.share.to_string()
    }
}

// ---------------------------------------------------------------------------
// Job
// ---------------------------------------------------------------------------

/// One generation request and its full in-flight state.
///
/// Callers only ever see clones (snapshots); the orchestrator owns the live
/// record and mutates it through the `pub(crate)` transition methods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Job {
    pub id: JobId,
    pub config: ValidatedJobConfig,
    pub tier: Tier,
    /// One entry per registry stage, in registry order.
    pub stage_runs: Vec<StageRun>,
    pub overall_status: JobStatus,
    /// Set when `overall_status == Failed`.
    pub failure: Option<StageFailure>,
    /// Set when `overall_status == Succeeded`.
    pub artifact: Option<GeneratedArtifact>,
}

impl Job {
    /// A fresh `Idle` job with every stage `Pending` at 0 %.
    pub fn new(id: JobId, config: ValidatedJobConfig) -> Self {
        Self {
            id,
            tier: config.tier(),
            config,
            stage_runs: all_stages()
                .iter()
                .map(|stage| StageRun::pending(stage.id))
                .collect(),
            overall_status: JobStatus::Idle,
            failure: None,
            artifact: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.overall_status == JobStatus::Running
    }

    /// The stage currently `Processing`, if any.
    pub fn current_stage(&self) -> Option<&StageRun> {
        self.stage_runs
            .iter()
            .find(|run| run.status == StageStatus::Processing)
    }

    /// Mean progress over all stages, 0 – 100.
    pub fn overall_progress(&self) -> u8 {
        if self.stage_runs.is_empty() {
            return 0;
        }
        let total: u32 = self.stage_runs.iter().map(|run| u32::from(run.progress)).sum();
        (total / self.stage_runs.len() as u32) as u8
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    pub(crate) fn start(&mut self) {
        debug_assert_eq!(self.overall_status, JobStatus::Idle);
        self.overall_status = JobStatus::Running;
    }

    /// Move stage `index` to `Processing` at 0 %.
    pub(crate) fn begin_stage(&mut self, index: usize) {
        debug_assert!(self.is_running());
        debug_assert!(
            self.stage_runs[..index]
                .iter()
                .all(|run| run.status == StageStatus::Completed),
            "stage {index} started before its predecessors completed"
        );
        let run = &mut self.stage_runs[index];
        run.status = StageStatus::Processing;
        run.progress = 0;
    }

    /// Raise stage `index` to `progress` (capped at 100, never lowered).
    /// Reaching 100 completes the stage. Returns `true` once completed.
    pub(crate) fn advance_stage(&mut self, index: usize, progress: u8) -> bool {
        let run = &mut self.stage_runs[index];
        debug_assert_eq!(run.status, StageStatus::Processing);
        run.progress = run.progress.max(progress.min(100));
        if run.progress == 100 {
            run.status = StageStatus::Completed;
        }
        run.status == StageStatus::Completed
    }

    pub(crate) fn fail_stage(&mut self, index: usize, reason: String) {
        let run = &mut self.stage_runs[index];
        run.status = StageStatus::Failed;
        self.failure = Some(StageFailure {
            stage: run.stage_id,
            reason,
        });
        self.overall_status = JobStatus::Failed;
    }

    pub(crate) fn cancel(&mut self) {
        self.overall_status = JobStatus::Cancelled;
    }

    pub(crate) fn succeed(&mut self, artifact: GeneratedArtifact) {
        debug_assert!(self
            .stage_runs
            .iter()
            .all(|run| run.status == StageStatus::Completed));
        self.overall_status = JobStatus::Succeeded;
        self.artifact = Some(artifact);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
