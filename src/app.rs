//! Caller-side session: the editor state behind a "create video" screen.
//!
//! [`Studio`] owns what the user edits between generations: the plan tier,
//! the script (typed or dictated through [`crate::capture`]), the selected
//! options and the orchestrator that turns them into a video.
//!
//! | Action | Effect |
//! |--------|--------|
//! | `select` | changes one option; Pro-only tags are refused on Free |
//! | `set_duration` | clamps into the tier's bounds |
//! | `upgrade_to_pro` | switches the tier; future jobs are unwatermarked |
//! | `generate` | validates and starts a job |
//! | `new_video` | clears the script, keeps the options |

use crate::capture::{CaptureError, CaptureSession, CaptureSource, ScriptBuffer};
use crate::config::{AppConfig, CaptureConfig, DefaultsConfig};
use crate::entitlement::{limits_for, EntitlementLimits, OptionCategory, Tier};
use crate::job::{JobConfig, ValidationError};
use crate::pipeline::{GenerationOrchestrator, Job, JobHandle, JobId, OrchestratorError};

// ---------------------------------------------------------------------------
// Studio
// ---------------------------------------------------------------------------

pub struct Studio {
    tier: Tier,
    script: ScriptBuffer,
    /// Currently selected options and duration.
    selection: DefaultsConfig,
    capture: CaptureConfig,
    orchestrator: GenerationOrchestrator,
    last_job: Option<JobId>,
}

impl Studio {
    pub fn new(config: &AppConfig, orchestrator: GenerationOrchestrator) -> Self {
        Self {
            tier: config.tier,
            script: ScriptBuffer::default(),
            selection: config.defaults.clone(),
            capture: config.capture.clone(),
            orchestrator,
            last_job: None,
        }
    }

    /// A studio backed by the simulated pipeline.
    pub fn simulated(config: &AppConfig) -> Self {
        Self::new(config, GenerationOrchestrator::simulated(config))
    }

    // ── Plan ─────────────────────────────────────────────────────────────

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn limits(&self) -> &'static EntitlementLimits {
        limits_for(self.tier)
    }

    /// Switch the session to Pro. Jobs already started keep their tier.
    pub fn upgrade_to_pro(&mut self) {
        if self.tier != Tier::Pro {
            log::info!("studio: upgraded {} → {}", self.tier, Tier::Pro);
            self.tier = Tier::Pro;
        }
    }

    // ── Script ───────────────────────────────────────────────────────────

    pub fn script(&self) -> &ScriptBuffer {
        &self.script
    }

    pub fn script_mut(&mut self) -> &mut ScriptBuffer {
        &mut self.script
    }

    /// Characters still available under the tier's script limit
    /// (negative when over).
    pub fn chars_remaining(&self) -> i64 {
        self.limits().max_script_chars as i64 - self.script.char_count() as i64
    }

    /// Run `source` in the configured language until it closes and fold its
    /// events into the script.
    pub async fn dictate<S: CaptureSource>(
        &mut self,
        source: S,
    ) -> Result<usize, CaptureError> {
        let mut session = CaptureSession::new(source, self.capture.clone());
        session.start()?;
        let mut applied = session.listen(&mut self.script).await?;
        applied += session.stop(&mut self.script)?;
        log::debug!("studio: dictation added {applied} events");
        Ok(applied)
    }

    // ── Options ──────────────────────────────────────────────────────────

    /// Select `value` for `category`. Pro-only tags are refused on the Free
    /// plan and the previous selection is kept.
    pub fn select(&mut self, category: OptionCategory, value: &str) -> Result<(), ValidationError> {
        if !self.limits().allows(category, value) {
            return Err(ValidationError::OptionNotAllowed {
                category,
                value: value.to_string(),
                tier: self.tier,
            });
        }
        let slot = match category {
            OptionCategory::Avatar => &mut self.selection.avatar,
            OptionCategory::Voice => &mut self.selection.voice,
            OptionCategory::Music => &mut self.selection.music,
            OptionCategory::Format => &mut self.selection.format,
        };
        *slot = value.to_string();
        Ok(())
    }

    /// Set the duration, clamped into the tier's bounds. Returns the value
    /// actually stored.
    pub fn set_duration(&mut self, seconds: u32) -> u32 {
        let clamped = self.limits().clamp_duration(seconds);
        self.selection.duration_seconds = clamped;
        clamped
    }

    /// The configuration [`generate`](Self::generate) would submit.
    pub fn job_config(&self) -> JobConfig {
        self.selection.job_config(self.script.text().trim())
    }

    // ── Generation ───────────────────────────────────────────────────────

    pub fn generate(&mut self) -> Result<JobHandle, OrchestratorError> {
        let handle = self.orchestrator.submit(self.job_config(), self.tier)?;
        self.last_job = Some(handle.id());
        Ok(handle)
    }

    pub fn last_job(&self) -> Option<Job> {
        self.last_job
            .and_then(|id| self.orchestrator.current_state(id).ok())
    }

    /// Start over with an empty script. Options stay selected.
    pub fn new_video(&mut self) {
        self.script.clear();
        self.last_job = None;
    }

    pub fn orchestrator(&self) -> &GenerationOrchestrator {
        &self.orchestrator
    }
}

// ---------------------------------------------------------------------------
// Rendering helpers
// ---------------------------------------------------------------------------

/// One-line progress summary, e.g. `Generating 43% · Creating avatar (30%)`.
pub fn status_line(job: &Job) -> String {
    match job.current_stage() {
        Some(run) if job.is_running() => format!(
            "{} {}% · {} ({}%)",
            job.overall_status.label(),
            job.overall_progress(),
            crate::pipeline::stage(run.stage_id).display_name,
            run.progress
        ),
        _ => format!("{} {}%", job.overall_status.label(), job.overall_progress()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{RecognitionEvent, ScriptedCapture};
    use crate::pipeline::JobStatus;

    fn studio() -> Studio {
        Studio::simulated(&AppConfig::default())
    }

    #[test]
    fn starts_on_configured_tier_with_defaults() {
        let studio = studio();
        assert_eq!(studio.tier(), Tier::Free);
        let config = studio.job_config();
        assert_eq!(config.avatar, "professional");
        assert_eq!(config.duration_seconds, 30);
        assert_eq!(config.script, "");
    }

    #[test]
    fn pro_option_refused_on_free_then_allowed_after_upgrade() {
        let mut studio = studio();
        let err = studio.select(OptionCategory::Avatar, "doctor").unwrap_err();
        assert!(matches!(err, ValidationError::OptionNotAllowed { tier: Tier::Free, .. }));
        assert_eq!(studio.job_config().avatar, "professional");

        studio.upgrade_to_pro();
        studio.select(OptionCategory::Avatar, "doctor").unwrap();
        assert_eq!(studio.job_config().avatar, "doctor");
    }

    #[test]
    fn duration_is_clamped_to_tier() {
        let mut studio = studio();
        assert_eq!(studio.set_duration(120), 30);
        assert_eq!(studio.set_duration(5), 15);

        studio.upgrade_to_pro();
        assert_eq!(studio.set_duration(120), 120);
        assert_eq!(studio.set_duration(900), 300);
    }

    #[test]
    fn chars_remaining_follows_tier_limit() {
        let mut studio = studio();
        studio.script_mut().set_text("x".repeat(480));
        assert_eq!(studio.chars_remaining(), 20);

        studio.script_mut().set_text("x".repeat(510));
        assert_eq!(studio.chars_remaining(), -10);

        studio.upgrade_to_pro();
        assert_eq!(studio.chars_remaining(), 1490);
    }

    #[tokio::test]
    async fn dictation_appends_final_fragments_only() {
        let mut studio = studio();
        let source = ScriptedCapture::new(vec![
            RecognitionEvent::Interim("Olá".into()),
            RecognitionEvent::Final("Olá pessoal".into()),
            RecognitionEvent::Interim("bem".into()),
        ]);
        assert_eq!(studio.dictate(source).await.unwrap(), 3);
        assert_eq!(studio.script().text(), "Olá pessoal ");
        assert_eq!(studio.job_config().script, "Olá pessoal");
    }

    #[tokio::test]
    async fn dictation_uses_configured_language() {
        let mut config = AppConfig::default();
        config.capture.language = "en-US".into();
        let mut studio = Studio::simulated(&config);

        let portuguese = ScriptedCapture::from_lines("Olá").recorded_in("pt-BR");
        assert!(matches!(
            studio.dictate(portuguese).await,
            Err(CaptureError::Unavailable(_))
        ));
        assert!(studio.script().is_blank());

        let english = ScriptedCapture::from_lines("Hello").recorded_in("en-US");
        assert_eq!(studio.dictate(english).await.unwrap(), 1);
        assert_eq!(studio.script().text(), "Hello ");
    }

    #[tokio::test]
    async fn generate_with_empty_script_is_rejected() {
        let mut studio = studio();
        let err = studio.generate().unwrap_err();
        assert_eq!(err, OrchestratorError::Validation(ValidationError::EmptyScript));
        assert!(studio.last_job().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn upgraded_session_produces_unwatermarked_video() {
        let mut studio = studio();
        studio.script_mut().set_text("Launch day!");
        studio.upgrade_to_pro();

        studio.generate().unwrap().finished().await;

        let job = studio.last_job().unwrap();
        assert_eq!(job.overall_status, JobStatus::Succeeded);
        assert!(!job.artifact.unwrap().watermarked);
        assert_eq!(status_line(&studio.last_job().unwrap()), "Done 100%");

        studio.new_video();
        assert!(studio.script().is_blank());
        assert!(studio.last_job().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn status_line_before_first_stage() {
        let mut studio = studio();
        studio.script_mut().set_text("Hello");
        let handle = studio.generate().unwrap();
        let job = studio.last_job().unwrap();
        // Not polled yet: running, no stage started.
        assert_eq!(status_line(&job), "Generating 0%");

        studio.orchestrator().cancel(handle.id()).unwrap();
        handle.finished().await;
    }
}
