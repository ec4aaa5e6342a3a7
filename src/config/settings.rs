//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.

use std::time::Duration;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use super::AppPaths;
use crate::entitlement::Tier;
use crate::job::JobConfig;

// ---------------------------------------------------------------------------
// PipelineConfig
// ---------------------------------------------------------------------------

/// Pacing of the generation pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Delay between two progress increments of a stage, in milliseconds.
    pub tick_interval_ms: u64,
    /// Percentage points added to a stage's progress per tick (1 – 100).
    pub progress_step: u8,
    /// Buffered snapshots per subscriber before slow subscribers start
    /// missing events.
    pub event_capacity: usize,
    /// Jobs kept for `current_state` before the oldest finished ones are
    /// dropped.
    pub history_limit: usize,
}

impl PipelineConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 200,
            progress_step: 10,
            event_capacity: 256,
            history_limit: 20,
        }
    }
}

// ---------------------------------------------------------------------------
// DefaultsConfig
// ---------------------------------------------------------------------------

/// Option tags preselected for a new script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    pub avatar: String,
    pub voice: String,
    pub music: String,
    pub format: String,
    pub duration_seconds: u32,
}

impl DefaultsConfig {
    /// Build a [`JobConfig`] for `script` using these defaults.
    pub fn job_config(&self, script: impl Into<String>) -> JobConfig {
        JobConfig {
            script: script.into(),
            avatar: self.avatar.clone(),
            voice: self.voice.clone(),
            music: self.music.clone(),
            format: self.format.clone(),
            duration_seconds: self.duration_seconds,
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            avatar: "professional".into(),
            voice: "natural-female".into(),
            music: "upbeat".into(),
            format: "vertical".into(),
            duration_seconds: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// QuotaConfig
// ---------------------------------------------------------------------------

/// Monthly video quota accounting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotaConfig {
    /// Refuse new jobs once the tier's monthly quota has been used.
    ///
    /// Off by default: quotas are declared per tier but only counted.
    pub enforce: bool,
}

// ---------------------------------------------------------------------------
// ArtifactConfig
// ---------------------------------------------------------------------------

/// Naming of produced artifacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactConfig {
    /// Prefix of every `media_ref`; the job id and `.mp4` are appended.
    pub media_base_url: String,
    /// Stem of the suggested download file name.
    pub file_prefix: String,
    /// Title offered when sharing a finished video.
    pub share_title: String,
    /// Message that accompanies the shared link.
    pub share_text: String,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            media_base_url: "/api/videos".into(),
            file_prefix: "video-ia".into(),
            share_title: "My AI-generated video".into(),
            share_text: "Check out this video I made with VideoIA Creator!".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// CaptureConfig
// ---------------------------------------------------------------------------

/// Speech capture settings handed to a [`CaptureSource`](crate::capture::CaptureSource).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// BCP-47 recognition language.
    pub language: String,
    /// Surface interim (not yet final) fragments as a live preview.
    pub interim_results: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            language: "pt-BR".into(),
            interim_results: true,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use video_studio::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Subscription tier a new session starts on.
    pub tier: Tier,
    pub pipeline: PipelineConfig,
    pub defaults: DefaultsConfig,
    pub quota: QuotaConfig,
    pub artifact: ArtifactConfig,
    pub capture: CaptureConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        let step = self.pipeline.progress_step;
        if step == 0 || step > 100 {
            bail!("pipeline.progress_step must be within 1..=100, got {step}");
        }
        if self.pipeline.event_capacity == 0 {
            bail!("pipeline.event_capacity must be greater than zero");
        }
        if self.pipeline.history_limit == 0 {
            bail!("pipeline.history_limit must be greater than zero");
        }
        if self.capture.language.trim().is_empty() {
            bail!("capture.language must name a BCP-47 language");
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
