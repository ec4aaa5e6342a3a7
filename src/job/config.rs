//! Requested and validated job configurations.

use serde::{Deserialize, Serialize};

use crate::entitlement::{OptionCategory, Tier};

// ---------------------------------------------------------------------------
// JobConfig
// ---------------------------------------------------------------------------

/// A generation request exactly as the user entered it.
///
/// Nothing here has been checked against a tier yet; pass it through
/// [`validate`](crate::job::validate) to obtain a [`ValidatedJobConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobConfig {
    pub script: String,
    pub avatar: String,
    pub voice: String,
    pub music: String,
    pub format: String,
    pub duration_seconds: u32,
}

impl JobConfig {
    /// The tag chosen for `category`.
    pub fn option(&self, category: OptionCategory) -> &str {
        match category {
            OptionCategory::Avatar => &self.avatar,
            OptionCategory::Voice => &self.voice,
            OptionCategory::Music => &self.music,
            OptionCategory::Format => &self.format,
        }
    }
}

// ---------------------------------------------------------------------------
// ValidatedJobConfig
// ---------------------------------------------------------------------------

/// A [`JobConfig`] that passed validation for one specific [`Tier`].
///
/// Only the validator can build one, so holding a value is proof that every
/// option is allowed on [`tier`](Self::tier) and the duration lies within
/// that tier's bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidatedJobConfig {
    script: String,
    avatar: String,
    voice: String,
    music: String,
    format: String,
    duration_seconds: u32,
    requested_duration_seconds: u32,
    tier: Tier,
}

impl ValidatedJobConfig {
    /// Only called by the validator once every rule has passed.
    pub(crate) fn from_checked(config: JobConfig, duration_seconds: u32, tier: Tier) -> Self {
        Self {
            requested_duration_seconds: config.duration_seconds,
            script: config.script,
            avatar: config.avatar,
            voice: config.voice,
            music: config.music,
            format: config.format,
            duration_seconds,
            tier,
        }
    }

    pub fn script(&self) -> &str {
        &self.script
    }

    pub fn avatar(&self) -> &str {
        &self.avatar
    }

    pub fn voice(&self) -> &str {
        &self.voice
    }

    pub fn music(&self) -> &str {
        &self.music
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    /// Duration after clamping into the tier's bounds.
    pub fn duration_seconds(&self) -> u32 {
        self.duration_seconds
    }

    /// Duration the caller asked for.
    pub fn requested_duration_seconds(&self) -> u32 {
        self.requested_duration_seconds
    }

    pub fn was_duration_clamped(&self) -> bool {
        self.duration_seconds != self.requested_duration_seconds
    }

    /// The tier this configuration was validated against.
    pub fn tier(&self) -> Tier {
        self.tier
    }
}
