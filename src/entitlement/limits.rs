//! Per-tier entitlement limits.
//!
//! The catalog is two `static` tables; [`limits_for`] hands out references
//! to them, so lookups never allocate and need no locking.

use serde::Serialize;

use super::tier::{OptionCategory, Tier};

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Highest output resolution a tier may render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Resolution {
    #[serde(rename = "hd")]
    Hd,
    #[serde(rename = "4k")]
    Uhd4k,
}

impl Resolution {
    pub fn label(self) -> &'static str {
        match self {
            Resolution::Hd => "HD",
            Resolution::Uhd4k => "4K",
        }
    }
}

// ---------------------------------------------------------------------------
// Option catalog
// ---------------------------------------------------------------------------

const FREE_AVATARS: &[&str] = &["professional", "casual", "creative"];
const PRO_AVATARS: &[&str] = &[
    "professional",
    "casual",
    "creative",
    "tech",
    "influencer",
    "doctor",
];

const FREE_VOICES: &[&str] = &["natural-female", "natural-male"];
const PRO_VOICES: &[&str] = &[
    "natural-female",
    "natural-male",
    "energetic",
    "calm",
    "professional",
    "young",
];

const FREE_MUSIC: &[&str] = &["upbeat", "corporate", "chill", "none"];
const PRO_MUSIC: &[&str] = &[
    "upbeat",
    "corporate",
    "chill",
    "none",
    "epic",
    "tech",
    "acoustic",
];

const FREE_FORMATS: &[&str] = &["vertical", "square"];
const PRO_FORMATS: &[&str] = &["vertical", "square", "horizontal", "tiktok"];

/// Shortest video any tier may request.
const MIN_DURATION_SECONDS: u32 = 15;

// ---------------------------------------------------------------------------
// EntitlementLimits
// ---------------------------------------------------------------------------

/// The limits and allowed option sets a [`Tier`] grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntitlementLimits {
    pub tier: Tier,
    pub max_script_chars: usize,
    pub min_duration_seconds: u32,
    pub max_duration_seconds: u32,
    /// Granularity of the duration dial offered to users. Informational: the
    /// validator clamps but does not snap to it.
    pub duration_step_seconds: u32,
    pub allowed_avatars: &'static [&'static str],
    pub allowed_voices: &'static [&'static str],
    pub allowed_music: &'static [&'static str],
    pub allowed_formats: &'static [&'static str],
    /// Whether produced artifacts carry the studio watermark.
    pub watermarked: bool,
    /// Videos per month; `None` is unlimited.
    pub monthly_video_quota: Option<u32>,
    pub max_resolution: Resolution,
}

static FREE_LIMITS: EntitlementLimits = EntitlementLimits {
    tier: Tier::Free,
    max_script_chars: 500,
    min_duration_seconds: MIN_DURATION_SECONDS,
    max_duration_seconds: 30,
    duration_step_seconds: 5,
    allowed_avatars: FREE_AVATARS,
    allowed_voices: FREE_VOICES,
    allowed_music: FREE_MUSIC,
    allowed_formats: FREE_FORMATS,
    watermarked: true,
    monthly_video_quota: Some(3),
    max_resolution: Resolution::Hd,
};

static PRO_LIMITS: EntitlementLimits = EntitlementLimits {
    tier: Tier::Pro,
    max_script_chars: 2000,
    min_duration_seconds: MIN_DURATION_SECONDS,
    max_duration_seconds: 300,
    duration_step_seconds: 5,
    allowed_avatars: PRO_AVATARS,
    allowed_voices: PRO_VOICES,
    allowed_music: PRO_MUSIC,
    allowed_formats: PRO_FORMATS,
    watermarked: false,
    monthly_video_quota: None,
    max_resolution: Resolution::Uhd4k,
};

impl EntitlementLimits {
    /// The allowed tags for `category`.
    pub fn allowed(&self, category: OptionCategory) -> &'static [&'static str] {
        match category {
            OptionCategory::Avatar => self.allowed_avatars,
            OptionCategory::Voice => self.allowed_voices,
            OptionCategory::Music => self.allowed_music,
            OptionCategory::Format => self.allowed_formats,
        }
    }

    /// Exact, case-sensitive membership test.
    pub fn allows(&self, category: OptionCategory, value: &str) -> bool {
        self.allowed(category).contains(&value)
    }

    /// Clamp `seconds` into `[min_duration_seconds, max_duration_seconds]`.
    pub fn clamp_duration(&self, seconds: u32) -> u32 {
        seconds.clamp(self.min_duration_seconds, self.max_duration_seconds)
    }

    /// Videos still available this month after `used` ones; `None` when the
    /// tier is unlimited.
    pub fn remaining_quota(&self, used: u32) -> Option<u32> {
        self.monthly_video_quota
            .map(|quota| quota.saturating_sub(used))
    }
}

/// Look up the limits for `tier`.
///
/// ```
/// use video_studio::entitlement::{limits_for, Tier};
///
/// assert_eq!(limits_for(Tier::Free).max_script_chars, 500);
/// assert_eq!(limits_for(Tier::Pro).max_duration_seconds, 300);
/// ```
pub fn limits_for(tier: Tier) -> &'static EntitlementLimits {
    match tier {
        Tier::Free => &FREE_LIMITS,
        Tier::Pro => &PRO_LIMITS,
    }
}

/// Whether `value` may be chosen for `category` on `tier`.
pub fn is_option_allowed(tier: Tier, category: OptionCategory, value: &str) -> bool {
    limits_for(tier).allows(category, value)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
