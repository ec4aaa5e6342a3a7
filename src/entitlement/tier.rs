//! Subscription tiers and the option categories they gate.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// UnknownTierError
// ---------------------------------------------------------------------------

/// Raised when a tier name read from user input or a settings file does not
/// name one of the known [`Tier`]s.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown subscription tier `{0}` (expected `free` or `pro`)")]
pub struct UnknownTierError(pub String);

// ---------------------------------------------------------------------------
// Tier
// ---------------------------------------------------------------------------

/// Subscription level controlling entitlements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Free,
    Pro,
}

impl Tier {
    /// Every tier, lowest first.
    pub const ALL: [Tier; 2] = [Tier::Free, Tier::Pro];

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Free => "free",
            Tier::Pro => "pro",
        }
    }
}

impl Default for Tier {
    fn default() -> Self {
        Tier::Free
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = UnknownTierError;

    /// Case-insensitive; surrounding whitespace is ignored.
    ///
    /// ```
    /// use video_studio::entitlement::Tier;
    ///
    /// assert_eq!("Pro".parse::<Tier>().unwrap(), Tier::Pro);
    /// assert!("enterprise".parse::<Tier>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(Tier::Free),
            "pro" => Ok(Tier::Pro),
            _ => Err(UnknownTierError(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// OptionCategory
// ---------------------------------------------------------------------------

/// The tier-gated option dials of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionCategory {
    Avatar,
    Voice,
    Music,
    Format,
}

impl OptionCategory {
    /// Validation order.
    pub const ALL: [OptionCategory; 4] = [
        OptionCategory::Avatar,
        OptionCategory::Voice,
        OptionCategory::Music,
        OptionCategory::Format,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OptionCategory::Avatar => "avatar",
            OptionCategory::Voice => "voice",
            OptionCategory::Music => "music",
            OptionCategory::Format => "format",
        }
    }
}

impl fmt::Display for OptionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
