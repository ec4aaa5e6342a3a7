//! Job configuration validator.
//!
//! Rules run in a fixed order and the first violation wins:
//!
//! 1. the script must contain something other than whitespace,
//! 2. the script must fit the tier's character limit,
//! 3. avatar, voice, music and format must each be allowed on the tier,
//! 4. the duration is clamped into the tier's bounds.
//!
//! Clamping is the only silent adjustment. The script is never truncated
//! and options are never substituted.

use thiserror::Error;

use crate::entitlement::{limits_for, OptionCategory, Tier};

use super::config::{JobConfig, ValidatedJobConfig};

// ---------------------------------------------------------------------------
// ValidationError
// ---------------------------------------------------------------------------

/// Reasons a [`JobConfig`] is rejected for a tier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("the script is empty")]
    EmptyScript,

    #[error("the script is longer than {limit} characters")]
    ScriptTooLong { limit: usize },

    #[error("{category} `{value}` is not available on the {tier} plan")]
    OptionNotAllowed {
        category: OptionCategory,
        value: String,
        tier: Tier,
    },
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

/// Check `config` against the limits of `tier`.
///
/// Script length is counted in characters, not bytes.
///
/// ```
/// use video_studio::entitlement::Tier;
/// use video_studio::job::{validate, JobConfig};
///
/// let config = JobConfig {
///     script: "Hello world".into(),
///     avatar: "professional".into(),
///     voice: "natural-female".into(),
///     music: "upbeat".into(),
///     format: "vertical".into(),
///     duration_seconds: 100,
/// };
/// let validated = validate(config, Tier::Free).unwrap();
/// assert_eq!(validated.duration_seconds(), 30);
/// ```
pub fn validate(config: JobConfig, tier: Tier) -> Result<ValidatedJobConfig, ValidationError> {
    let limits = limits_for(tier);

    if config.script.trim().is_empty() {
        return Err(ValidationError::EmptyScript);
    }

    if config.script.chars().count() > limits.max_script_chars {
        return Err(ValidationError::ScriptTooLong {
            limit: limits.max_script_chars,
        });
    }

    for category in OptionCategory::ALL {
        let value = config.option(category);
        if !limits.allows(category, value) {
            return Err(ValidationError::OptionNotAllowed {
                category,
                value: value.to_string(),
                tier,
            });
        }
    }

    let duration = limits.clamp_duration(config.duration_seconds);
    if duration != config.duration_seconds {
        log::debug!(
            "validate: duration {}s clamped to {duration}s for {tier}",
            config.duration_seconds
        );
    }

    Ok(ValidatedJobConfig::from_checked(config, duration, tier))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn config(script: &str) -> JobConfig {
        JobConfig {
            script: script.into(),
            avatar: "professional".into(),
            voice: "natural-female".into(),
            music: "upbeat".into(),
            format: "vertical".into(),
            duration_seconds: 30,
        }
    }

    // ---- Script rules ---

    #[test]
    fn empty_script_is_rejected_on_every_tier() {
        for tier in Tier::ALL {
            assert_eq!(validate(config(""), tier), Err(ValidationError::EmptyScript));
            assert_eq!(
                validate(config("  \n\t "), tier),
                Err(ValidationError::EmptyScript)
            );
        }
    }

    #[test]
    fn overlong_script_is_rejected_on_every_tier() {
        for tier in Tier::ALL {
            let limit = limits_for(tier).max_script_chars;
            let script = "a".repeat(limit + 1);
            assert_eq!(
                validate(config(&script), tier),
                Err(ValidationError::ScriptTooLong { limit })
            );
        }
    }

    #[test]
    fn script_at_limit_is_accepted() {
        let script = "a".repeat(500);
        let validated = validate(config(&script), Tier::Free).unwrap();
        assert_eq!(validated.script().len(), 500);
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        // 500 two-byte characters: 1000 bytes but within the Free limit.
        let script = "é".repeat(500);
        assert!(validate(config(&script), Tier::Free).is_ok());
    }

    #[test]
    fn empty_check_precedes_option_check() {
        let mut cfg = config("   ");
        cfg.avatar = "tech".into();
        assert_eq!(validate(cfg, Tier::Free), Err(ValidationError::EmptyScript));
    }

    #[test]
    fn length_check_precedes_option_check() {
        let mut cfg = config(&"x".repeat(600));
        cfg.format = "tiktok".into();
        assert_eq!(
            validate(cfg, Tier::Free),
            Err(ValidationError::ScriptTooLong { limit: 500 })
        );
    }

    // ---- Option rules ---

    #[test]
    fn first_disallowed_option_wins() {
        let mut cfg = config("Hello");
        cfg.voice = "calm".into();
        cfg.format = "horizontal".into();
        assert_eq!(
            validate(cfg, Tier::Free),
            Err(ValidationError::OptionNotAllowed {
                category: OptionCategory::Voice,
                value: "calm".into(),
                tier: Tier::Free,
            })
        );
    }

    #[test]
    fn unknown_option_is_rejected_not_substituted() {
        let mut cfg = config("Hello");
        cfg.music = "polka".into();
        assert!(matches!(
            validate(cfg, Tier::Pro),
            Err(ValidationError::OptionNotAllowed { category: OptionCategory::Music, .. })
        ));
    }

    // ---- Duration clamping ---

    #[test]
    fn duration_below_minimum_is_raised() {
        let mut cfg = config("Hello");
        cfg.duration_seconds = 3;
        for tier in Tier::ALL {
            let validated = validate(cfg.clone(), tier).unwrap();
            assert_eq!(validated.duration_seconds(), 15);
            assert_eq!(validated.requested_duration_seconds(), 3);
            assert!(validated.was_duration_clamped());
        }
    }

    #[test]
    fn duration_above_maximum_is_lowered() {
        let mut cfg = config("Hello");
        cfg.duration_seconds = 10_000;
        assert_eq!(validate(cfg.clone(), Tier::Free).unwrap().duration_seconds(), 30);
        assert_eq!(validate(cfg, Tier::Pro).unwrap().duration_seconds(), 300);
    }

    #[test]
    fn in_range_duration_is_kept() {
        let mut cfg = config("Hello");
        cfg.duration_seconds = 25;
        let validated = validate(cfg, Tier::Free).unwrap();
        assert_eq!(validated.duration_seconds(), 25);
        assert!(!validated.was_duration_clamped());
    }

    // ---- Scenarios ---

    #[test]
    fn free_tier_clamps_long_duration() {
        let mut cfg = config("Hello world");
        cfg.duration_seconds = 100;
        let validated = validate(cfg, Tier::Free).unwrap();
        assert_eq!(validated.duration_seconds(), 30);
        assert_eq!(validated.tier(), Tier::Free);
    }

    #[test]
    fn free_tier_rejects_600_char_script() {
        let cfg = config(&"a".repeat(600));
        assert_eq!(
            validate(cfg, Tier::Free),
            Err(ValidationError::ScriptTooLong { limit: 500 })
        );
    }

    #[test]
    fn tech_avatar_needs_pro() {
        let mut cfg = config("Hello");
        cfg.avatar = "tech".into();

        let validated = validate(cfg.clone(), Tier::Pro).unwrap();
        assert_eq!(validated.avatar(), "tech");

        assert_eq!(
            validate(cfg, Tier::Free),
            Err(ValidationError::OptionNotAllowed {
                category: OptionCategory::Avatar,
                value: "tech".into(),
                tier: Tier::Free,
            })
        );
    }

    #[test]
    fn validation_is_deterministic() {
        let cfg = config("Same input");
        assert_eq!(validate(cfg.clone(), Tier::Pro), validate(cfg, Tier::Pro));
    }

    #[test]
    fn error_messages_name_the_offender() {
        let err = ValidationError::OptionNotAllowed {
            category: OptionCategory::Avatar,
            value: "tech".into(),
            tier: Tier::Free,
        };
        assert_eq!(err.to_string(), "avatar `tech` is not available on the free plan");
    }
}
