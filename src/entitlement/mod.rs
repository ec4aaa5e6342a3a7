//! Entitlement model: subscription tiers and what each one grants.
//!
//! All tier gating lives here as pure lookups. Callers never branch on
//! [`Tier`] themselves; they ask [`limits_for`] or [`is_option_allowed`].
//!
//! ```rust
//! use video_studio::entitlement::{is_option_allowed, limits_for, OptionCategory, Tier};
//!
//! let free = limits_for(Tier::Free);
//! assert!(free.watermarked);
//! assert!(!is_option_allowed(Tier::Free, OptionCategory::Avatar, "tech"));
//! assert!(is_option_allowed(Tier::Pro, OptionCategory::Avatar, "tech"));
//! ```

pub mod limits;
pub mod quota;
pub mod tier;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use limits::{is_option_allowed, limits_for, EntitlementLimits, Resolution};
pub use quota::QuotaLedger;
pub use tier::{OptionCategory, Tier, UnknownTierError};
