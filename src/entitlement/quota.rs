//! In-memory monthly quota accounting.
//!
//! The ledger only lives as long as the orchestrator that owns it. Carrying
//! counts across restarts or resetting them at month boundaries is up to
//! whoever embeds the orchestrator.

use std::collections::HashMap;

use super::limits::limits_for;
use super::tier::Tier;

/// Counts videos produced per [`Tier`] in the current period.
#[derive(Debug, Clone, Default)]
pub struct QuotaLedger {
    used: HashMap<Tier, u32>,
}

impl QuotaLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one produced video for `tier`.
    pub fn record(&mut self, tier: Tier) {
        *self.used.entry(tier).or_insert(0) += 1;
    }

    pub fn used(&self, tier: Tier) -> u32 {
        self.used.get(&tier).copied().unwrap_or(0)
    }

    /// Videos left for `tier`; `None` when unlimited.
    pub fn remaining(&self, tier: Tier) -> Option<u32> {
        limits_for(tier).remaining_quota(self.used(tier))
    }

    /// `true` while `tier` may produce another video.
    pub fn has_capacity(&self, tier: Tier) -> bool {
        self.remaining(tier).map_or(true, |left| left > 0)
    }

    /// Start a new period.
    pub fn reset(&mut self) {
        self.used.clear();
    }
}
