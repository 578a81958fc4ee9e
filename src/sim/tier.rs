//! Fruit tiers
//!
//! A tier is an index into the validated tier table. Higher tiers are larger
//! and worth more; the last tier has no successor.

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, GameConfig, TierDef};

/// Piece type, ordered smallest to largest.
///
/// Only the crate builds tiers, and only from a validated table, so lookups
/// by tier never go out of range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Tier(pub(crate) u8);

impl Tier {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Number of tiers new pieces are drawn from
pub const DROPPABLE_TIERS: usize = 2;

/// Validated, non-empty tier table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierTable {
    defs: Vec<TierDef>,
}

impl TierTable {
    /// Build the table from a configuration, validating it first
    pub fn from_config(config: &GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        if config.tiers.len() > u8::MAX as usize + 1 {
            return Err(ConfigError::InvalidTier {
                index: config.tiers.len() - 1,
                reason: format!("at most {} tiers are supported", u8::MAX as usize + 1),
            });
        }
        Ok(Self {
            defs: config.tiers.clone(),
        })
    }

    fn def(&self, tier: Tier) -> &TierDef {
        &self.defs[tier.index()]
    }

    #[inline]
    pub fn radius(&self, tier: Tier) -> f32 {
        self.def(tier).diameter / 2.0
    }

    #[inline]
    pub fn score(&self, tier: Tier) -> u64 {
        self.def(tier).score
    }

    /// The largest tier
    pub fn terminal(&self) -> Tier {
        Tier((self.defs.len() - 1) as u8)
    }

    pub fn is_terminal(&self, tier: Tier) -> bool {
        tier == self.terminal()
    }

    /// Tier a merged pair of `tier` pieces turns into
    pub fn successor(&self, tier: Tier) -> Option<Tier> {
        if self.is_terminal(tier) {
            None
        } else {
            Some(Tier(tier.0 + 1))
        }
    }

    /// Number of smallest tiers a new drop may be drawn from
    pub fn droppable_count(&self) -> usize {
        self.defs.len().min(DROPPABLE_TIERS)
    }
}
