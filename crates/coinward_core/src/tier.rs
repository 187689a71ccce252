//! # Tier Definitions
//!
//! A *tier* is a named payout bracket: which coin, how many, and how often.
//! Tables of tiers are loaded from config and validated before use; the
//! validation ceiling bounds the worst case a single action can mint even
//! if an operator fat-fingers a config value.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::coin::Denomination;
use crate::error::{CoreError, CoreResult};

/// Reserved tier name that suppresses rewards entirely.
pub const TIER_NONE: &str = "NONE";

/// Maximum coin units a single tier may award per action.
pub const MAX_TIER_UNITS: u32 = 1_000;

/// Ceiling on a tier's maximum payout in base units.
pub const MAX_TIER_VALUE: u64 = 10_000_000;

/// Last-resort payout used when both a tier and its configured default are
/// missing from the table. Pays something small rather than nothing, so a
/// config hole is visible in play instead of silently starving players.
pub const FALLBACK_TIER: TierDef = TierDef::new(Denomination::Copper, 0, 1, 50);

/// Payout bracket for one tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierDef {
    /// Coin type this tier pays in.
    pub denomination: Denomination,
    /// Minimum coin units per grant.
    pub min_units: u32,
    /// Maximum coin units per grant (inclusive).
    pub max_units: u32,
    /// Chance that the action pays at all, 0-100.
    pub drop_chance: u8,
}

impl TierDef {
    /// Build a tier definition. Invariants are checked by [`Self::validate`],
    /// not here, so tables can be constructed in `const` context.
    #[must_use]
    pub const fn new(denomination: Denomination, min_units: u32, max_units: u32, drop_chance: u8) -> Self {
        Self { denomination, min_units, max_units, drop_chance }
    }

    /// Largest value this tier can mint in one grant, in base units.
    #[must_use]
    #[inline]
    pub const fn max_value(&self) -> u64 {
        self.max_units as u64 * self.denomination.base_value()
    }

    /// Long-run expected value of one action under this tier, in base units.
    #[must_use]
    pub fn expected_value(&self) -> f64 {
        let avg_units = f64::from(self.min_units + self.max_units) / 2.0;
        let per_coin = self.denomination.base_value() as f64;
        avg_units * per_coin * f64::from(self.drop_chance) / 100.0
    }

    /// Check every payout invariant, naming the tier in any error.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidTier`] describing the first violated
    /// invariant.
    pub fn validate(&self, tier_name: &str) -> CoreResult<()> {
        if self.min_units > self.max_units {
            return Err(invalid(tier_name, format!(
                "min_units {} exceeds max_units {}",
                self.min_units, self.max_units
            )));
        }
        if self.max_units > MAX_TIER_UNITS {
            return Err(invalid(tier_name, format!(
                "max_units {} exceeds cap {MAX_TIER_UNITS}",
                self.max_units
            )));
        }
        if self.drop_chance > 100 {
            return Err(invalid(tier_name, format!(
                "drop_chance {} exceeds 100",
                self.drop_chance
            )));
        }
        if self.max_value() > MAX_TIER_VALUE {
            return Err(invalid(tier_name, format!(
                "max payout {} base units exceeds economy ceiling {MAX_TIER_VALUE}",
                self.max_value()
            )));
        }
        Ok(())
    }
}

fn invalid(tier: &str, reason: String) -> CoreError {
    CoreError::InvalidTier { tier: tier.to_owned(), reason }
}

/// Named collection of tier definitions with a defaulting lookup.
///
/// Backed by a `BTreeMap` so iteration (and serialized form) is stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TierTable {
    tiers: BTreeMap<String, TierDef>,
}

impl TierTable {
    /// Empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a tier definition.
    pub fn insert(&mut self, name: impl Into<String>, def: TierDef) {
        self.tiers.insert(name.into(), def);
    }

    /// Look up a tier by exact name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TierDef> {
        self.tiers.get(name)
    }

    /// Defaulting lookup: the named tier, then the configured fallback
    /// tier, then [`FALLBACK_TIER`]. Never fails.
    #[must_use]
    pub fn get_or(&self, name: &str, fallback: &str) -> TierDef {
        self.tiers
            .get(name)
            .or_else(|| self.tiers.get(fallback))
            .copied()
            .unwrap_or(FALLBACK_TIER)
    }

    /// Validate every tier in the table.
    ///
    /// # Errors
    ///
    /// Returns the first [`CoreError::InvalidTier`] encountered, in name
    /// order.
    pub fn validate(&self) -> CoreResult<()> {
        for (name, def) in &self.tiers {
            def.validate(name)?;
        }
        Ok(())
    }

    /// Number of tiers in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    /// Whether the table holds no tiers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// Iterate tiers in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TierDef)> {
        self.tiers.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, TierDef)> for TierTable {
    fn from_iter<I: IntoIterator<Item = (String, TierDef)>>(iter: I) -> Self {
        Self { tiers: iter.into_iter().collect() }
    }
}
