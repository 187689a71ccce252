//! # VIP Multipliers
//!
//! Rank perks expressed as permission nodes. A player holding
//! `coinward.multiplier.mvp` gets that rank's coin multiplier and drop
//! chance bonus; holding several ranks takes the best of each,
//! independently. The coin multiplier is clamped by a global ceiling so a
//! permissions mistake cannot mint fortunes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use coinward_core::PlayerId;

use crate::capability::PermissionSource;

/// VIP rank configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VipConfig {
    /// Master switch; disabled means multiplier 1.0 and bonus 0 for all.
    pub enabled: bool,
    /// Prefix of the permission nodes carrying rank keys.
    pub permission_prefix: String,
    /// Ceiling on the combined coin multiplier.
    pub max_multiplier: f32,
    /// Rank key to coin multiplier.
    pub multipliers: BTreeMap<String, f32>,
    /// Rank key to drop-chance bonus in percentage points.
    pub chance_bonuses: BTreeMap<String, u32>,
}

impl Default for VipConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            permission_prefix: "coinward.multiplier.".to_owned(),
            max_multiplier: 5.0,
            multipliers: BTreeMap::from([
                ("vip".to_owned(), 1.2),
                ("mvp".to_owned(), 1.5),
                ("mvp_plus".to_owned(), 2.0),
            ]),
            chance_bonuses: BTreeMap::from([
                ("vip".to_owned(), 5),
                ("mvp".to_owned(), 10),
                ("mvp_plus".to_owned(), 15),
            ]),
        }
    }
}

impl VipConfig {
    /// Best coin multiplier among the ranks the player holds, clamped to
    /// `[1.0, max_multiplier]`.
    #[must_use]
    pub fn coin_multiplier(&self, player: PlayerId, permissions: &dyn PermissionSource) -> f32 {
        if !self.enabled {
            return 1.0;
        }
        let best = self
            .multipliers
            .iter()
            .filter(|(key, _)| self.holds(player, permissions, key))
            .map(|(_, m)| *m)
            .fold(1.0_f32, f32::max);
        best.min(self.max_multiplier)
    }

    /// Best drop-chance bonus among the ranks the player holds, in
    /// percentage points.
    #[must_use]
    pub fn chance_bonus(&self, player: PlayerId, permissions: &dyn PermissionSource) -> u32 {
        if !self.enabled {
            return 0;
        }
        self.chance_bonuses
            .iter()
            .filter(|(key, _)| self.holds(player, permissions, key))
            .map(|(_, b)| *b)
            .max()
            .unwrap_or(0)
    }

    fn holds(&self, player: PlayerId, permissions: &dyn PermissionSource, key: &str) -> bool {
        let node = format!("{}{key}", self.permission_prefix);
        permissions.has_permission(player, &node)
    }
}
