//! # Kill Rewards
//!
//! Payouts for creature kills. Tier comes from the creature resolver
//! (mappings, then heuristics); VIP ranks raise both drop chance and the
//! coin multiplier.

use std::sync::Arc;

use rand::Rng;

use coinward_classify::CreatureTierResolver;
use coinward_core::{clock, ExclusionSet, PatternSet, PlayerId, TierTable, TIER_NONE};
use coinward_security::{AntiFarmTracker, EconomyCap};

use crate::capability::{CoinLedger, PermissionSource, RateLimiter};
use crate::config::KillRewardsConfig;
use crate::error::RewardsResult;
use crate::pipeline::{run_gates, GateDeps, GateInput, GrantOutcome, SkipReason};
use crate::stats::{RewardStats, StatsSnapshot};
use crate::vip::VipConfig;

/// Reward pipeline for creature kills.
pub struct KillRewardPipeline {
    enabled: bool,
    tiers: TierTable,
    default_tier: String,
    resolver: CreatureTierResolver,
    vip: VipConfig,
    anti_farm: AntiFarmTracker,
    cap: EconomyCap,
    stats: RewardStats,
    limiter: Arc<dyn RateLimiter>,
    ledger: Arc<dyn CoinLedger>,
    permissions: Arc<dyn PermissionSource>,
}

impl KillRewardPipeline {
    /// Build the pipeline. `None` (or `enabled = false`) yields a
    /// pipeline that silently skips every kill.
    ///
    /// # Errors
    ///
    /// Returns an error if a mapping or exclusion pattern fails to
    /// compile.
    pub fn new(
        cfg: Option<&KillRewardsConfig>,
        vip: VipConfig,
        limiter: Arc<dyn RateLimiter>,
        ledger: Arc<dyn CoinLedger>,
        permissions: Arc<dyn PermissionSource>,
    ) -> RewardsResult<Self> {
        let enabled = cfg.is_some_and(|c| c.enabled);
        let cfg = cfg.cloned().unwrap_or_default();

        let mappings = PatternSet::from_mappings(cfg.mappings.clone())?;
        let exclusions = ExclusionSet::from_rules(cfg.exclusions.clone())?;
        Ok(Self {
            enabled,
            tiers: cfg.tiers,
            resolver: CreatureTierResolver::new(mappings, exclusions, cfg.default_tier.clone()),
            default_tier: cfg.default_tier,
            vip,
            anti_farm: AntiFarmTracker::new(cfg.security.anti_farm.to_tracker_config()),
            cap: EconomyCap::new(
                cfg.security.max_injection_per_hour,
                cfg.security.injection_cap_enabled,
            ),
            stats: RewardStats::default(),
            limiter,
            ledger,
            permissions,
        })
    }

    /// Handle a kill at the current wall-clock time.
    pub fn on_kill<R: Rng>(
        &self,
        player: PlayerId,
        creature_id: &str,
        rng: &mut R,
    ) -> GrantOutcome {
        self.on_kill_at(player, creature_id, rng, clock::now_millis())
    }

    /// Handle a kill at an explicit time. Test seam.
    pub fn on_kill_at<R: Rng>(
        &self,
        player: PlayerId,
        creature_id: &str,
        rng: &mut R,
        now_ms: u64,
    ) -> GrantOutcome {
        if !self.enabled {
            return GrantOutcome::Skipped(SkipReason::Disabled);
        }
        if self.resolver.is_excluded(creature_id) {
            return GrantOutcome::Skipped(SkipReason::Excluded);
        }
        let tier_name = self.resolver.resolve(creature_id);
        if tier_name == TIER_NONE {
            return GrantOutcome::Skipped(SkipReason::NoTier);
        }
        let tier = self.tiers.get_or(&tier_name, &self.default_tier);

        let deps = GateDeps {
            anti_farm: &self.anti_farm,
            cap: &self.cap,
            stats: &self.stats,
            limiter: &*self.limiter,
            ledger: &*self.ledger,
        };
        let input = GateInput {
            player,
            target: creature_id,
            tier_name: &tier_name,
            tier,
            chance_bonus: self.vip.chance_bonus(player, &*self.permissions),
            multiplier: self.vip.coin_multiplier(player, &*self.permissions),
            amount_scale: 1.0,
            reason: "kill_reward",
            position: None,
        };
        run_gates(&deps, &input, rng, now_ms)
    }

    /// Sweep idle anti-farm state. Returns entries removed.
    pub fn perform_cleanup(&self) -> usize {
        self.perform_cleanup_at(clock::now_millis())
    }

    /// Cleanup at an explicit time. Test seam.
    pub fn perform_cleanup_at(&self, now_ms: u64) -> usize {
        self.anti_farm.cleanup(now_ms)
    }

    /// Counter snapshot.
    #[must_use]
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Base units still admittable this hour.
    #[must_use]
    pub fn cap_remaining(&self) -> u64 {
        self.cap.remaining()
    }

    /// Players currently under anti-farm tracking.
    #[must_use]
    pub fn tracked_players(&self) -> usize {
        self.anti_farm.tracked_players()
    }

    /// Memoized tier resolutions.
    #[must_use]
    pub fn cached_tiers(&self) -> usize {
        self.resolver.cached_entries()
    }

    /// Drop memoized tier resolutions after a mapping change.
    pub fn invalidate_tier_cache(&self) {
        self.resolver.invalidate();
    }
}
