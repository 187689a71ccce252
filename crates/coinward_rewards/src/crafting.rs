//! # Crafting Rewards
//!
//! Payouts for completed crafts. Tier comes from the recipe resolver's
//! mapping cascade; the payout scales with the square root of the output
//! quantity so a batch of nine arrows pays three times a single arrow,
//! not nine. Ships disabled until a server reviews the recipe mappings.

use std::sync::Arc;

use rand::Rng;

use coinward_classify::{AssetCatalog, CraftTierResolver, RecipeSpec};
use coinward_core::{clock, ExclusionSet, PatternSet, PlayerId, TierTable, TIER_NONE};
use coinward_security::{AntiFarmTracker, EconomyCap};

use crate::capability::{CoinLedger, PermissionSource, RateLimiter};
use crate::config::CraftingRewardsConfig;
use crate::error::RewardsResult;
use crate::pipeline::{run_gates, GateDeps, GateInput, GrantOutcome, SkipReason};
use crate::stats::{RewardStats, StatsSnapshot};
use crate::vip::VipConfig;

/// Reward pipeline for crafting.
pub struct CraftingRewardPipeline {
    enabled: bool,
    tiers: TierTable,
    default_tier: String,
    resolver: CraftTierResolver,
    vip: VipConfig,
    anti_farm: AntiFarmTracker,
    cap: EconomyCap,
    stats: RewardStats,
    limiter: Arc<dyn RateLimiter>,
    ledger: Arc<dyn CoinLedger>,
    permissions: Arc<dyn PermissionSource>,
}

impl CraftingRewardPipeline {
    /// Build the pipeline. `None` (or `enabled = false`) yields a
    /// pipeline that silently skips every craft.
    ///
    /// # Errors
    ///
    /// Returns an error if a mapping or exclusion pattern fails to
    /// compile.
    pub fn new(
        cfg: Option<&CraftingRewardsConfig>,
        vip: VipConfig,
        limiter: Arc<dyn RateLimiter>,
        ledger: Arc<dyn CoinLedger>,
        permissions: Arc<dyn PermissionSource>,
    ) -> RewardsResult<Self> {
        let enabled = cfg.is_some_and(|c| c.enabled);
        let cfg = cfg.cloned().unwrap_or_default();

        let recipe_mappings = PatternSet::from_mappings(cfg.recipe_mappings.clone())?;
        let item_mappings = PatternSet::from_mappings(cfg.item_mappings.clone())?;
        let exclusions = ExclusionSet::from_rules(cfg.exclusions.clone())?;
        let resolver = CraftTierResolver::new(
            recipe_mappings,
            item_mappings,
            cfg.category_mappings.clone().into_iter().collect(),
            cfg.bench_mappings.clone().into_iter().collect(),
            exclusions,
            cfg.default_tier.clone(),
        );
        Ok(Self {
            enabled,
            tiers: cfg.tiers,
            default_tier: cfg.default_tier,
            resolver,
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

    /// Handle a completed craft at the current wall-clock time.
    pub fn on_craft<R: Rng>(
        &self,
        player: PlayerId,
        recipe: &RecipeSpec,
        catalog: &dyn AssetCatalog,
        rng: &mut R,
    ) -> GrantOutcome {
        self.on_craft_at(player, recipe, catalog, rng, clock::now_millis())
    }

    /// Handle a completed craft at an explicit time. Test seam.
    pub fn on_craft_at<R: Rng>(
        &self,
        player: PlayerId,
        recipe: &RecipeSpec,
        catalog: &dyn AssetCatalog,
        rng: &mut R,
        now_ms: u64,
    ) -> GrantOutcome {
        if !self.enabled {
            return GrantOutcome::Skipped(SkipReason::Disabled);
        }
        if self.resolver.is_excluded(recipe) {
            return GrantOutcome::Skipped(SkipReason::Excluded);
        }
        let tier_name = self.resolver.resolve(recipe, catalog);
        if tier_name == TIER_NONE {
            return GrantOutcome::Skipped(SkipReason::NoTier);
        }
        let tier = self.tiers.get_or(&tier_name, &self.default_tier);

        // Sub-linear batch scaling.
        let quantity = recipe.output_quantity.max(1);
        let amount_scale = (quantity as f32).sqrt();

        let deps = GateDeps {
            anti_farm: &self.anti_farm,
            cap: &self.cap,
            stats: &self.stats,
            limiter: &*self.limiter,
            ledger: &*self.ledger,
        };
        let input = GateInput {
            player,
            // Farm detection keys on the output item, not the recipe id,
            // so recipe variants producing the same item share decay.
            target: &recipe.output_item,
            tier_name: &tier_name,
            tier,
            chance_bonus: self.vip.chance_bonus(player, &*self.permissions),
            multiplier: self.vip.coin_multiplier(player, &*self.permissions),
            amount_scale,
            reason: "crafting_reward",
            position: None,
        };
        let outcome = run_gates(&deps, &input, rng, now_ms);
        if outcome.is_granted() {
            self.stats.record_items(u64::from(quantity));
        }
        outcome
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

    /// Memoized recipe resolutions.
    #[must_use]
    pub fn cached_tiers(&self) -> usize {
        self.resolver.cached_entries()
    }

    /// Drop memoized recipe resolutions after a mapping change.
    pub fn invalidate_tier_cache(&self) {
        self.resolver.invalidate();
    }
}
