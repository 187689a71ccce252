//! # Mining Rewards
//!
//! Payouts for breaking blocks. Tier comes from the block resolver;
//! on top of VIP, the multiplier stack adds tool quality and depth.
//! A granted ore also advances the player's vein streak, which feeds an
//! audio pitch ramp and a small bonus-coin chance - strictly best-effort,
//! a failure there never undoes the grant.

use std::sync::Arc;

use rand::Rng;

use coinward_classify::{AssetCatalog, BlockTierResolver};
use coinward_core::{clock, ExclusionSet, PatternSet, PlayerId, TierTable, TIER_NONE};
use coinward_security::{AntiFarmTracker, EconomyCap, VeinStreakTracker};

use crate::capability::{
    CoinLedger, FeedbackSink, PermissionSource, RateLimiter, WorldPosition,
};
use crate::config::{DepthBonusConfig, MiningRewardsConfig, ToolQualityConfig, VeinStreakSettings};
use crate::error::RewardsResult;
use crate::pipeline::{run_gates, GateDeps, GateInput, GrantOutcome, SkipReason};
use crate::stats::{RewardStats, StatsSnapshot};
use crate::vip::VipConfig;

/// Mining tier too common to advance a vein streak.
const STREAK_FLOOR_TIER: &str = "BASIC";

/// Circumstances of one block break.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockBreak {
    /// Quality level of the tool used.
    pub tool_quality: u32,
    /// Altitude of the broken block.
    pub block_y: f64,
    /// World position, when physical drops are possible.
    pub position: Option<WorldPosition>,
}

/// Reward pipeline for mining.
pub struct MiningRewardPipeline {
    enabled: bool,
    tiers: TierTable,
    default_tier: String,
    resolver: BlockTierResolver,
    vip: VipConfig,
    tool_quality: ToolQualityConfig,
    depth_bonus: DepthBonusConfig,
    vein_streak: VeinStreakSettings,
    streaks: VeinStreakTracker,
    anti_farm: AntiFarmTracker,
    cap: EconomyCap,
    stats: RewardStats,
    limiter: Arc<dyn RateLimiter>,
    ledger: Arc<dyn CoinLedger>,
    permissions: Arc<dyn PermissionSource>,
    feedback: Arc<dyn FeedbackSink>,
}

impl MiningRewardPipeline {
    /// Build the pipeline. `None` (or `enabled = false`) yields a
    /// pipeline that silently skips every break.
    ///
    /// # Errors
    ///
    /// Returns an error if an override or exclusion pattern fails to
    /// compile.
    pub fn new(
        cfg: Option<&MiningRewardsConfig>,
        vip: VipConfig,
        limiter: Arc<dyn RateLimiter>,
        ledger: Arc<dyn CoinLedger>,
        permissions: Arc<dyn PermissionSource>,
        feedback: Arc<dyn FeedbackSink>,
    ) -> RewardsResult<Self> {
        let enabled = cfg.is_some_and(|c| c.enabled);
        let cfg = cfg.cloned().unwrap_or_default();

        let overrides = PatternSet::from_mappings(cfg.overrides.clone())?;
        let exclusions = ExclusionSet::from_rules(cfg.exclusions.clone())?;
        Ok(Self {
            enabled,
            tiers: cfg.tiers,
            default_tier: cfg.default_tier,
            resolver: BlockTierResolver::new(overrides, exclusions),
            vip,
            tool_quality: cfg.tool_quality,
            depth_bonus: cfg.depth_bonus,
            vein_streak: cfg.vein_streak,
            streaks: VeinStreakTracker::new(
                cfg.vein_streak.timeout_ms,
                cfg.vein_streak.max_streak,
                cfg.vein_streak.max_tracked_players,
            ),
            anti_farm: AntiFarmTracker::new(cfg.security.anti_farm.to_tracker_config()),
            cap: EconomyCap::new(
                cfg.security.max_injection_per_hour,
                cfg.security.injection_cap_enabled,
            ),
            stats: RewardStats::default(),
            limiter,
            ledger,
            permissions,
            feedback,
        })
    }

    /// Handle a block break at the current wall-clock time.
    pub fn on_block_break<R: Rng>(
        &self,
        player: PlayerId,
        block_id: &str,
        action: BlockBreak,
        catalog: &dyn AssetCatalog,
        rng: &mut R,
    ) -> GrantOutcome {
        self.on_block_break_at(player, block_id, action, catalog, rng, clock::now_millis())
    }

    /// Handle a block break at an explicit time. Test seam.
    pub fn on_block_break_at<R: Rng>(
        &self,
        player: PlayerId,
        block_id: &str,
        action: BlockBreak,
        catalog: &dyn AssetCatalog,
        rng: &mut R,
        now_ms: u64,
    ) -> GrantOutcome {
        if !self.enabled {
            return GrantOutcome::Skipped(SkipReason::Disabled);
        }
        if self.resolver.is_excluded(block_id) {
            return GrantOutcome::Skipped(SkipReason::Excluded);
        }
        let tier_name = self.resolver.resolve(block_id, catalog);
        if tier_name == TIER_NONE {
            return GrantOutcome::Skipped(SkipReason::NoTier);
        }
        let tier = self.tiers.get_or(&tier_name, &self.default_tier);

        let multiplier = self.vip.coin_multiplier(player, &*self.permissions)
            * self.tool_quality.multiplier(action.tool_quality)
            * self.depth_bonus.multiplier(action.block_y);

        let deps = GateDeps {
            anti_farm: &self.anti_farm,
            cap: &self.cap,
            stats: &self.stats,
            limiter: &*self.limiter,
            ledger: &*self.ledger,
        };
        let input = GateInput {
            player,
            target: block_id,
            tier_name: &tier_name,
            tier,
            chance_bonus: self.vip.chance_bonus(player, &*self.permissions),
            multiplier,
            amount_scale: 1.0,
            reason: "mining_reward",
            position: action.position,
        };
        let outcome = run_gates(&deps, &input, rng, now_ms);

        if outcome.is_granted() && tier_name != STREAK_FLOOR_TIER {
            self.advance_streak(player, rng, now_ms);
        }
        outcome
    }

    /// Granted a real ore: grow the streak, play the pitch cue, maybe
    /// drop one bonus coin. Everything here is best-effort.
    fn advance_streak<R: Rng>(&self, player: PlayerId, rng: &mut R, now_ms: u64) {
        if !self.vein_streak.enabled {
            return;
        }
        let streak = self.streaks.record(player, now_ms);
        self.feedback
            .play_cue(player, self.vein_streak.volume, self.vein_streak.pitch(streak));

        let chance = self.vein_streak.bonus_chance(streak);
        if chance == 0 || rng.gen_range(0..100_u32) >= chance {
            return;
        }
        let value = self.vein_streak.bonus_coin_value;
        // Bonus coins respect the cap like everything else.
        if !self.cap.try_inject(value, now_ms) {
            return;
        }
        if self.ledger.deposit(player, value, "mining_streak_bonus") {
            self.stats.record_bonus_value(value);
            tracing::debug!("streak {streak} bonus coin for {player}");
        }
    }

    /// Sweep idle anti-farm and streak state. Returns entries removed.
    pub fn perform_cleanup(&self) -> usize {
        self.perform_cleanup_at(clock::now_millis())
    }

    /// Cleanup at an explicit time. Test seam.
    pub fn perform_cleanup_at(&self, now_ms: u64) -> usize {
        self.anti_farm.cleanup(now_ms) + self.streaks.cleanup(now_ms)
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

    /// Current streak for a player, 0 when lapsed.
    #[must_use]
    pub fn current_streak(&self, player: PlayerId) -> u32 {
        self.streaks.peek(player, clock::now_millis())
    }

    /// Players currently under anti-farm tracking.
    #[must_use]
    pub fn tracked_players(&self) -> usize {
        self.anti_farm.tracked_players()
    }
}
