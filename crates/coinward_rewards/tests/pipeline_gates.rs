//! End-to-end gate sequence tests driving the real pipelines with
//! recording host capabilities and seeded generators.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::SeedableRng;

use coinward_classify::{EmptyCatalog, RecipeSpec};
use coinward_core::{Denomination, PlayerId, TierDef, TierTable};
use coinward_rewards::config::{
    AntiFarmSettings, CraftingRewardsConfig, KillRewardsConfig, MiningRewardsConfig,
    SecuritySettings, VeinStreakSettings,
};
use coinward_rewards::{
    BlockBreak, CoinLedger, CraftingRewardPipeline, FeedbackSink, GrantOutcome,
    KillRewardPipeline, MiningRewardPipeline, NoPermissions, PermissionSource, RateLimiter,
    SilentFeedback, SkipReason, UnboundedLimiter, VipConfig,
};

// ---------------------------------------------------------------------------
// Recording host capabilities
// ---------------------------------------------------------------------------

#[derive(Default)]
struct RecordingLedger {
    deposits: Mutex<Vec<(PlayerId, u64, String)>>,
    reject: AtomicBool,
}

impl RecordingLedger {
    fn deposits_for(&self, reason: &str) -> Vec<u64> {
        self.deposits
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, _, r)| r == reason)
            .map(|(_, v, _)| *v)
            .collect()
    }
}

impl CoinLedger for RecordingLedger {
    fn deposit(&self, player: PlayerId, value: u64, reason: &str) -> bool {
        if self.reject.load(Ordering::SeqCst) {
            return false;
        }
        self.deposits
            .lock()
            .unwrap()
            .push((player, value, reason.to_owned()));
        true
    }
}

struct DenyLimiter;

impl RateLimiter for DenyLimiter {
    fn try_acquire(&self, _player: PlayerId) -> bool {
        false
    }
}

struct StaticPerms(HashSet<String>);

impl StaticPerms {
    fn holding(nodes: &[&str]) -> Self {
        Self(nodes.iter().map(|n| (*n).to_owned()).collect())
    }
}

impl PermissionSource for StaticPerms {
    fn has_permission(&self, _player: PlayerId, node: &str) -> bool {
        self.0.contains(node)
    }
}

#[derive(Default)]
struct RecordingFeedback {
    cues: Mutex<Vec<f32>>,
}

impl FeedbackSink for RecordingFeedback {
    fn play_cue(&self, _player: PlayerId, _volume: f32, pitch: f32) {
        self.cues.lock().unwrap().push(pitch);
    }
}

// ---------------------------------------------------------------------------
// Deterministic configurations
// ---------------------------------------------------------------------------

fn fixed_tier(units: u32) -> TierDef {
    TierDef::new(Denomination::Copper, units, units, 100)
}

fn no_anti_farm() -> SecuritySettings {
    SecuritySettings {
        anti_farm: AntiFarmSettings { enabled: false, ..AntiFarmSettings::default() },
        ..SecuritySettings::default()
    }
}

/// Kill config paying exactly 5 copper per Zombie, no randomness left.
fn fixed_kill_config() -> KillRewardsConfig {
    let mut tiers = TierTable::new();
    tiers.insert("HOSTILE", fixed_tier(5));
    KillRewardsConfig {
        enabled: true,
        tiers,
        default_tier: "HOSTILE".to_owned(),
        mappings: [("Zombie*".to_owned(), "HOSTILE".to_owned())].into(),
        exclusions: vec!["Quest_*".to_owned()],
        security: no_anti_farm(),
    }
}

fn fixed_mining_config() -> MiningRewardsConfig {
    let mut tiers = TierTable::new();
    tiers.insert("RARE", fixed_tier(4));
    MiningRewardsConfig {
        enabled: true,
        tiers,
        default_tier: "RARE".to_owned(),
        overrides: [("Ore_Test".to_owned(), "RARE".to_owned())].into(),
        exclusions: Vec::new(),
        security: no_anti_farm(),
        vein_streak: VeinStreakSettings {
            bonus_chance_step: 0,
            ..VeinStreakSettings::default()
        },
        ..MiningRewardsConfig::default()
    }
}

fn fixed_crafting_config() -> CraftingRewardsConfig {
    let mut tiers = TierTable::new();
    tiers.insert("SIMPLE", fixed_tier(4));
    CraftingRewardsConfig {
        enabled: true,
        tiers,
        default_tier: "SIMPLE".to_owned(),
        recipe_mappings: [("Recipe_Arrow".to_owned(), "SIMPLE".to_owned())].into(),
        exclusions: vec!["Debug_*".to_owned()],
        security: no_anti_farm(),
        ..CraftingRewardsConfig::default()
    }
}

fn kill_pipeline(
    cfg: &KillRewardsConfig,
    ledger: Arc<RecordingLedger>,
    permissions: Arc<dyn PermissionSource>,
) -> KillRewardPipeline {
    KillRewardPipeline::new(
        Some(cfg),
        VipConfig::default(),
        Arc::new(UnboundedLimiter),
        ledger,
        permissions,
    )
    .unwrap()
}

// ---------------------------------------------------------------------------
// Kills
// ---------------------------------------------------------------------------

#[test]
fn excluded_creature_is_silently_skipped() {
    let ledger = Arc::new(RecordingLedger::default());
    let p = kill_pipeline(&fixed_kill_config(), Arc::clone(&ledger), Arc::new(NoPermissions));
    let mut rng = StdRng::seed_from_u64(1);

    let outcome = p.on_kill_at(PlayerId::new_v4(), "Quest_Dummy", &mut rng, 0);
    assert_eq!(outcome, GrantOutcome::Skipped(SkipReason::Excluded));
    assert!(ledger.deposits_for("kill_reward").is_empty());
    // Exclusions are normal play, not abuse.
    assert_eq!(p.stats().blocked, 0);
}

#[test]
fn guaranteed_tier_pays_exact_amount_every_kill() {
    let ledger = Arc::new(RecordingLedger::default());
    let p = kill_pipeline(&fixed_kill_config(), Arc::clone(&ledger), Arc::new(NoPermissions));
    let mut rng = StdRng::seed_from_u64(2);
    let player = PlayerId::new_v4();

    for i in 0..100 {
        let outcome = p.on_kill_at(player, "Zombie_Walker", &mut rng, i * 1_000);
        assert_eq!(
            outcome,
            GrantOutcome::Granted { tier: "HOSTILE".to_owned(), units: 5, value: 5 }
        );
    }
    assert_eq!(ledger.deposits_for("kill_reward"), vec![5; 100]);
    let snap = p.stats();
    assert_eq!(snap.granted, 100);
    assert_eq!(snap.value_injected, 500);
}

#[test]
fn vip_rank_doubles_the_payout() {
    let ledger = Arc::new(RecordingLedger::default());
    let perms = Arc::new(StaticPerms::holding(&["coinward.multiplier.mvp_plus"]));
    let p = kill_pipeline(&fixed_kill_config(), Arc::clone(&ledger), perms);
    let mut rng = StdRng::seed_from_u64(3);

    let outcome = p.on_kill_at(PlayerId::new_v4(), "Zombie_Brute", &mut rng, 0);
    // 5 base coins * 2.0 mvp_plus multiplier.
    assert_eq!(
        outcome,
        GrantOutcome::Granted { tier: "HOSTILE".to_owned(), units: 10, value: 10 }
    );
}

#[test]
fn repeat_kills_of_one_target_decay_to_the_floor() {
    let mut cfg = fixed_kill_config();
    cfg.security.anti_farm = AntiFarmSettings {
        enabled: true,
        threshold: 15,
        decay_per_action: 0.08,
        minimum_multiplier: 0.1,
        ..AntiFarmSettings::default()
    };
    let ledger = Arc::new(RecordingLedger::default());
    let p = kill_pipeline(&cfg, Arc::clone(&ledger), Arc::new(NoPermissions));
    let mut rng = StdRng::seed_from_u64(4);
    let player = PlayerId::new_v4();

    for i in 0..25 {
        let outcome = p.on_kill_at(player, "Zombie_Walker", &mut rng, i * 100);
        assert!(outcome.is_granted(), "kill {i} should still pay something");
    }
    let values = ledger.deposits_for("kill_reward");
    // Full value inside the grace threshold.
    assert_eq!(values[14], 5);
    // Kill 25: multiplier 1 - 10 * 0.08 = 0.2, so 5 * 0.2 = exactly 1.
    assert_eq!(values[24], 1);
    assert_eq!(p.tracked_players(), 1);

    // Fresh targets are unaffected by the grind.
    let outcome = p.on_kill_at(player, "Zombie_Crawler", &mut rng, 3_000);
    assert_eq!(
        outcome,
        GrantOutcome::Granted { tier: "HOSTILE".to_owned(), units: 5, value: 5 }
    );
}

#[test]
fn rate_limiter_denial_counts_as_blocked() {
    let ledger = Arc::new(RecordingLedger::default());
    let p = KillRewardPipeline::new(
        Some(&fixed_kill_config()),
        VipConfig::default(),
        Arc::new(DenyLimiter),
        Arc::clone(&ledger) as Arc<dyn CoinLedger>,
        Arc::new(NoPermissions),
    )
    .unwrap();
    let mut rng = StdRng::seed_from_u64(5);

    let outcome = p.on_kill_at(PlayerId::new_v4(), "Zombie_Walker", &mut rng, 0);
    assert_eq!(outcome, GrantOutcome::Skipped(SkipReason::RateLimited));
    assert_eq!(p.stats().blocked, 1);
    assert!(ledger.deposits_for("kill_reward").is_empty());
}

#[test]
fn hourly_cap_stops_the_third_kill() {
    let mut cfg = fixed_kill_config();
    cfg.security.max_injection_per_hour = 12;
    let ledger = Arc::new(RecordingLedger::default());
    let p = kill_pipeline(&cfg, Arc::clone(&ledger), Arc::new(NoPermissions));
    let mut rng = StdRng::seed_from_u64(6);
    let player = PlayerId::new_v4();

    assert!(p.on_kill_at(player, "Zombie_Walker", &mut rng, 0).is_granted());
    assert!(p.on_kill_at(player, "Zombie_Walker", &mut rng, 1_000).is_granted());
    let outcome = p.on_kill_at(player, "Zombie_Walker", &mut rng, 2_000);
    assert_eq!(outcome, GrantOutcome::Skipped(SkipReason::CapExhausted));
    assert_eq!(p.cap_remaining(), 2);
    assert_eq!(p.stats().blocked, 1);
}

#[test]
fn refused_deposit_is_terminal_and_not_retried() {
    let ledger = Arc::new(RecordingLedger::default());
    ledger.reject.store(true, Ordering::SeqCst);
    let p = kill_pipeline(&fixed_kill_config(), Arc::clone(&ledger), Arc::new(NoPermissions));
    let mut rng = StdRng::seed_from_u64(7);

    let outcome = p.on_kill_at(PlayerId::new_v4(), "Zombie_Walker", &mut rng, 0);
    assert_eq!(outcome, GrantOutcome::Skipped(SkipReason::DepositFailed));
    assert_eq!(p.stats().blocked, 1);
    assert_eq!(p.stats().granted, 0);
}

#[test]
fn missing_configuration_disables_the_pipeline() {
    let ledger = Arc::new(RecordingLedger::default());
    let p = kill_pipeline(&fixed_kill_config(), Arc::clone(&ledger), Arc::new(NoPermissions));
    let disabled = KillRewardPipeline::new(
        None,
        VipConfig::default(),
        Arc::new(UnboundedLimiter),
        Arc::clone(&ledger) as Arc<dyn CoinLedger>,
        Arc::new(NoPermissions),
    )
    .unwrap();
    let mut rng = StdRng::seed_from_u64(8);

    let outcome = disabled.on_kill_at(PlayerId::new_v4(), "Zombie_Walker", &mut rng, 0);
    assert_eq!(outcome, GrantOutcome::Skipped(SkipReason::Disabled));
    // The configured pipeline still works on the same ledger.
    assert!(p.on_kill_at(PlayerId::new_v4(), "Zombie_Walker", &mut rng, 0).is_granted());
}

#[test]
fn zero_unit_tier_rounds_to_zero_and_blocks() {
    let mut cfg = fixed_kill_config();
    let mut tiers = TierTable::new();
    tiers.insert("HOSTILE", fixed_tier(0));
    cfg.tiers = tiers;
    let ledger = Arc::new(RecordingLedger::default());
    let p = kill_pipeline(&cfg, Arc::clone(&ledger), Arc::new(NoPermissions));
    let mut rng = StdRng::seed_from_u64(9);

    let outcome = p.on_kill_at(PlayerId::new_v4(), "Zombie_Walker", &mut rng, 0);
    assert_eq!(outcome, GrantOutcome::Skipped(SkipReason::RoundedToZero));
    assert_eq!(p.stats().blocked, 1);
}

#[test]
fn zero_chance_tier_never_pays() {
    let mut cfg = fixed_kill_config();
    let mut tiers = TierTable::new();
    tiers.insert("HOSTILE", TierDef::new(Denomination::Copper, 5, 5, 0));
    cfg.tiers = tiers;
    let ledger = Arc::new(RecordingLedger::default());
    let p = kill_pipeline(&cfg, Arc::clone(&ledger), Arc::new(NoPermissions));
    let mut rng = StdRng::seed_from_u64(10);

    for i in 0..1_000 {
        let outcome = p.on_kill_at(PlayerId::new_v4(), "Zombie_Walker", &mut rng, i);
        assert_eq!(outcome, GrantOutcome::Skipped(SkipReason::FailedRoll));
    }
    assert_eq!(p.stats().blocked, 0);
}

// ---------------------------------------------------------------------------
// Mining
// ---------------------------------------------------------------------------

fn mining_pipeline(
    cfg: &MiningRewardsConfig,
    ledger: Arc<RecordingLedger>,
    feedback: Arc<dyn FeedbackSink>,
) -> MiningRewardPipeline {
    MiningRewardPipeline::new(
        Some(cfg),
        VipConfig::default(),
        Arc::new(UnboundedLimiter),
        ledger,
        Arc::new(NoPermissions),
        feedback,
    )
    .unwrap()
}

#[test]
fn tool_quality_and_depth_stack_multiplicatively() {
    let ledger = Arc::new(RecordingLedger::default());
    let p = mining_pipeline(&fixed_mining_config(), Arc::clone(&ledger), Arc::new(SilentFeedback));
    let mut rng = StdRng::seed_from_u64(20);

    // Quality 25 caps the tool bonus at +25%; above max_y there is no
    // depth bonus: 4 * 1.25 * 1.0 = exactly 5.
    let action = BlockBreak { tool_quality: 25, block_y: 100.0, position: None };
    let outcome = p.on_block_break_at(PlayerId::new_v4(), "Ore_Test", action, &EmptyCatalog, &mut rng, 0);
    assert_eq!(
        outcome,
        GrantOutcome::Granted { tier: "RARE".to_owned(), units: 5, value: 5 }
    );
}

#[test]
fn deep_blocks_pay_the_full_depth_bonus() {
    let ledger = Arc::new(RecordingLedger::default());
    let p = mining_pipeline(&fixed_mining_config(), Arc::clone(&ledger), Arc::new(SilentFeedback));
    let mut rng = StdRng::seed_from_u64(21);

    // 4 * 1.0 tool * 1.2 depth = 4.8; expectation-preserving rounding.
    let action = BlockBreak { tool_quality: 0, block_y: 0.0, position: None };
    let mut total = 0_u64;
    for i in 0..10_000_u64 {
        let outcome =
            p.on_block_break_at(PlayerId::new_v4(), "Ore_Test", action, &EmptyCatalog, &mut rng, i);
        if let GrantOutcome::Granted { units, .. } = outcome {
            assert!(units == 4 || units == 5);
            total += u64::from(units);
        }
    }
    let mean = total as f64 / 10_000.0;
    assert!((mean - 4.8).abs() < 0.05, "mean was {mean}");
}

#[test]
fn consecutive_ore_breaks_raise_the_cue_pitch() {
    let feedback = Arc::new(RecordingFeedback::default());
    let ledger = Arc::new(RecordingLedger::default());
    let p = mining_pipeline(
        &fixed_mining_config(),
        Arc::clone(&ledger),
        Arc::clone(&feedback) as Arc<dyn FeedbackSink>,
    );
    let mut rng = StdRng::seed_from_u64(22);
    let player = PlayerId::new_v4();
    let action = BlockBreak { tool_quality: 0, block_y: 100.0, position: None };

    for now in [0, 1_000, 2_000] {
        let outcome = p.on_block_break_at(player, "Ore_Test", action, &EmptyCatalog, &mut rng, now);
        assert!(outcome.is_granted());
    }
    let cues = feedback.cues.lock().unwrap().clone();
    assert_eq!(cues.len(), 3);
    assert!(cues[0] < cues[1] && cues[1] < cues[2], "pitch should climb: {cues:?}");

    // A pause past the timeout restarts the ramp.
    let outcome = p.on_block_break_at(player, "Ore_Test", action, &EmptyCatalog, &mut rng, 60_000);
    assert!(outcome.is_granted());
    let cues = feedback.cues.lock().unwrap().clone();
    assert!((cues[3] - cues[0]).abs() < f32::EPSILON);
}

#[test]
fn streak_bonus_coins_flow_through_the_ledger() {
    let mut cfg = fixed_mining_config();
    // Guaranteed bonus from the first streak level.
    cfg.vein_streak.bonus_chance_step = 100;
    cfg.vein_streak.bonus_max_chance = 100;
    let ledger = Arc::new(RecordingLedger::default());
    let p = mining_pipeline(&cfg, Arc::clone(&ledger), Arc::new(SilentFeedback));
    let mut rng = StdRng::seed_from_u64(23);
    let player = PlayerId::new_v4();
    let action = BlockBreak { tool_quality: 0, block_y: 100.0, position: None };

    assert!(p
        .on_block_break_at(player, "Ore_Test", action, &EmptyCatalog, &mut rng, 0)
        .is_granted());
    assert_eq!(ledger.deposits_for("mining_reward"), vec![4]);
    assert_eq!(ledger.deposits_for("mining_streak_bonus"), vec![1]);
    // Grant 4 plus bonus 1.
    assert_eq!(p.stats().value_injected, 5);
}

// ---------------------------------------------------------------------------
// Crafting
// ---------------------------------------------------------------------------

fn arrow_batch(quantity: u32) -> RecipeSpec {
    RecipeSpec {
        recipe_id: "Recipe_Arrow".to_owned(),
        output_item: "Arrow_Flint".to_owned(),
        output_quantity: quantity,
        ..RecipeSpec::default()
    }
}

#[test]
fn crafting_ships_disabled_by_default() {
    let ledger = Arc::new(RecordingLedger::default());
    let p = CraftingRewardPipeline::new(
        Some(&CraftingRewardsConfig::default()),
        VipConfig::default(),
        Arc::new(UnboundedLimiter),
        Arc::clone(&ledger) as Arc<dyn CoinLedger>,
        Arc::new(NoPermissions),
    )
    .unwrap();
    let mut rng = StdRng::seed_from_u64(30);

    let outcome = p.on_craft_at(PlayerId::new_v4(), &arrow_batch(1), &EmptyCatalog, &mut rng, 0);
    assert_eq!(outcome, GrantOutcome::Skipped(SkipReason::Disabled));
}

#[test]
fn batch_output_scales_by_square_root() {
    let ledger = Arc::new(RecordingLedger::default());
    let p = CraftingRewardPipeline::new(
        Some(&fixed_crafting_config()),
        VipConfig::default(),
        Arc::new(UnboundedLimiter),
        Arc::clone(&ledger) as Arc<dyn CoinLedger>,
        Arc::new(NoPermissions),
    )
    .unwrap();
    let mut rng = StdRng::seed_from_u64(31);
    let player = PlayerId::new_v4();

    // Nine arrows: 4 coins * sqrt(9) = exactly 12, not 36.
    let outcome = p.on_craft_at(player, &arrow_batch(9), &EmptyCatalog, &mut rng, 0);
    assert_eq!(
        outcome,
        GrantOutcome::Granted { tier: "SIMPLE".to_owned(), units: 12, value: 12 }
    );
    assert_eq!(p.stats().items_counted, 9);
}

#[test]
fn excluded_recipes_never_reward() {
    let ledger = Arc::new(RecordingLedger::default());
    let p = CraftingRewardPipeline::new(
        Some(&fixed_crafting_config()),
        VipConfig::default(),
        Arc::new(UnboundedLimiter),
        Arc::clone(&ledger) as Arc<dyn CoinLedger>,
        Arc::new(NoPermissions),
    )
    .unwrap();
    let mut rng = StdRng::seed_from_u64(32);

    let mut recipe = arrow_batch(1);
    recipe.recipe_id = "Debug_Give_All".to_owned();
    let outcome = p.on_craft_at(PlayerId::new_v4(), &recipe, &EmptyCatalog, &mut rng, 0);
    assert_eq!(outcome, GrantOutcome::Skipped(SkipReason::Excluded));
    assert!(ledger.deposits_for("crafting_reward").is_empty());
}

// ---------------------------------------------------------------------------
// Cleanup
// ---------------------------------------------------------------------------

#[test]
fn cleanup_sweeps_idle_player_state() {
    let mut cfg = fixed_kill_config();
    cfg.security.anti_farm = AntiFarmSettings {
        enabled: true,
        idle_ttl_minutes: 1,
        ..AntiFarmSettings::default()
    };
    let ledger = Arc::new(RecordingLedger::default());
    let p = kill_pipeline(&cfg, Arc::clone(&ledger), Arc::new(NoPermissions));
    let mut rng = StdRng::seed_from_u64(40);

    assert!(p.on_kill_at(PlayerId::new_v4(), "Zombie_Walker", &mut rng, 0).is_granted());
    assert_eq!(p.tracked_players(), 1);

    // Still inside the idle window.
    assert_eq!(p.perform_cleanup_at(30_000), 0);
    assert_eq!(p.tracked_players(), 1);

    // Past it.
    assert_eq!(p.perform_cleanup_at(120_001), 1);
    assert_eq!(p.tracked_players(), 0);
}
