//! # The Gate Sequence
//!
//! All three pipelines share one ordered gate sequence; the first failing
//! gate terminates the attempt. Chance and exclusion failures are silent
//! by design (they are normal play); rate limits, zero amounts, cap
//! denials and deposit failures are counted as blocked.
//!
//! Amounts are real-valued until the very end, then settled by
//! probabilistic rounding so multipliers keep their expected value: 2.3
//! coins means 2 coins with a 70% chance and 3 with a 30% chance.

use rand::Rng;

use coinward_core::{PlayerId, TierDef};
use coinward_security::{AntiFarmTracker, EconomyCap};

use crate::capability::{CoinLedger, RateLimiter, WorldPosition};
use crate::stats::RewardStats;

/// Result of pushing one action through the gates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrantOutcome {
    /// Coins were handed to the ledger.
    Granted {
        /// Tier that paid.
        tier: String,
        /// Coin units granted.
        units: u32,
        /// Value in base units, already accounted against the cap.
        value: u64,
    },
    /// A gate stopped the action.
    Skipped(SkipReason),
}

impl GrantOutcome {
    /// Whether coins were granted.
    #[must_use]
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted { .. })
    }
}

/// Which gate stopped an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The pipeline has no configuration or is switched off.
    Disabled,
    /// The target is on an exclusion list.
    Excluded,
    /// The target resolved to a non-rewarding tier.
    NoTier,
    /// The drop-chance roll failed. Normal play, not counted blocked.
    FailedRoll,
    /// The host rate limiter denied a permit.
    RateLimited,
    /// Multipliers pushed the amount below one coin.
    RoundedToZero,
    /// The hourly injection cap is exhausted.
    CapExhausted,
    /// The ledger refused the deposit.
    DepositFailed,
}

/// Everything a gate run needs from its pipeline.
pub(crate) struct GateDeps<'a> {
    pub anti_farm: &'a AntiFarmTracker,
    pub cap: &'a EconomyCap,
    pub stats: &'a RewardStats,
    pub limiter: &'a dyn RateLimiter,
    pub ledger: &'a dyn CoinLedger,
}

/// Per-action inputs to a gate run.
pub(crate) struct GateInput<'a> {
    pub player: PlayerId,
    /// Anti-farm key; the target type being ground.
    pub target: &'a str,
    pub tier_name: &'a str,
    pub tier: TierDef,
    /// Drop-chance bonus in percentage points (VIP).
    pub chance_bonus: u32,
    /// Composite reward multiplier applied on top of anti-farm
    /// (VIP, tool quality, depth).
    pub multiplier: f32,
    /// Linear amount scale (crafting quantity scaling).
    pub amount_scale: f32,
    /// Ledger reason tag.
    pub reason: &'a str,
    /// Drop position, when physical drops are possible.
    pub position: Option<WorldPosition>,
}

/// Run gates 3 through 8: chance, rate limit, anti-farm, amount, cap,
/// grant. Exclusion and tier lookup happen in the calling pipeline.
pub(crate) fn run_gates<R: Rng>(
    deps: &GateDeps<'_>,
    input: &GateInput<'_>,
    rng: &mut R,
    now_ms: u64,
) -> GrantOutcome {
    let chance = (u32::from(input.tier.drop_chance) + input.chance_bonus).min(100);
    if !roll_chance(chance, rng) {
        return GrantOutcome::Skipped(SkipReason::FailedRoll);
    }

    if !deps.limiter.try_acquire(input.player) {
        deps.stats.record_block();
        tracing::debug!("rate limiter denied {} for '{}'", input.player, input.target);
        return GrantOutcome::Skipped(SkipReason::RateLimited);
    }

    // Never a stop: the multiplier shrinks the amount instead.
    let farm = deps.anti_farm.record(input.player, input.target, now_ms);

    let base = if input.tier.max_units > input.tier.min_units {
        rng.gen_range(input.tier.min_units..=input.tier.max_units)
    } else {
        input.tier.min_units
    };
    let exact = base as f32 * input.amount_scale * farm * input.multiplier;
    let units = probabilistic_round(exact, rng);
    if units == 0 {
        deps.stats.record_block();
        return GrantOutcome::Skipped(SkipReason::RoundedToZero);
    }

    let value = u64::from(units) * input.tier.denomination.base_value();
    if !deps.cap.try_inject(value, now_ms) {
        deps.stats.record_block();
        return GrantOutcome::Skipped(SkipReason::CapExhausted);
    }

    let delivered = match input.position {
        Some(position) if deps.ledger.prefers_physical_drops() => {
            deps.ledger.drop_at(position, value)
        }
        _ => deps.ledger.deposit(input.player, value, input.reason),
    };
    if !delivered {
        deps.stats.record_block();
        tracing::warn!(
            "ledger refused {value} base units for {} ({})",
            input.player,
            input.reason
        );
        return GrantOutcome::Skipped(SkipReason::DepositFailed);
    }

    deps.stats.record_grant(value);
    tracing::debug!(
        "granted {units} x {} ({} tier) to {}",
        input.tier.denomination,
        input.tier_name,
        input.player
    );
    GrantOutcome::Granted {
        tier: input.tier_name.to_owned(),
        units,
        value,
    }
}

/// Roll a percentage chance. 100 never fails, 0 never succeeds.
pub(crate) fn roll_chance<R: Rng>(chance: u32, rng: &mut R) -> bool {
    chance >= 100 || rng.gen_range(0..100_u32) < chance
}

/// Expectation-preserving rounding: the fractional part is the chance of
/// one extra coin.
pub(crate) fn probabilistic_round<R: Rng>(amount: f32, rng: &mut R) -> u32 {
    if amount <= 0.0 {
        return 0;
    }
    let base = amount.floor();
    let fraction = amount - base;
    let mut units = base as u32;
    if fraction > 0.0 && rng.gen::<f32>() < fraction {
        units += 1;
    }
    units
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn full_chance_never_fails() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..10_000 {
            assert!(roll_chance(100, &mut rng));
        }
    }

    #[test]
    fn zero_chance_never_succeeds() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..10_000 {
            assert!(!roll_chance(0, &mut rng));
        }
    }

    #[test]
    fn partial_chance_converges() {
        let mut rng = StdRng::seed_from_u64(99);
        let hits = (0..100_000).filter(|_| roll_chance(30, &mut rng)).count();
        let rate = hits as f64 / 100_000.0;
        assert!((rate - 0.30).abs() < 0.01, "rate was {rate}");
    }

    #[test]
    fn rounding_preserves_expectation() {
        let mut rng = StdRng::seed_from_u64(42);
        let total: u64 = (0..200_000)
            .map(|_| u64::from(probabilistic_round(2.3, &mut rng)))
            .sum();
        let mean = total as f64 / 200_000.0;
        assert!((mean - 2.3).abs() < 0.01, "mean was {mean}");
    }

    #[test]
    fn rounding_only_yields_adjacent_integers() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..10_000 {
            let n = probabilistic_round(2.3, &mut rng);
            assert!(n == 2 || n == 3);
        }
    }

    #[test]
    fn whole_and_non_positive_amounts_are_exact() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(probabilistic_round(4.0, &mut rng), 4);
        assert_eq!(probabilistic_round(0.0, &mut rng), 0);
        assert_eq!(probabilistic_round(-2.5, &mut rng), 0);
    }
}
