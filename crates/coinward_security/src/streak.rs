//! # Vein-Streak Tracking
//!
//! Consecutive-ore chains for mining feedback. Breaking ores back to back
//! grows a per-player streak up to a cap; pausing longer than the timeout
//! resets it to the start. The streak itself never moves money - callers
//! turn it into audio pitch and a small bonus-coin chance.

use dashmap::DashMap;

use coinward_core::PlayerId;

/// Idle time after which `cleanup` drops a player's streak state.
const STREAK_TTL_MS: u64 = 5 * 60 * 1_000;

#[derive(Debug, Clone, Copy)]
struct StreakState {
    streak: u32,
    last_ore_ms: u64,
}

/// Per-player consecutive-ore counter.
pub struct VeinStreakTracker {
    timeout_ms: u64,
    max_streak: u32,
    max_tracked: usize,
    players: DashMap<PlayerId, StreakState>,
}

impl VeinStreakTracker {
    /// Build a tracker. `timeout_ms` is the pause that breaks a streak,
    /// `max_streak` the growth cap, `max_tracked` the player capacity.
    #[must_use]
    pub fn new(timeout_ms: u64, max_streak: u32, max_tracked: usize) -> Self {
        Self { timeout_ms, max_streak, max_tracked, players: DashMap::new() }
    }

    /// Record an ore break and return the streak it lands on (1-based).
    pub fn record(&self, player: PlayerId, now_ms: u64) -> u32 {
        self.evict_if_full(player);
        let mut state = self
            .players
            .entry(player)
            .or_insert(StreakState { streak: 0, last_ore_ms: now_ms });
        if state.streak == 0 || now_ms.saturating_sub(state.last_ore_ms) > self.timeout_ms {
            state.streak = 1;
        } else {
            state.streak = (state.streak + 1).min(self.max_streak);
        }
        state.last_ore_ms = now_ms;
        state.streak
    }

    /// Current streak without recording; 0 once the timeout has lapsed.
    #[must_use]
    pub fn peek(&self, player: PlayerId, now_ms: u64) -> u32 {
        self.players.get(&player).map_or(0, |state| {
            if now_ms.saturating_sub(state.last_ore_ms) > self.timeout_ms {
                0
            } else {
                state.streak
            }
        })
    }

    /// Sweep players idle past the TTL. Returns how many were removed.
    pub fn cleanup(&self, now_ms: u64) -> usize {
        let before = self.players.len();
        self.players
            .retain(|_, s| now_ms.saturating_sub(s.last_ore_ms) < STREAK_TTL_MS);
        before - self.players.len()
    }

    /// Forget one player's streak. Returns whether anything was tracked.
    pub fn reset_player(&self, player: PlayerId) -> bool {
        self.players.remove(&player).is_some()
    }

    /// Number of players currently tracked.
    #[must_use]
    pub fn tracked_players(&self) -> usize {
        self.players.len()
    }

    fn evict_if_full(&self, incoming: PlayerId) {
        if self.players.len() < self.max_tracked || self.players.contains_key(&incoming) {
            return;
        }
        let oldest = self
            .players
            .iter()
            .min_by_key(|entry| entry.value().last_ore_ms)
            .map(|entry| *entry.key());
        if let Some(victim) = oldest {
            self.players.remove(&victim);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn streak_grows_within_timeout_and_caps() {
        let t = VeinStreakTracker::new(3_000, 6, 1_000);
        let p = PlayerId::new_v4();
        for expected in 1..=6 {
            assert_eq!(t.record(p, u64::from(expected) * 1_000), expected);
        }
        // Capped at 6.
        assert_eq!(t.record(p, 7_000), 6);
    }

    #[test]
    fn pause_resets_to_one() {
        let t = VeinStreakTracker::new(3_000, 6, 1_000);
        let p = PlayerId::new_v4();
        assert_eq!(t.record(p, 0), 1);
        assert_eq!(t.record(p, 1_000), 2);
        assert_eq!(t.record(p, 10_000), 1);
    }

    #[test]
    fn peek_reports_zero_after_timeout() {
        let t = VeinStreakTracker::new(3_000, 6, 1_000);
        let p = PlayerId::new_v4();
        t.record(p, 0);
        t.record(p, 500);
        assert_eq!(t.peek(p, 1_000), 2);
        assert_eq!(t.peek(p, 10_000), 0);
        assert_eq!(t.peek(PlayerId::new_v4(), 0), 0);
    }

    #[test]
    fn cleanup_sweeps_idle_streaks() {
        let t = VeinStreakTracker::new(3_000, 6, 1_000);
        let idle = PlayerId::new_v4();
        let active = PlayerId::new_v4();
        t.record(idle, 0);
        t.record(active, STREAK_TTL_MS);
        assert_eq!(t.cleanup(STREAK_TTL_MS + 1), 1);
        assert_eq!(t.tracked_players(), 1);
    }

    #[test]
    fn capacity_evicts_oldest_streak() {
        let t = VeinStreakTracker::new(3_000, 6, 2);
        let a = PlayerId::new_v4();
        let b = PlayerId::new_v4();
        let c = PlayerId::new_v4();
        t.record(a, 100);
        t.record(b, 200);
        t.record(c, 300);
        assert_eq!(t.tracked_players(), 2);
        assert!(!t.reset_player(a));
    }
}
