//! # Anti-Farm Tracking
//!
//! Diminishing returns for grinding one target type. Each player carries
//! per-target counts inside a rolling window; once a count passes the
//! threshold, every further action shaves a fixed fraction off the reward
//! multiplier until it hits the floor. When the window lapses the counts
//! reset in full - walking away really does clear the penalty.

use std::collections::HashMap;

use dashmap::DashMap;

use coinward_core::PlayerId;

/// Window after which a player's per-target counts fully reset.
const DECAY_WINDOW_MS: u64 = 5 * 60 * 1_000;

/// Tuning knobs for the tracker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AntiFarmConfig {
    /// Master switch; disabled means every multiplier is 1.0.
    pub enabled: bool,
    /// Actions against one target type before decay starts.
    pub threshold: u32,
    /// Multiplier reduction per action past the threshold.
    pub decay_per_action: f32,
    /// Multiplier floor; stays above zero so farming is diminished, not
    /// silently disabled.
    pub minimum_multiplier: f32,
    /// Idle time after which a player's state is swept by `cleanup`.
    pub idle_ttl_ms: u64,
    /// Hard cap on concurrently tracked players.
    pub max_tracked_players: usize,
}

impl Default for AntiFarmConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: 10,
            decay_per_action: 0.1,
            minimum_multiplier: 0.1,
            idle_ttl_ms: 30 * 60 * 1_000,
            max_tracked_players: 1_000,
        }
    }
}

#[derive(Debug)]
struct FarmWindow {
    counts: HashMap<String, u32>,
    window_start_ms: u64,
    last_activity_ms: u64,
}

impl FarmWindow {
    fn new(now_ms: u64) -> Self {
        Self {
            counts: HashMap::new(),
            window_start_ms: now_ms,
            last_activity_ms: now_ms,
        }
    }
}

/// Per-player repeat-action tracker producing reward multipliers.
pub struct AntiFarmTracker {
    cfg: AntiFarmConfig,
    players: DashMap<PlayerId, FarmWindow>,
}

impl AntiFarmTracker {
    /// Build a tracker with the given tuning.
    #[must_use]
    pub fn new(cfg: AntiFarmConfig) -> Self {
        Self { cfg, players: DashMap::new() }
    }

    /// Record one action against a target type and return the multiplier
    /// to apply to its reward, in `[minimum_multiplier, 1.0]`.
    pub fn record(&self, player: PlayerId, target: &str, now_ms: u64) -> f32 {
        if !self.cfg.enabled {
            return 1.0;
        }
        self.evict_if_full(player);

        let mut window = self
            .players
            .entry(player)
            .or_insert_with(|| FarmWindow::new(now_ms));
        if now_ms.saturating_sub(window.window_start_ms) >= DECAY_WINDOW_MS {
            window.counts.clear();
            window.window_start_ms = now_ms;
        }
        window.last_activity_ms = now_ms;
        let count = window
            .counts
            .entry(target.to_owned())
            .and_modify(|c| *c = c.saturating_add(1))
            .or_insert(1);
        self.multiplier_for(*count)
    }

    /// Multiplier the next action *would* receive, with no side effects.
    #[must_use]
    pub fn peek(&self, player: PlayerId, target: &str, now_ms: u64) -> f32 {
        if !self.cfg.enabled {
            return 1.0;
        }
        let Some(window) = self.players.get(&player) else {
            return 1.0;
        };
        if now_ms.saturating_sub(window.window_start_ms) >= DECAY_WINDOW_MS {
            return 1.0;
        }
        let next = window.counts.get(target).copied().unwrap_or(0) + 1;
        self.multiplier_for(next)
    }

    fn multiplier_for(&self, count: u32) -> f32 {
        if count <= self.cfg.threshold {
            return 1.0;
        }
        let excess = (count - self.cfg.threshold) as f32;
        (1.0 - excess * self.cfg.decay_per_action).max(self.cfg.minimum_multiplier)
    }

    /// Sweep players idle past the TTL. Returns how many were removed.
    pub fn cleanup(&self, now_ms: u64) -> usize {
        let before = self.players.len();
        self.players
            .retain(|_, w| now_ms.saturating_sub(w.last_activity_ms) < self.cfg.idle_ttl_ms);
        let removed = before - self.players.len();
        if removed > 0 {
            tracing::debug!("anti-farm sweep removed {removed} idle players");
        }
        removed
    }

    /// Forget one player's state entirely. Returns whether anything was
    /// tracked.
    pub fn reset_player(&self, player: PlayerId) -> bool {
        self.players.remove(&player).is_some()
    }

    /// Number of players currently tracked.
    #[must_use]
    pub fn tracked_players(&self) -> usize {
        self.players.len()
    }

    /// At capacity and about to admit a new player: evict whoever has been
    /// quiet the longest.
    fn evict_if_full(&self, incoming: PlayerId) {
        if self.players.len() < self.cfg.max_tracked_players
            || self.players.contains_key(&incoming)
        {
            return;
        }
        let oldest = self
            .players
            .iter()
            .min_by_key(|entry| entry.value().last_activity_ms)
            .map(|entry| *entry.key());
        if let Some(victim) = oldest {
            self.players.remove(&victim);
            tracing::debug!("anti-farm at capacity, evicted quietest player");
        }
    }
}
