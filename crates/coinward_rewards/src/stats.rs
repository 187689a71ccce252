//! # Pipeline Statistics
//!
//! Lock-free counters, one set per pipeline. Monotonic within a process
//! lifetime; snapshots are not atomic across fields, which is fine for
//! monitoring.

use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counters updated by the gate sequence.
#[derive(Debug, Default)]
pub struct RewardStats {
    granted: AtomicU64,
    value_injected: AtomicU64,
    blocked: AtomicU64,
    items_counted: AtomicU64,
}

impl RewardStats {
    /// One successful grant of `value` base units.
    pub fn record_grant(&self, value: u64) {
        self.granted.fetch_add(1, Ordering::Relaxed);
        self.value_injected.fetch_add(value, Ordering::Relaxed);
    }

    /// One action stopped at a counted gate (rate limit, zero amount,
    /// cap, deposit failure).
    pub fn record_block(&self) {
        self.blocked.fetch_add(1, Ordering::Relaxed);
    }

    /// Extra value injected outside a normal grant (streak bonuses).
    pub fn record_bonus_value(&self, value: u64) {
        self.value_injected.fetch_add(value, Ordering::Relaxed);
    }

    /// Items produced by granted crafting actions.
    pub fn record_items(&self, quantity: u64) {
        self.items_counted.fetch_add(quantity, Ordering::Relaxed);
    }

    /// Point-in-time copy of all counters.
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            granted: self.granted.load(Ordering::Relaxed),
            value_injected: self.value_injected.load(Ordering::Relaxed),
            blocked: self.blocked.load(Ordering::Relaxed),
            items_counted: self.items_counted.load(Ordering::Relaxed),
        }
    }
}

/// Plain copy of the counters at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    /// Rewards granted.
    pub granted: u64,
    /// Total base units injected, bonuses included.
    pub value_injected: u64,
    /// Actions stopped at counted gates.
    pub blocked: u64,
    /// Items produced by granted crafts.
    pub items_counted: u64,
}
