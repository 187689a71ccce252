//! # Host Capabilities
//!
//! The pipelines never talk to the game server directly. The host hands
//! them these traits at construction; everything is consumed, nothing
//! implemented here beyond no-op stand-ins.

use coinward_core::PlayerId;

/// A point in the world where physical coins can drop.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WorldPosition {
    /// East-west coordinate.
    pub x: f64,
    /// Altitude.
    pub y: f64,
    /// North-south coordinate.
    pub z: f64,
}

/// Token-bucket style throttle owned by the host.
pub trait RateLimiter: Send + Sync {
    /// Take one permit for the player. Denial is final for this action;
    /// the pipeline counts it blocked and moves on.
    fn try_acquire(&self, player: PlayerId) -> bool;
}

/// The host's coin ledger. Deposits are terminal: a `false` return is
/// counted blocked and never retried.
pub trait CoinLedger: Send + Sync {
    /// Credit base-unit value to the player's balance.
    fn deposit(&self, player: PlayerId, value: u64, reason: &str) -> bool;

    /// Whether grants should drop physical coins in the world when a
    /// position is known.
    fn prefers_physical_drops(&self) -> bool {
        false
    }

    /// Spawn a physical coin pickup worth `value` base units.
    fn drop_at(&self, _position: WorldPosition, _value: u64) -> bool {
        false
    }
}

/// Permission lookups for VIP multipliers.
pub trait PermissionSource: Send + Sync {
    /// Whether the player holds the permission node.
    fn has_permission(&self, player: PlayerId, node: &str) -> bool;
}

/// Best-effort sensory feedback; failures are invisible to the pipeline.
pub trait FeedbackSink: Send + Sync {
    /// Play an audio cue for the player.
    fn play_cue(&self, player: PlayerId, volume: f32, pitch: f32);
}

/// Rate limiter that never denies. For tests and hosts without throttling.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnboundedLimiter;

impl RateLimiter for UnboundedLimiter {
    fn try_acquire(&self, _player: PlayerId) -> bool {
        true
    }
}

/// Permission source that grants nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPermissions;

impl PermissionSource for NoPermissions {
    fn has_permission(&self, _player: PlayerId, _node: &str) -> bool {
        false
    }
}

/// Feedback sink that swallows every cue.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentFeedback;

impl FeedbackSink for SilentFeedback {
    fn play_cue(&self, _player: PlayerId, _volume: f32, _pitch: f32) {}
}
