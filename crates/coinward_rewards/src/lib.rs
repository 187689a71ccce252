//! # COINWARD Rewards
//!
//! The payout pipelines. Each game action (a kill, a block break, a
//! completed craft) enters its pipeline, runs the same ordered gate
//! sequence, and either deposits coins through the host's ledger or
//! stops silently at the first failing gate.
//!
//! ## The Gate Sequence
//!
//! 1. Pipeline enabled
//! 2. Target not excluded
//! 3. Tier resolved and rewarding
//! 4. Drop-chance roll (plus VIP bonus)
//! 5. Host rate limiter permit
//! 6. Anti-farm multiplier (shrinks, never stops)
//! 7. Amount above zero after multipliers and probabilistic rounding
//! 8. Hourly injection cap admits the value
//! 9. Ledger accepts the deposit
//!
//! ## Host Integration
//!
//! The crate never touches the game server. Hosts implement the
//! [`capability`] traits and hand them to the pipeline constructors;
//! no-op stand-ins exist for every trait.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod capability;
pub mod config;
pub mod crafting;
pub mod error;
pub mod kills;
pub mod mining;
pub mod pipeline;
pub mod stats;
pub mod vip;

pub use capability::{
    CoinLedger, FeedbackSink, NoPermissions, PermissionSource, RateLimiter, SilentFeedback,
    UnboundedLimiter, WorldPosition,
};
pub use config::RewardsConfig;
pub use crafting::CraftingRewardPipeline;
pub use error::{RewardsError, RewardsResult};
pub use kills::KillRewardPipeline;
pub use mining::{BlockBreak, MiningRewardPipeline};
pub use pipeline::{GrantOutcome, SkipReason};
pub use stats::StatsSnapshot;
pub use vip::VipConfig;
