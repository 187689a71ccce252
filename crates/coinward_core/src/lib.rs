//! # COINWARD Core
//!
//! Shared primitives for the COINWARD reward engine.
//!
//! ## Design Principles
//!
//! 1. **Integer money** - Coin values are `u64` base units, never floats
//! 2. **Compile once, match often** - Wildcard patterns become anchored
//!    case-insensitive regexes at configure time
//! 3. **Validated tiers** - Every payout range is checked against the
//!    economy safety ceiling before it can enter a table
//! 4. **No hidden clocks** - Time is always an explicit parameter; the one
//!    wall-clock helper lives in [`clock`]
//!
//! ## Thread Safety
//!
//! Everything in this crate is immutable after construction and therefore
//! freely shareable across server threads.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod clock;
pub mod coin;
pub mod error;
pub mod pattern;
pub mod tier;

pub use coin::Denomination;
pub use error::{CoreError, CoreResult};
pub use pattern::{ExclusionSet, PatternSet, WildcardPattern};
pub use tier::{TierDef, TierTable, FALLBACK_TIER, MAX_TIER_UNITS, MAX_TIER_VALUE, TIER_NONE};

/// Unique identifier for a player session.
///
/// The host assigns these; the engine only uses them as map keys.
pub type PlayerId = uuid::Uuid;
