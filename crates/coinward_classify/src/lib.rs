//! # COINWARD Classification
//!
//! Decides which payout tier an action targets: which tier a creature kill
//! belongs to, what a crafted recipe is worth, and how rare a mined block
//! is.
//!
//! ## Design Principles
//!
//! 1. **Never error** - Classification degrades; garbage in, `NONE` out
//! 2. **Config first, heuristics second** - Explicit mappings always win
//!    over inference
//! 3. **Bounded caches** - Memoization is size-gated and invalidated
//!    wholesale on reconfigure, never evicted piecemeal
//!
//! ## Thread Safety
//!
//! Resolvers are immutable after construction apart from their sharded
//! memo caches, and safe to share across server threads.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod block;
pub mod catalog;
pub mod craft;
pub mod creature;
pub mod threat;

pub use block::BlockTierResolver;
pub use catalog::{AssetCatalog, EmptyCatalog};
pub use craft::{CraftTierResolver, RecipeInput, RecipeSpec, CRAFT_TIER_ORDER};
pub use creature::CreatureTierResolver;
pub use threat::{
    classify, classify_by_name, sanitize_name, Classification, ClassificationReason,
    CreatureProfile, CreatureTier,
};
