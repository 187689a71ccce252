//! # COINWARD Security
//!
//! Anti-abuse primitives that sit between classification and payout.
//!
//! ## Design Principles
//!
//! 1. **Explicit time** - Every stateful call takes `now_ms`; tests drive
//!    the clock, production passes the wall clock
//! 2. **Bounded memory** - Player tables have hard capacity caps with
//!    oldest-first eviction, plus TTL sweeps for idle entries
//! 3. **Fail toward less money** - When in doubt these components shrink
//!    or deny a payout; they never inflate one
//!
//! ## Thread Safety
//!
//! All components are `Send + Sync` and designed for hundreds of
//! concurrent callers: sharded maps for per-player state, atomics for the
//! global cap.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod anti_farm;
pub mod economy_cap;
pub mod streak;

pub use anti_farm::{AntiFarmConfig, AntiFarmTracker};
pub use economy_cap::EconomyCap;
pub use streak::VeinStreakTracker;
