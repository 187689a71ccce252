//! # Coin Denominations
//!
//! The six physical coin types and their fixed base values.
//!
//! All monetary math in the engine happens in *base units* (the value of a
//! single copper coin). A tier pays out N coins of one denomination; the
//! injection cap and ledger only ever see `units * base_value`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A physical coin type with a fixed base-unit value.
///
/// Ordering follows value: `Copper < Iron < ... < Adamantite`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Denomination {
    /// Base currency unit, value 1.
    Copper,
    /// Value 10.
    Iron,
    /// Value 100.
    Cobalt,
    /// Value 1,000.
    Gold,
    /// Value 10,000.
    Mithril,
    /// Value 100,000.
    Adamantite,
}

impl Denomination {
    /// Value of one coin of this denomination, in base units.
    #[must_use]
    #[inline]
    pub const fn base_value(self) -> u64 {
        match self {
            Self::Copper => 1,
            Self::Iron => 10,
            Self::Cobalt => 100,
            Self::Gold => 1_000,
            Self::Mithril => 10_000,
            Self::Adamantite => 100_000,
        }
    }

    /// Canonical upper-case name, as used in config files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Copper => "COPPER",
            Self::Iron => "IRON",
            Self::Cobalt => "COBALT",
            Self::Gold => "GOLD",
            Self::Mithril => "MITHRIL",
            Self::Adamantite => "ADAMANTITE",
        }
    }

    /// Parse a denomination name, case-insensitively.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "COPPER" => Some(Self::Copper),
            "IRON" => Some(Self::Iron),
            "COBALT" => Some(Self::Cobalt),
            "GOLD" => Some(Self::Gold),
            "MITHRIL" => Some(Self::Mithril),
            "ADAMANTITE" => Some(Self::Adamantite),
            _ => None,
        }
    }

    /// Base-unit value for a denomination name; unknown names are worth a
    /// single base unit so a typo in config never mints large coins.
    #[must_use]
    pub fn value_of(name: &str) -> u64 {
        Self::parse(name).map_or(1, Self::base_value)
    }
}

impl fmt::Display for Denomination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
