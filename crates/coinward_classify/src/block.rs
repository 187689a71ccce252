//! # Block Tier Resolution
//!
//! Decides how rare a mined block is. Operator overrides win; after that
//! the block's family tags decide; after that, name markers. Plain rock
//! resolves to `NONE` and pays nothing.

use coinward_core::{ExclusionSet, PatternSet, TIER_NONE};

use crate::catalog::AssetCatalog;

/// Family tag to mining tier, checked in declaration order.
const FAMILY_TIERS: [(&str, &str); 10] = [
    ("Mithril", "LEGENDARY"),
    ("Adamantite", "LEGENDARY"),
    ("Thorium", "LEGENDARY"),
    ("Onyxium", "LEGENDARY"),
    ("Cobalt", "EPIC"),
    ("Diamond", "EPIC"),
    ("Emerald", "EPIC"),
    ("Gold", "RARE"),
    ("Silver", "RARE"),
    ("Iron", "UNCOMMON"),
];

const COMMON_FAMILIES: [&str; 2] = ["Coal", "Copper"];

/// Cascading block-id to mining-tier resolver.
pub struct BlockTierResolver {
    overrides: PatternSet,
    exclusions: ExclusionSet,
}

impl BlockTierResolver {
    /// Build a resolver from operator overrides and exclusions.
    #[must_use]
    pub fn new(overrides: PatternSet, exclusions: ExclusionSet) -> Self {
        Self { overrides, exclusions }
    }

    /// Whether the block is explicitly excluded from rewards.
    #[must_use]
    pub fn is_excluded(&self, block_id: &str) -> bool {
        self.exclusions.contains(block_id)
    }

    /// Resolve a block identifier to a mining tier name.
    #[must_use]
    pub fn resolve(&self, block_id: &str, catalog: &dyn AssetCatalog) -> String {
        if block_id.is_empty() || self.exclusions.contains(block_id) {
            return TIER_NONE.to_owned();
        }
        if let Some(tier) = self.overrides.resolve(block_id) {
            return tier.to_owned();
        }

        let lower = block_id.to_ascii_lowercase();
        // Top-end ores ship with incomplete family tags; force them by
        // name so they can never fall through to a lesser tier.
        if lower.contains("mithril") || lower.contains("adamantite") {
            return "LEGENDARY".to_owned();
        }

        if let Some(families) = catalog.block_families(block_id) {
            if let Some(tier) = family_tier(&families) {
                return tier.to_owned();
            }
        } else {
            tracing::debug!("no catalog entry for block '{block_id}', using name markers");
        }

        name_marker_tier(&lower).map_or_else(|| TIER_NONE.to_owned(), str::to_owned)
    }
}

fn family_tier(families: &[String]) -> Option<&'static str> {
    for (family, tier) in FAMILY_TIERS {
        if families.iter().any(|f| f.eq_ignore_ascii_case(family)) {
            return Some(tier);
        }
    }
    if COMMON_FAMILIES
        .iter()
        .any(|c| families.iter().any(|f| f.eq_ignore_ascii_case(c)))
    {
        return Some("COMMON");
    }
    None
}

fn name_marker_tier(lower: &str) -> Option<&'static str> {
    if lower.contains("thorium") || lower.contains("onyxium") {
        return Some("LEGENDARY");
    }
    if lower.contains("cobalt") || lower.contains("diamond") || lower.contains("emerald") {
        return Some("EPIC");
    }
    if lower.contains("gold") || lower.contains("silver") {
        return Some("RARE");
    }
    if lower.contains("iron") {
        return Some("UNCOMMON");
    }
    if lower.contains("coal") || lower.contains("copper") {
        return Some("COMMON");
    }
    None
}
