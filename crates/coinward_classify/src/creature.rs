//! # Creature Tier Resolution
//!
//! Maps a creature identifier to a tier name through a fixed cascade:
//! exclusions, exact mappings, memo cache, wildcard mappings, name
//! heuristics, configured default. The cache only ever holds results of
//! the expensive stages (pattern scan and heuristics); exact hits are
//! already O(1).

use dashmap::DashMap;

use coinward_core::{ExclusionSet, PatternSet, TIER_NONE};

/// Upper bound on memoized resolutions. Once full, new identifiers are
/// still resolved correctly, just not remembered.
const MAX_CACHE_ENTRIES: usize = 2_000;

/// Cascading creature-id to tier-name resolver.
pub struct CreatureTierResolver {
    mappings: PatternSet,
    exclusions: ExclusionSet,
    default_tier: String,
    cache: DashMap<String, String>,
}

impl CreatureTierResolver {
    /// Build a resolver from compiled mapping and exclusion sets.
    #[must_use]
    pub fn new(mappings: PatternSet, exclusions: ExclusionSet, default_tier: impl Into<String>) -> Self {
        Self {
            mappings,
            exclusions,
            default_tier: default_tier.into(),
            cache: DashMap::new(),
        }
    }

    /// Whether the creature is explicitly excluded from rewards.
    #[must_use]
    pub fn is_excluded(&self, creature_id: &str) -> bool {
        self.exclusions.contains(creature_id)
    }

    /// Resolve a creature identifier to a tier name.
    ///
    /// Empty and excluded identifiers resolve to [`TIER_NONE`].
    #[must_use]
    pub fn resolve(&self, creature_id: &str) -> String {
        if creature_id.is_empty() || self.exclusions.contains(creature_id) {
            return TIER_NONE.to_owned();
        }
        if let Some(tier) = self.mappings.resolve_exact(creature_id) {
            return tier.to_owned();
        }
        if let Some(hit) = self.cache.get(creature_id) {
            return hit.clone();
        }

        let tier = self.mappings.resolve_pattern(creature_id).map_or_else(
            || {
                infer_tier_from_name(creature_id).map_or_else(
                    || {
                        tracing::debug!("no mapping for '{creature_id}', using default tier");
                        self.default_tier.clone()
                    },
                    str::to_owned,
                )
            },
            str::to_owned,
        );

        if self.cache.len() < MAX_CACHE_ENTRIES {
            self.cache.entry(creature_id.to_owned()).or_insert_with(|| tier.clone());
        }
        tier
    }

    /// Number of memoized resolutions.
    #[must_use]
    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }

    /// Drop every memoized resolution. Call after mappings change.
    pub fn invalidate(&self) {
        self.cache.clear();
    }
}

/// Guess a tier from naming conventions alone. Conservative: only fires on
/// markers that are unambiguous in practice.
fn infer_tier_from_name(creature_id: &str) -> Option<&'static str> {
    let name = creature_id.to_ascii_lowercase();

    if name.contains("dragon")
        || name.contains("titan")
        || name.contains("colossus")
        || name.starts_with("ancient_")
    {
        return Some("WORLDBOSS");
    }
    if name.contains("broodmother")
        || name.contains("overlord")
        || name.ends_with("_boss")
        || name.starts_with("boss_")
    {
        return Some("BOSS");
    }

    const MINIBOSS_SUFFIXES: [&str; 7] =
        ["_chieftain", "_duke", "_king", "_queen", "_lord", "_captain", "_champion"];
    if MINIBOSS_SUFFIXES.iter().any(|s| name.ends_with(s)) {
        return Some("MINIBOSS");
    }

    const ELITE_SUFFIXES: [&str; 7] =
        ["_elder", "_alpha", "_knight", "_mage", "_shaman", "_priest", "_elite"];
    if ELITE_SUFFIXES.iter().any(|s| name.ends_with(s)) || name.starts_with("golem_") {
        return Some("ELITE");
    }

    const CRITTER_SUFFIXES: [&str; 6] =
        ["_cub", "_baby", "_seedling", "_sapling", "_hatchling", "_pup"];
    const CRITTER_NAMES: [&str; 4] = ["bunny", "mouse", "squirrel", "gecko"];
    if CRITTER_SUFFIXES.iter().any(|s| name.ends_with(s))
        || CRITTER_NAMES.iter().any(|n| name == *n)
    {
        return Some("CRITTER");
    }

    const PASSIVE_NAMES: [&str; 6] = ["chicken", "cow", "pig", "sheep", "goat", "horse"];
    if PASSIVE_NAMES.iter().any(|n| name == *n) {
        return Some("PASSIVE");
    }

    None
}
