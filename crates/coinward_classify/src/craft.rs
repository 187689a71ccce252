//! # Crafted-Item Tier Resolution
//!
//! Cascading resolver for crafting rewards. Explicit configuration always
//! wins; when every mapping misses, the recipe's own shape (input count,
//! quantities, craft time, knowledge and level requirements) is scored
//! into a complexity tier so new content pays *something* sensible before
//! anyone maps it.

use std::collections::HashMap;

use dashmap::DashMap;

use coinward_core::{ExclusionSet, PatternSet, TIER_NONE};

use crate::catalog::AssetCatalog;

/// Crafting tier ladder, lowest to highest. Index is priority.
pub const CRAFT_TIER_ORDER: [&str; 9] = [
    "NONE", "TRIVIAL", "SIMPLE", "BASIC", "STANDARD", "ADVANCED", "EXPERT", "MASTER", "LEGENDARY",
];

/// Bench identifier assumed when a recipe requires no bench at all.
const HAND_CRAFTING_BENCH: &str = "Fieldcraft";

/// Upper bound on memoized recipe resolutions.
const MAX_CACHE_ENTRIES: usize = 2_000;

/// One ingredient line of a recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeInput {
    /// Ingredient item identifier.
    pub item_id: String,
    /// Units consumed per craft.
    pub quantity: u32,
}

/// Everything the resolver needs to know about one recipe.
#[derive(Debug, Clone, Default)]
pub struct RecipeSpec {
    /// Recipe identifier.
    pub recipe_id: String,
    /// Output item identifier.
    pub output_item: String,
    /// Units produced per craft.
    pub output_quantity: u32,
    /// Ingredient lines.
    pub inputs: Vec<RecipeInput>,
    /// Craft duration in seconds.
    pub craft_seconds: f32,
    /// Whether the recipe must be learned before use.
    pub requires_knowledge: bool,
    /// Minimum player level, 1-based.
    pub required_level: u32,
    /// Bench identifiers the recipe can be crafted at; empty means hand
    /// crafting.
    pub benches: Vec<String>,
}

/// Priority of a crafting tier name; unknown names sit at `BASIC` level.
fn tier_priority(name: &str) -> usize {
    CRAFT_TIER_ORDER.iter().position(|t| *t == name).unwrap_or(3)
}

/// Cascading recipe to tier-name resolver.
pub struct CraftTierResolver {
    recipe_mappings: PatternSet,
    item_mappings: PatternSet,
    category_mappings: HashMap<String, String>,
    bench_mappings: HashMap<String, String>,
    exclusions: ExclusionSet,
    default_tier: String,
    cache: DashMap<String, String>,
}

impl CraftTierResolver {
    /// Build a resolver from compiled mapping tables.
    #[must_use]
    pub fn new(
        recipe_mappings: PatternSet,
        item_mappings: PatternSet,
        category_mappings: HashMap<String, String>,
        bench_mappings: HashMap<String, String>,
        exclusions: ExclusionSet,
        default_tier: impl Into<String>,
    ) -> Self {
        Self {
            recipe_mappings,
            item_mappings,
            category_mappings,
            bench_mappings,
            exclusions,
            default_tier: default_tier.into(),
            cache: DashMap::new(),
        }
    }

    /// Whether the recipe or its output item is explicitly excluded.
    #[must_use]
    pub fn is_excluded(&self, recipe: &RecipeSpec) -> bool {
        self.exclusions.contains(&recipe.recipe_id) || self.exclusions.contains(&recipe.output_item)
    }

    /// Resolve a recipe to a crafting tier name.
    ///
    /// Excluded recipes resolve to [`TIER_NONE`]. Results are memoized per
    /// recipe id.
    #[must_use]
    pub fn resolve(&self, recipe: &RecipeSpec, catalog: &dyn AssetCatalog) -> String {
        if recipe.recipe_id.is_empty() && recipe.output_item.is_empty() {
            return TIER_NONE.to_owned();
        }
        if self.is_excluded(recipe) {
            return TIER_NONE.to_owned();
        }
        if let Some(hit) = self.cache.get(&recipe.recipe_id) {
            return hit.clone();
        }

        let tier = self.resolve_uncached(recipe, catalog);
        if !recipe.recipe_id.is_empty() && self.cache.len() < MAX_CACHE_ENTRIES {
            self.cache
                .entry(recipe.recipe_id.clone())
                .or_insert_with(|| tier.clone());
        }
        tier
    }

    fn resolve_uncached(&self, recipe: &RecipeSpec, catalog: &dyn AssetCatalog) -> String {
        if let Some(tier) = self.recipe_mappings.resolve(&recipe.recipe_id) {
            return tier.to_owned();
        }
        if let Some(tier) = self.item_mappings.resolve(&recipe.output_item) {
            return tier.to_owned();
        }
        if let Some(tier) = self.resolve_by_category(&recipe.output_item, catalog) {
            return tier;
        }
        if let Some(tier) = self.resolve_by_bench(&recipe.benches) {
            return tier;
        }
        if recipe.inputs.is_empty() {
            tracing::debug!(
                "recipe '{}' has no mappings and no inputs, using default tier",
                recipe.recipe_id
            );
            return self.default_tier.clone();
        }
        let score = complexity_score(recipe);
        let tier = tier_for_complexity(score);
        tracing::debug!(
            "auto-classified recipe '{}' as {tier} (complexity {score:.0})",
            recipe.recipe_id
        );
        tier.to_owned()
    }

    /// Highest-ranked tier among the output item's mapped categories.
    fn resolve_by_category(&self, item_id: &str, catalog: &dyn AssetCatalog) -> Option<String> {
        let Some(categories) = catalog.item_categories(item_id) else {
            tracing::debug!("no catalog entry for item '{item_id}', skipping category rule");
            return None;
        };
        categories
            .iter()
            .filter_map(|c| self.category_mappings.get(c))
            .max_by_key(|tier| tier_priority(tier))
            .cloned()
    }

    /// Highest-ranked tier among the recipe's benches; no bench means hand
    /// crafting.
    fn resolve_by_bench(&self, benches: &[String]) -> Option<String> {
        if benches.is_empty() {
            return self.bench_mappings.get(HAND_CRAFTING_BENCH).cloned();
        }
        benches
            .iter()
            .filter_map(|b| self.bench_mappings.get(b))
            .max_by_key(|tier| tier_priority(tier))
            .cloned()
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

/// Shape-based difficulty score for an unmapped recipe.
fn complexity_score(recipe: &RecipeSpec) -> f64 {
    let distinct_inputs = recipe.inputs.len() as f64 * 10.0;
    let total_quantity: u32 = recipe.inputs.iter().map(|i| i.quantity).sum();
    let time = f64::from(recipe.craft_seconds) * 5.0;
    let knowledge = if recipe.requires_knowledge { 50.0 } else { 0.0 };
    let level = f64::from(recipe.required_level.saturating_sub(1)) * 25.0;
    distinct_inputs + f64::from(total_quantity) + time + knowledge + level
}

fn tier_for_complexity(score: f64) -> &'static str {
    if score < 10.0 {
        "TRIVIAL"
    } else if score < 30.0 {
        "SIMPLE"
    } else if score < 60.0 {
        "BASIC"
    } else if score < 100.0 {
        "STANDARD"
    } else if score < 150.0 {
        "ADVANCED"
    } else if score < 250.0 {
        "EXPERT"
    } else if score < 400.0 {
        "MASTER"
    } else {
        "LEGENDARY"
    }
}
