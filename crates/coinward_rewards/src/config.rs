//! # Reward Configuration
//!
//! One TOML document covering all three pipelines. Loaded once at
//! startup, validated before any pipeline is built. Defaults mirror the
//! shipped balance sheet so an empty file is a playable configuration.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use coinward_core::{Denomination, TierDef, TierTable};
use coinward_security::AntiFarmConfig;

use crate::error::{RewardsError, RewardsResult};
use crate::vip::VipConfig;

/// Top-level configuration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RewardsConfig {
    /// Verbose gate logging.
    pub debug: bool,
    /// Kill reward pipeline.
    pub mob_kills: KillRewardsConfig,
    /// Mining reward pipeline.
    pub mining: MiningRewardsConfig,
    /// Crafting reward pipeline.
    pub crafting: CraftingRewardsConfig,
    /// VIP rank perks, shared by kills and mining.
    pub vip: VipConfig,
}

impl RewardsConfig {
    /// Parse a TOML document. Missing sections take defaults.
    ///
    /// # Errors
    ///
    /// Returns a parse error or the first validation failure.
    pub fn from_toml_str(text: &str) -> RewardsResult<Self> {
        let cfg: Self = toml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load and validate a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error, a parse error, or the first validation
    /// failure.
    pub fn load(path: &Path) -> RewardsResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| RewardsError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let cfg = Self::from_toml_str(&text)?;
        tracing::info!(
            "loaded reward config: {} kill tiers, {} mining tiers, {} crafting tiers",
            cfg.mob_kills.tiers.len(),
            cfg.mining.tiers.len(),
            cfg.crafting.tiers.len()
        );
        Ok(cfg)
    }

    /// Check every tier table and tuning range.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn validate(&self) -> RewardsResult<()> {
        self.mob_kills.tiers.validate()?;
        self.mining.tiers.validate()?;
        self.crafting.tiers.validate()?;
        self.mob_kills.security.validate("mob_kills")?;
        self.mining.security.validate("mining")?;
        self.crafting.security.validate("crafting")?;
        self.mining.tool_quality.validate()?;
        self.mining.depth_bonus.validate()?;
        if self.vip.max_multiplier < 1.0 {
            return Err(RewardsError::InvalidConfig(
                "vip.max_multiplier must be at least 1.0".to_owned(),
            ));
        }
        if self.vip.chance_bonuses.values().any(|b| *b > 100) {
            return Err(RewardsError::InvalidConfig(
                "vip chance bonuses cannot exceed 100".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Anti-farm tuning as it appears in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AntiFarmSettings {
    /// Master switch.
    pub enabled: bool,
    /// Actions against one target before decay starts.
    pub threshold: u32,
    /// Multiplier reduction per action past the threshold.
    pub decay_per_action: f32,
    /// Multiplier floor, above zero.
    pub minimum_multiplier: f32,
    /// Idle minutes before a player's state is swept.
    pub idle_ttl_minutes: u64,
    /// Hard cap on tracked players.
    pub max_tracked_players: usize,
}

impl Default for AntiFarmSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: 15,
            decay_per_action: 0.08,
            minimum_multiplier: 0.1,
            idle_ttl_minutes: 30,
            max_tracked_players: 1_000,
        }
    }
}

impl AntiFarmSettings {
    /// Convert to the tracker's config type.
    #[must_use]
    pub fn to_tracker_config(&self) -> AntiFarmConfig {
        AntiFarmConfig {
            enabled: self.enabled,
            threshold: self.threshold,
            decay_per_action: self.decay_per_action,
            minimum_multiplier: self.minimum_multiplier,
            idle_ttl_ms: self.idle_ttl_minutes * 60 * 1_000,
            max_tracked_players: self.max_tracked_players,
        }
    }
}

/// Injection cap plus anti-farm, per pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecuritySettings {
    /// Hourly ceiling on injected base units.
    pub max_injection_per_hour: u64,
    /// Whether the ceiling is enforced.
    pub injection_cap_enabled: bool,
    /// Repeat-action decay tuning.
    pub anti_farm: AntiFarmSettings,
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            max_injection_per_hour: 100_000_000,
            injection_cap_enabled: true,
            anti_farm: AntiFarmSettings::default(),
        }
    }
}

impl SecuritySettings {
    fn validate(&self, section: &str) -> RewardsResult<()> {
        let af = &self.anti_farm;
        if af.decay_per_action <= 0.0 || af.decay_per_action > 1.0 {
            return Err(RewardsError::InvalidConfig(format!(
                "{section}.anti_farm.decay_per_action must be in (0, 1]"
            )));
        }
        if af.minimum_multiplier <= 0.0 || af.minimum_multiplier > 1.0 {
            return Err(RewardsError::InvalidConfig(format!(
                "{section}.anti_farm.minimum_multiplier must be in (0, 1]"
            )));
        }
        Ok(())
    }
}

/// Kill pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KillRewardsConfig {
    /// Master switch.
    pub enabled: bool,
    /// Tier payout table.
    pub tiers: TierTable,
    /// Tier used when a resolved name is missing from the table.
    pub default_tier: String,
    /// Creature id/pattern to tier name.
    pub mappings: BTreeMap<String, String>,
    /// Creature ids/patterns that never reward.
    pub exclusions: Vec<String>,
    /// Cap and anti-farm tuning.
    pub security: SecuritySettings,
}

impl Default for KillRewardsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tiers: default_kill_tiers(),
            default_tier: "HOSTILE".to_owned(),
            mappings: default_creature_mappings(),
            exclusions: default_creature_exclusions(),
            security: SecuritySettings::default(),
        }
    }
}

/// Mining pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MiningRewardsConfig {
    /// Master switch.
    pub enabled: bool,
    /// Tier payout table.
    pub tiers: TierTable,
    /// Tier used when a resolved name is missing from the table.
    pub default_tier: String,
    /// Block id/pattern to tier name, checked before family tags.
    pub overrides: BTreeMap<String, String>,
    /// Block ids/patterns that never reward.
    pub exclusions: Vec<String>,
    /// Cap and anti-farm tuning.
    pub security: SecuritySettings,
    /// Better tools pay slightly more.
    pub tool_quality: ToolQualityConfig,
    /// Deeper blocks pay slightly more.
    pub depth_bonus: DepthBonusConfig,
    /// Consecutive-ore feedback and bonus coins.
    pub vein_streak: VeinStreakSettings,
}

impl Default for MiningRewardsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tiers: default_mining_tiers(),
            default_tier: "COMMON".to_owned(),
            overrides: BTreeMap::new(),
            exclusions: vec!["Debug_*".to_owned(), "Test_*".to_owned()],
            security: SecuritySettings::default(),
            tool_quality: ToolQualityConfig::default(),
            depth_bonus: DepthBonusConfig::default(),
            vein_streak: VeinStreakSettings::default(),
        }
    }
}

/// Crafting pipeline configuration. Ships disabled; flip `enabled` once
/// the recipe mappings have been reviewed for a server's content set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CraftingRewardsConfig {
    /// Master switch.
    pub enabled: bool,
    /// Tier payout table.
    pub tiers: TierTable,
    /// Tier used when every resolution rule misses.
    pub default_tier: String,
    /// Recipe id/pattern to tier name (highest priority).
    pub recipe_mappings: BTreeMap<String, String>,
    /// Output item id/pattern to tier name.
    pub item_mappings: BTreeMap<String, String>,
    /// Item category to tier name.
    pub category_mappings: BTreeMap<String, String>,
    /// Bench id to tier name.
    pub bench_mappings: BTreeMap<String, String>,
    /// Recipe/output ids and patterns that never reward.
    pub exclusions: Vec<String>,
    /// Cap and anti-farm tuning.
    pub security: SecuritySettings,
}

impl Default for CraftingRewardsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            tiers: default_crafting_tiers(),
            default_tier: "SIMPLE".to_owned(),
            recipe_mappings: default_recipe_mappings(),
            item_mappings: default_item_mappings(),
            category_mappings: default_category_mappings(),
            bench_mappings: default_bench_mappings(),
            exclusions: default_crafting_exclusions(),
            security: SecuritySettings {
                max_injection_per_hour: 50_000_000,
                injection_cap_enabled: true,
                anti_farm: AntiFarmSettings {
                    threshold: 20,
                    decay_per_action: 0.05,
                    minimum_multiplier: 0.2,
                    idle_ttl_minutes: 60,
                    ..AntiFarmSettings::default()
                },
            },
        }
    }
}

/// Tool quality bonus: `1 + min(quality * step, max_bonus)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolQualityConfig {
    /// Master switch.
    pub enabled: bool,
    /// Bonus per quality point.
    pub quality_step: f32,
    /// Bonus ceiling.
    pub max_bonus: f32,
}

impl Default for ToolQualityConfig {
    fn default() -> Self {
        Self { enabled: true, quality_step: 0.02, max_bonus: 0.25 }
    }
}

impl ToolQualityConfig {
    /// Reward multiplier for a tool quality level.
    #[must_use]
    pub fn multiplier(&self, quality: u32) -> f32 {
        if !self.enabled {
            return 1.0;
        }
        1.0 + (quality as f32 * self.quality_step).min(self.max_bonus)
    }

    fn validate(&self) -> RewardsResult<()> {
        if self.quality_step < 0.0 || self.max_bonus < 0.0 {
            return Err(RewardsError::InvalidConfig(
                "mining.tool_quality bonuses cannot be negative".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Depth bonus: linear ramp from `max_y` (no bonus) down to `min_y`
/// (full bonus).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepthBonusConfig {
    /// Master switch.
    pub enabled: bool,
    /// Altitude of full bonus.
    pub min_y: f64,
    /// Altitude at and above which there is no bonus.
    pub max_y: f64,
    /// Bonus at `min_y` and below.
    pub max_bonus: f32,
}

impl Default for DepthBonusConfig {
    fn default() -> Self {
        Self { enabled: true, min_y: 0.0, max_y: 80.0, max_bonus: 0.20 }
    }
}

impl DepthBonusConfig {
    /// Reward multiplier for a block altitude.
    #[must_use]
    pub fn multiplier(&self, y: f64) -> f32 {
        if !self.enabled || y >= self.max_y {
            return 1.0;
        }
        if y <= self.min_y {
            return 1.0 + self.max_bonus;
        }
        let depth_frac = 1.0 - (y - self.min_y) / (self.max_y - self.min_y);
        1.0 + depth_frac as f32 * self.max_bonus
    }

    fn validate(&self) -> RewardsResult<()> {
        if self.min_y >= self.max_y {
            return Err(RewardsError::InvalidConfig(
                "mining.depth_bonus.min_y must be below max_y".to_owned(),
            ));
        }
        if self.max_bonus < 0.0 {
            return Err(RewardsError::InvalidConfig(
                "mining.depth_bonus.max_bonus cannot be negative".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Vein streak tuning: timing chain, audio pitch ramp, bonus coins.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VeinStreakSettings {
    /// Master switch.
    pub enabled: bool,
    /// Pause that breaks a streak, in milliseconds.
    pub timeout_ms: u64,
    /// Streak growth cap.
    pub max_streak: u32,
    /// Hard cap on tracked players.
    pub max_tracked_players: usize,
    /// Streak level at which bonus coins become possible.
    pub bonus_start_streak: u32,
    /// Bonus chance growth per streak level, percentage points.
    pub bonus_chance_step: u32,
    /// Bonus chance ceiling, percentage points.
    pub bonus_max_chance: u32,
    /// Value of one bonus coin, base units.
    pub bonus_coin_value: u64,
    /// Audio pitch at streak 1, in semitones from neutral.
    pub pitch_base_semitones: f32,
    /// Pitch climb per streak level, semitones.
    pub pitch_step_semitones: f32,
    /// Pitch ceiling, semitones.
    pub pitch_max_semitones: f32,
    /// Cue volume, 0.0 to 1.0.
    pub volume: f32,
}

impl Default for VeinStreakSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_ms: 3_000,
            max_streak: 6,
            max_tracked_players: 1_000,
            bonus_start_streak: 0,
            bonus_chance_step: 10,
            bonus_max_chance: 40,
            bonus_coin_value: 1,
            pitch_base_semitones: -2.0,
            pitch_step_semitones: 2.0,
            pitch_max_semitones: 6.0,
            volume: 0.8,
        }
    }
}

impl VeinStreakSettings {
    /// Chance of a bonus coin at a streak level, percentage points.
    #[must_use]
    pub fn bonus_chance(&self, streak: u32) -> u32 {
        if !self.enabled || streak < self.bonus_start_streak {
            return 0;
        }
        ((streak - self.bonus_start_streak + 1) * self.bonus_chance_step)
            .min(self.bonus_max_chance)
    }

    /// Audio pitch for a streak level; semitones converted to the linear
    /// factor audio engines expect.
    #[must_use]
    pub fn pitch(&self, streak: u32) -> f32 {
        let climbed = self.pitch_base_semitones
            + self.pitch_step_semitones * streak.saturating_sub(1) as f32;
        let semitones = climbed.min(self.pitch_max_semitones);
        (semitones / 12.0).exp2()
    }
}

// ---------------------------------------------------------------------------
// Default balance sheet
// ---------------------------------------------------------------------------

fn default_kill_tiers() -> TierTable {
    let mut t = TierTable::new();
    t.insert("NONE", TierDef::new(Denomination::Copper, 0, 0, 0));
    t.insert("CRITTER", TierDef::new(Denomination::Copper, 0, 1, 40));
    t.insert("PASSIVE", TierDef::new(Denomination::Copper, 1, 2, 100));
    t.insert("HOSTILE", TierDef::new(Denomination::Copper, 4, 10, 100));
    t.insert("ELITE", TierDef::new(Denomination::Iron, 2, 5, 100));
    t.insert("MINIBOSS", TierDef::new(Denomination::Cobalt, 2, 4, 100));
    t.insert("BOSS", TierDef::new(Denomination::Gold, 1, 3, 100));
    t.insert("WORLDBOSS", TierDef::new(Denomination::Mithril, 1, 2, 100));
    t
}

fn default_mining_tiers() -> TierTable {
    let mut t = TierTable::new();
    t.insert("NONE", TierDef::new(Denomination::Copper, 0, 0, 0));
    t.insert("BASIC", TierDef::new(Denomination::Copper, 0, 1, 30));
    t.insert("COMMON", TierDef::new(Denomination::Copper, 1, 2, 80));
    t.insert("UNCOMMON", TierDef::new(Denomination::Copper, 2, 4, 100));
    t.insert("RARE", TierDef::new(Denomination::Copper, 4, 8, 100));
    t.insert("EPIC", TierDef::new(Denomination::Iron, 1, 2, 100));
    t.insert("LEGENDARY", TierDef::new(Denomination::Iron, 2, 4, 100));
    t
}

fn default_crafting_tiers() -> TierTable {
    let mut t = TierTable::new();
    t.insert("NONE", TierDef::new(Denomination::Copper, 0, 0, 0));
    t.insert("TRIVIAL", TierDef::new(Denomination::Copper, 0, 1, 20));
    t.insert("SIMPLE", TierDef::new(Denomination::Copper, 1, 2, 60));
    t.insert("BASIC", TierDef::new(Denomination::Copper, 2, 4, 80));
    t.insert("STANDARD", TierDef::new(Denomination::Copper, 4, 8, 90));
    t.insert("ADVANCED", TierDef::new(Denomination::Copper, 8, 15, 100));
    t.insert("EXPERT", TierDef::new(Denomination::Copper, 15, 30, 100));
    t.insert("MASTER", TierDef::new(Denomination::Copper, 30, 50, 100));
    t.insert("LEGENDARY", TierDef::new(Denomination::Copper, 50, 90, 100));
    t
}

fn pairs(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect()
}

fn default_creature_mappings() -> BTreeMap<String, String> {
    pairs(&[
        ("Dragon_*", "WORLDBOSS"),
        ("Ancient_*", "WORLDBOSS"),
        ("*_Titan", "WORLDBOSS"),
        ("Spider_Broodmother", "BOSS"),
        ("Boss_*", "BOSS"),
        ("*_Overlord", "BOSS"),
        ("Trork_Chieftain", "MINIBOSS"),
        ("*_King", "MINIBOSS"),
        ("*_Queen", "MINIBOSS"),
        ("Golem_*", "ELITE"),
        ("*_Alpha", "ELITE"),
        ("Werewolf*", "ELITE"),
        ("Void_*", "ELITE"),
        ("Trork_*", "HOSTILE"),
        ("Skeleton_*", "HOSTILE"),
        ("Zombie*", "HOSTILE"),
        ("Spider_*", "HOSTILE"),
        ("Scarak_*", "HOSTILE"),
        ("Sheep", "PASSIVE"),
        ("Cow", "PASSIVE"),
        ("Pig", "PASSIVE"),
        ("Chicken", "PASSIVE"),
        ("Deer_*", "PASSIVE"),
        ("*_Cub", "CRITTER"),
        ("*_Hatchling", "CRITTER"),
        ("Rabbit", "CRITTER"),
        ("Rat", "CRITTER"),
    ])
}

fn default_creature_exclusions() -> Vec<String> {
    ["Quest_*", "Test_*", "Debug_*", "Dummy_*", "Training_*", "Npc_*", "Villager_*", "Merchant_*"]
        .iter()
        .map(|s| (*s).to_owned())
        .collect()
}

fn default_recipe_mappings() -> BTreeMap<String, String> {
    pairs(&[
        ("Recipe_Anvil", "ADVANCED"),
        ("Recipe_Furnace", "STANDARD"),
        ("Recipe_Workbench", "BASIC"),
        ("Recipe_Chest", "BASIC"),
        ("Recipe_Enchanting_Table", "MASTER"),
    ])
}

fn default_item_mappings() -> BTreeMap<String, String> {
    pairs(&[
        ("*_Wooden_*", "SIMPLE"),
        ("*_Bone_*", "SIMPLE"),
        ("*_Stone_*", "BASIC"),
        ("*_Copper_*", "STANDARD"),
        ("*_Iron_*", "ADVANCED"),
        ("*_Steel_*", "EXPERT"),
        ("*_Cobalt_*", "MASTER"),
        ("*_Mithril_*", "LEGENDARY"),
        ("*_Adamant_*", "LEGENDARY"),
        ("*_Dragon_*", "LEGENDARY"),
        ("Armor_Leather_*", "BASIC"),
        ("Ingot_Copper", "BASIC"),
        ("Ingot_Iron", "STANDARD"),
        ("Ingot_Steel", "ADVANCED"),
        ("Ingot_Cobalt", "EXPERT"),
        ("Ingot_Mithril", "MASTER"),
        ("Planks_*", "TRIVIAL"),
        ("Food_Cooked_*", "SIMPLE"),
        ("Food_Raw_*", "TRIVIAL"),
        ("Bread_*", "SIMPLE"),
        ("Stew_*", "BASIC"),
        ("Potion_*", "STANDARD"),
        ("Block_*", "TRIVIAL"),
        ("Brick_*", "SIMPLE"),
        ("Furniture_*", "BASIC"),
    ])
}

fn default_category_mappings() -> BTreeMap<String, String> {
    pairs(&[
        ("Weapon", "STANDARD"),
        ("Tool", "BASIC"),
        ("Armor", "STANDARD"),
        ("Food", "SIMPLE"),
        ("Material", "TRIVIAL"),
        ("Block", "TRIVIAL"),
        ("Decoration", "SIMPLE"),
        ("Consumable", "BASIC"),
        // Quest items never reward.
        ("Quest", "NONE"),
    ])
}

fn default_bench_mappings() -> BTreeMap<String, String> {
    pairs(&[
        ("Fieldcraft", "TRIVIAL"),
        ("Workbench", "SIMPLE"),
        ("Furnace", "SIMPLE"),
        ("Loom", "BASIC"),
        ("Tanning_Rack", "BASIC"),
        ("Anvil", "STANDARD"),
        ("Alchemy_Table", "ADVANCED"),
        ("Forge", "ADVANCED"),
        ("Enchanting_Table", "EXPERT"),
        ("Smithing_Table", "EXPERT"),
    ])
}

fn default_crafting_exclusions() -> Vec<String> {
    [
        "Quest_*", "*_Quest_*", "Debug_*", "Admin_*", "Creative_*", "Test_*", "Temp_*",
        // Trivial conversions not worth rewarding.
        "Planks_*", "Stick", "Torch",
    ]
    .iter()
    .map(|s| (*s).to_owned())
    .collect()
}
