//! # Threat Classification
//!
//! Heuristic tier assignment for creatures with no explicit mapping. Two
//! modes:
//!
//! - **full**: vitality, damage capabilities, attitude group, drop table
//!   and combat support feed a threat score; the vitality tier and the
//!   score tier are reconciled into a final answer with a confidence
//! - **name-only**: startup scans without a live entity; keyword checks
//!   with a flat 0.6 confidence discount so a name-only answer never
//!   outranks a vitality-informed one
//!
//! Classification never errors. Unusable names come back as `UNKNOWN`
//! with zero confidence and no reward eligibility.

use std::fmt;

use coinward_core::TIER_NONE;

/// Tier name for creatures whose identity could not be established.
pub const TIER_UNKNOWN: &str = "UNKNOWN";

/// Maximum accepted identifier length after sanitization.
const MAX_NAME_LEN: usize = 128;

/// Confidence discount applied to every name-only classification.
const NAME_ONLY_DISCOUNT: f32 = 0.6;

// Attitude groups, as declared on creature roles by the host.
const AGGRESSIVE_GROUPS: [&str; 11] = [
    "Predator", "PredatorsBig", "PredatorsSmall", "Hostile", "Undead", "Aberrant", "Monster",
    "Trork", "Scarak", "Void", "Shadow",
];
const FRIENDLY_GROUPS: [&str; 7] =
    ["Friendly", "Civilian", "Player", "NPC", "Villager", "Merchant", "Guard"];

// Name keyword sets, matched as lowercase substrings.
const BOSS_KEYWORDS: [&str; 13] = [
    "boss", "titan", "dragon", "colossus", "overlord", "king", "queen", "lord", "ancient",
    "primal", "supreme", "mega", "ultra",
];
const WORLDBOSS_KEYWORDS: [&str; 3] = ["dragon", "titan", "colossus"];
const ELITE_KEYWORDS: [&str; 10] = [
    "elite", "alpha", "werewolf", "ghoul", "aberrant", "corrupted", "void", "shadow", "dark_",
    "elder",
];
const DIALOGUE_KEYWORDS: [&str; 20] = [
    "npc", "villager", "merchant", "trader", "quest", "shopkeeper", "civilian", "citizen",
    "innkeeper", "bartender", "blacksmith", "farmer", "peasant", "guide", "helper", "dummy",
    "target", "mannequin", "scarecrow", "training",
];
const PASSIVE_KEYWORDS: [&str; 20] = [
    "sheep", "cow", "pig", "chicken", "deer", "rabbit", "bunny", "fish", "bird", "frog", "crab",
    "butterfly", "bee", "snail", "turtle", "livestock", "animal", "pet", "companion", "critter",
];
const CRITTER_KEYWORDS: [&str; 15] = [
    "baby", "cub", "chick", "pup", "small", "tiny", "mini", "young", "juvenile", "hatchling",
    "spawn", "rat", "mouse", "bug", "insect",
];

/// Combat tier ladder, weakest to strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CreatureTier {
    /// Harmless wildlife.
    Critter,
    /// Non-aggressive animals.
    Passive,
    /// Standard enemies.
    Hostile,
    /// Named or upgraded enemies.
    Elite,
    /// Mid-dungeon leaders.
    Miniboss,
    /// Encounter bosses.
    Boss,
    /// Server-wide events.
    Worldboss,
}

impl CreatureTier {
    /// Ladder position, 1 (critter) through 7 (worldboss).
    #[must_use]
    pub const fn rank(self) -> u8 {
        self as u8 + 1
    }

    /// Canonical upper-case tier name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Critter => "CRITTER",
            Self::Passive => "PASSIVE",
            Self::Hostile => "HOSTILE",
            Self::Elite => "ELITE",
            Self::Miniboss => "MINIBOSS",
            Self::Boss => "BOSS",
            Self::Worldboss => "WORLDBOSS",
        }
    }

    /// Next tier up, saturating at worldboss.
    #[must_use]
    pub const fn promoted(self) -> Self {
        match self {
            Self::Critter => Self::Passive,
            Self::Passive => Self::Hostile,
            Self::Hostile => Self::Elite,
            Self::Elite => Self::Miniboss,
            Self::Miniboss => Self::Boss,
            Self::Boss | Self::Worldboss => Self::Worldboss,
        }
    }

    /// Tier implied by base vitality alone. Zero vitality carries no signal.
    #[must_use]
    pub fn from_vitality(vitality: u32) -> Option<Self> {
        if vitality == 0 {
            return None;
        }
        Some(match vitality {
            1..=30 => Self::Critter,
            31..=45 => Self::Passive,
            46..=150 => Self::Hostile,
            151..=350 => Self::Elite,
            351..=600 => Self::Miniboss,
            601..=1_500 => Self::Boss,
            _ => Self::Worldboss,
        })
    }

    /// Tier implied by threat score alone.
    #[must_use]
    pub fn from_score(score: f64) -> Option<Self> {
        if score <= 0.0 {
            return None;
        }
        Some(if score <= 50.0 {
            Self::Critter
        } else if score <= 120.0 {
            Self::Passive
        } else if score <= 350.0 {
            Self::Hostile
        } else if score <= 600.0 {
            Self::Elite
        } else if score <= 1_000.0 {
            Self::Miniboss
        } else if score <= 2_500.0 {
            Self::Boss
        } else {
            Self::Worldboss
        })
    }
}

impl fmt::Display for CreatureTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observable facts about a live creature, supplied by the host.
#[derive(Debug, Clone, Default)]
pub struct CreatureProfile {
    /// Base maximum vitality of the role, not current health.
    pub base_vitality: u32,
    /// Interaction capability keys declared on the role
    /// (`damage`, `melee_attack`, `ranged_shot`, ...).
    pub interaction_keys: Vec<String>,
    /// Attitude group the role belongs to, if declared.
    pub attitude_group: Option<String>,
    /// Whether the role carries a drop table.
    pub has_drop_table: bool,
    /// Whether the role supports combat at all.
    pub has_combat_support: bool,
}

impl CreatureProfile {
    fn is_aggressive(&self) -> bool {
        self.group_in(&AGGRESSIVE_GROUPS)
    }

    fn is_friendly(&self) -> bool {
        self.group_in(&FRIENDLY_GROUPS)
    }

    fn group_in(&self, groups: &[&str]) -> bool {
        self.attitude_group
            .as_deref()
            .is_some_and(|g| groups.iter().any(|known| g.eq_ignore_ascii_case(known)))
    }
}

/// Why a classification landed where it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationReason {
    /// Vitality tier and score tier agreed.
    VitalityScoreMatch,
    /// Score tier was one step above vitality; vitality kept primacy.
    VitalityPrimary,
    /// Score tier was two or more steps above vitality; promoted one step.
    ScoreAdjusted,
    /// Vitality tier was above score tier; vitality kept primacy.
    HighVitalityLowThreat,
    /// Only one of the two signals was usable.
    ScoreOnly,
    /// Classified from the name alone, no entity data.
    NameOnly,
    /// Dialogue or decorative role; never rewarded.
    NonCombat,
    /// Identifier was unusable after sanitization.
    InvalidName,
}

impl fmt::Display for ClassificationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::VitalityScoreMatch => "vitality/score match",
            Self::VitalityPrimary => "vitality primary",
            Self::ScoreAdjusted => "score adjusted",
            Self::HighVitalityLowThreat => "high vitality, low threat",
            Self::ScoreOnly => "single signal",
            Self::NameOnly => "name only",
            Self::NonCombat => "non-combat role",
            Self::InvalidName => "invalid name",
        };
        f.write_str(s)
    }
}

/// Outcome of a classification.
#[derive(Debug, Clone)]
pub struct Classification {
    /// Sanitized creature name, or the raw input when unusable.
    pub name: String,
    /// Tier name; `NONE` or `UNKNOWN` for non-rewarding outcomes.
    pub tier: String,
    /// How sure the classifier is, 0.0 to 1.0.
    pub confidence: f32,
    /// Computed threat score (zero in name-only mode).
    pub threat_score: f64,
    /// Whether kills of this creature may be rewarded.
    pub reward_eligible: bool,
    /// Decision path taken.
    pub reason: ClassificationReason,
}

/// Clean a raw identifier into something classifiable.
///
/// Strips characters outside `[A-Za-z0-9_]`, leading digits and
/// underscores, and trailing underscores; rejects results shorter than two
/// characters; truncates to 128.
#[must_use]
pub fn sanitize_name(raw: &str) -> Option<String> {
    let mut cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    let start = cleaned
        .find(|c: char| c.is_ascii_alphabetic())
        .unwrap_or(cleaned.len());
    cleaned.drain(..start);
    while cleaned.ends_with('_') {
        cleaned.pop();
    }
    cleaned.truncate(MAX_NAME_LEN);
    if cleaned.len() < 2 {
        None
    } else {
        Some(cleaned)
    }
}

/// Classify a creature from its full profile.
#[must_use]
pub fn classify(creature_id: &str, profile: &CreatureProfile) -> Classification {
    let Some(name) = sanitize_name(creature_id) else {
        return Classification {
            name: creature_id.to_owned(),
            tier: TIER_UNKNOWN.to_owned(),
            confidence: 0.0,
            threat_score: 0.0,
            reward_eligible: false,
            reason: ClassificationReason::InvalidName,
        };
    };
    let lower = name.to_ascii_lowercase();

    if is_non_combat(&lower, profile) {
        return Classification {
            name,
            tier: TIER_NONE.to_owned(),
            confidence: 0.95,
            threat_score: 0.0,
            reward_eligible: false,
            reason: ClassificationReason::NonCombat,
        };
    }

    let score = threat_score(&lower, profile);
    let vitality_tier = CreatureTier::from_vitality(profile.base_vitality);
    let score_tier = CreatureTier::from_score(score);

    let (tier, confidence, reason) = match (vitality_tier, score_tier) {
        (Some(by_vitality), Some(by_score)) => decide(by_vitality, by_score),
        (Some(only), None) | (None, Some(only)) => {
            (only, 0.70, ClassificationReason::ScoreOnly)
        }
        (None, None) => {
            // No usable signals at all; fall back to the name.
            let mut by_name = classify_by_name(&name);
            by_name.threat_score = score;
            return by_name;
        }
    };

    tracing::debug!(
        "classified '{name}' as {tier} (score {score:.1}, confidence {confidence:.2})"
    );
    Classification {
        name,
        tier: tier.as_str().to_owned(),
        confidence,
        threat_score: score,
        reward_eligible: true,
        reason,
    }
}

/// Classify from the identifier alone, for scans without a live entity.
///
/// Confidence is discounted so these answers always rank below full-mode
/// ones; dialogue-flavored names are marked reward-ineligible.
#[must_use]
pub fn classify_by_name(creature_id: &str) -> Classification {
    let Some(name) = sanitize_name(creature_id) else {
        return Classification {
            name: creature_id.to_owned(),
            tier: TIER_UNKNOWN.to_owned(),
            confidence: 0.0,
            threat_score: 0.0,
            reward_eligible: false,
            reason: ClassificationReason::InvalidName,
        };
    };
    let lower = name.to_ascii_lowercase();

    let (tier, base_confidence) = if contains_any(&lower, &BOSS_KEYWORDS) {
        if contains_any(&lower, &WORLDBOSS_KEYWORDS) {
            (CreatureTier::Worldboss, 0.55)
        } else {
            (CreatureTier::Boss, 0.45)
        }
    } else if contains_any(&lower, &ELITE_KEYWORDS) {
        (CreatureTier::Elite, 0.55)
    } else if contains_any(&lower, &CRITTER_KEYWORDS) {
        (CreatureTier::Critter, 0.70)
    } else if contains_any(&lower, &PASSIVE_KEYWORDS) {
        (CreatureTier::Passive, 0.65)
    } else {
        (CreatureTier::Hostile, 0.40)
    };

    Classification {
        name,
        tier: tier.as_str().to_owned(),
        confidence: base_confidence * NAME_ONLY_DISCOUNT,
        threat_score: 0.0,
        reward_eligible: !contains_any(&lower, &DIALOGUE_KEYWORDS),
        reason: ClassificationReason::NameOnly,
    }
}

/// Damage capability indicator derived from interaction keys.
#[must_use]
pub fn damage_indicator(interaction_keys: &[String]) -> u32 {
    let mut indicator = 0;
    for key in interaction_keys {
        let key = key.to_ascii_lowercase();
        if key.contains("special") || key.contains("ability") {
            indicator += 30;
        } else if key.contains("ranged") {
            indicator += 25;
        } else if key.contains("damage") || key.contains("attack") {
            indicator += 20;
        } else if key.contains("melee") {
            indicator += 15;
        }
    }
    indicator
}

fn is_non_combat(lower_name: &str, profile: &CreatureProfile) -> bool {
    let dialogue = contains_any(lower_name, &DIALOGUE_KEYWORDS);
    if dialogue && profile.base_vitality < 100 && !profile.has_combat_support {
        return true;
    }
    if profile.is_friendly() && !profile.has_combat_support {
        return true;
    }
    if profile.base_vitality == 0 && !profile.has_drop_table && !profile.has_combat_support {
        return true;
    }
    if profile.base_vitality < 10 && !profile.has_combat_support && !profile.has_drop_table {
        return true;
    }
    false
}

fn threat_score(lower_name: &str, profile: &CreatureProfile) -> f64 {
    let mut score = f64::from(profile.base_vitality)
        + f64::from(damage_indicator(&profile.interaction_keys)) * 2.0;
    if profile.has_combat_support {
        score += 50.0;
    }
    if profile.has_drop_table {
        score += 25.0;
    }
    if profile.is_aggressive() {
        score *= 1.3;
    }
    // Name bonuses are gated on vitality so a decorative "Dragon_Statue"
    // cannot talk its way into boss payouts.
    if contains_any(lower_name, &BOSS_KEYWORDS) && profile.base_vitality >= 350 {
        score += 200.0;
    } else if contains_any(lower_name, &ELITE_KEYWORDS) && profile.base_vitality >= 150 {
        score += 100.0;
    }
    if contains_any(lower_name, &PASSIVE_KEYWORDS) && !profile.is_aggressive() {
        score *= 0.7;
    }
    if contains_any(lower_name, &CRITTER_KEYWORDS) {
        score *= 0.5;
    }
    score
}

fn decide(
    by_vitality: CreatureTier,
    by_score: CreatureTier,
) -> (CreatureTier, f32, ClassificationReason) {
    if by_vitality == by_score {
        return (by_vitality, 0.95, ClassificationReason::VitalityScoreMatch);
    }
    if by_score.rank() > by_vitality.rank() {
        let gap = by_score.rank() - by_vitality.rank();
        if gap == 1 {
            (by_vitality, 0.85, ClassificationReason::VitalityPrimary)
        } else {
            // Large disagreement: trust vitality but concede one step.
            (by_vitality.promoted(), 0.75, ClassificationReason::ScoreAdjusted)
        }
    } else {
        (by_vitality, 0.85, ClassificationReason::HighVitalityLowThreat)
    }
}

fn contains_any(haystack: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| haystack.contains(k))
}
