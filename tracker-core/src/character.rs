//! Character records.
//!
//! Contains the id type, the stat and resistance blocks, the limits they are
//! clamped against, and the factory that seeds new characters with defaults.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Name given to characters created without one.
pub const DEFAULT_CHARACTER_NAME: &str = "New Character";

// ============================================================================
// ID Types
// ============================================================================

/// Unique identifier for characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharacterId(pub Uuid);

impl CharacterId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an id from its hyphenated string form.
    pub fn parse(value: &str) -> Option<Self> {
        Uuid::parse_str(value).ok().map(Self)
    }
}

impl Default for CharacterId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Stats
// ============================================================================

/// The live stats an action can modify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatKind {
    Hp,
    Armor,
    Mana,
}

impl StatKind {
    pub fn name(&self) -> &'static str {
        match self {
            StatKind::Hp => "hp",
            StatKind::Armor => "armor",
            StatKind::Mana => "mana",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatKind::Hp => "HP",
            StatKind::Armor => "Armor",
            StatKind::Mana => "Mana",
        }
    }

    pub fn all() -> [StatKind; 3] {
        [StatKind::Hp, StatKind::Armor, StatKind::Mana]
    }
}

impl fmt::Display for StatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Ceilings applied whenever stats or resistances are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatLimits {
    /// Upper bound for `maxHp`, `maxArmor` and `maxMana`.
    pub max_stat: u32,
    /// Upper bound for `manaRegeneration`, a percentage.
    pub max_regeneration: u32,
    /// Upper bound for every resistance, a percentage.
    pub max_resistance: u32,
}

impl Default for StatLimits {
    fn default() -> Self {
        Self {
            max_stat: 1000,
            max_regeneration: 100,
            max_resistance: 200,
        }
    }
}

/// A block of hit points, armor and mana.
///
/// Characters carry two: the baseline used by reset and the live values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterStats {
    pub hp: u32,
    pub max_hp: u32,
    pub armor: u32,
    pub max_armor: u32,
    pub mana: u32,
    pub max_mana: u32,
    /// Percentage of `max_mana` regained each turn.
    pub mana_regeneration: u32,
}

impl Default for CharacterStats {
    fn default() -> Self {
        Self {
            hp: 80,
            max_hp: 80,
            armor: 20,
            max_armor: 20,
            mana: 100,
            max_mana: 100,
            mana_regeneration: 30,
        }
    }
}

impl CharacterStats {
    pub fn current(&self, kind: StatKind) -> u32 {
        match kind {
            StatKind::Hp => self.hp,
            StatKind::Armor => self.armor,
            StatKind::Mana => self.mana,
        }
    }

    pub fn max(&self, kind: StatKind) -> u32 {
        match kind {
            StatKind::Hp => self.max_hp,
            StatKind::Armor => self.max_armor,
            StatKind::Mana => self.max_mana,
        }
    }

    pub fn set_current(&mut self, kind: StatKind, value: u32) {
        match kind {
            StatKind::Hp => self.hp = value,
            StatKind::Armor => self.armor = value,
            StatKind::Mana => self.mana = value,
        }
    }

    /// Overlay every field present in `patch`.
    pub fn patched(mut self, patch: &StatsPatch) -> Self {
        if let Some(hp) = patch.hp {
            self.hp = hp;
        }
        if let Some(max_hp) = patch.max_hp {
            self.max_hp = max_hp;
        }
        if let Some(armor) = patch.armor {
            self.armor = armor;
        }
        if let Some(max_armor) = patch.max_armor {
            self.max_armor = max_armor;
        }
        if let Some(mana) = patch.mana {
            self.mana = mana;
        }
        if let Some(max_mana) = patch.max_mana {
            self.max_mana = max_mana;
        }
        if let Some(regen) = patch.mana_regeneration {
            self.mana_regeneration = regen;
        }
        self
    }

    /// Cap the max fields and the regeneration rate at the configured ceilings.
    pub fn limit_maxima(mut self, limits: &StatLimits) -> Self {
        self.max_hp = self.max_hp.min(limits.max_stat);
        self.max_armor = self.max_armor.min(limits.max_stat);
        self.max_mana = self.max_mana.min(limits.max_stat);
        self.mana_regeneration = self.mana_regeneration.min(limits.max_regeneration);
        self
    }

    /// Cap every current value at its max field.
    pub fn clamp_current(mut self) -> Self {
        self.hp = self.hp.min(self.max_hp);
        self.armor = self.armor.min(self.max_armor);
        self.mana = self.mana.min(self.max_mana);
        self
    }

    /// Both clamps, in the order that keeps current values within the capped maxima.
    pub fn sanitized(self, limits: &StatLimits) -> Self {
        self.limit_maxima(limits).clamp_current()
    }

    /// This block with hp, armor and mana refilled to their max fields.
    pub fn refilled(mut self) -> Self {
        self.hp = self.max_hp;
        self.armor = self.max_armor;
        self.mana = self.max_mana;
        self
    }
}

/// A partial stat block. Absent fields are left untouched when applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hp: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_hp: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub armor: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_armor: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mana: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_mana: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mana_regeneration: Option<u32>,
}

impl StatsPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a maximum and fill the matching current value to it.
    pub fn with_max(mut self, kind: StatKind, value: u32) -> Self {
        match kind {
            StatKind::Hp => {
                self.max_hp = Some(value);
                self.hp = Some(value);
            }
            StatKind::Armor => {
                self.max_armor = Some(value);
                self.armor = Some(value);
            }
            StatKind::Mana => {
                self.max_mana = Some(value);
                self.mana = Some(value);
            }
        }
        self
    }

    pub fn with_current(mut self, kind: StatKind, value: u32) -> Self {
        match kind {
            StatKind::Hp => self.hp = Some(value),
            StatKind::Armor => self.armor = Some(value),
            StatKind::Mana => self.mana = Some(value),
        }
        self
    }

    pub fn with_regeneration(mut self, percent: u32) -> Self {
        self.mana_regeneration = Some(percent);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// ============================================================================
// Resistances
// ============================================================================

/// The seven resistance types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResistanceKind {
    Freezing,
    Shock,
    Bleeding,
    Flames,
    Poison,
    Stunning,
    Blindness,
}

impl ResistanceKind {
    pub fn name(&self) -> &'static str {
        match self {
            ResistanceKind::Freezing => "freezing",
            ResistanceKind::Shock => "shock",
            ResistanceKind::Bleeding => "bleeding",
            ResistanceKind::Flames => "flames",
            ResistanceKind::Poison => "poison",
            ResistanceKind::Stunning => "stunning",
            ResistanceKind::Blindness => "blindness",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::all()
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
    }

    pub fn all() -> [ResistanceKind; 7] {
        [
            ResistanceKind::Freezing,
            ResistanceKind::Shock,
            ResistanceKind::Bleeding,
            ResistanceKind::Flames,
            ResistanceKind::Poison,
            ResistanceKind::Stunning,
            ResistanceKind::Blindness,
        ]
    }
}

impl fmt::Display for ResistanceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Per-element resistance percentages.
///
/// Damage resolution does not consult these yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterResistances {
    pub freezing: u32,
    pub shock: u32,
    pub bleeding: u32,
    pub flames: u32,
    pub poison: u32,
    pub stunning: u32,
    pub blindness: u32,
}

impl Default for CharacterResistances {
    fn default() -> Self {
        Self::uniform(100)
    }
}

impl CharacterResistances {
    pub fn uniform(value: u32) -> Self {
        Self {
            freezing: value,
            shock: value,
            bleeding: value,
            flames: value,
            poison: value,
            stunning: value,
            blindness: value,
        }
    }

    pub fn get(&self, kind: ResistanceKind) -> u32 {
        match kind {
            ResistanceKind::Freezing => self.freezing,
            ResistanceKind::Shock => self.shock,
            ResistanceKind::Bleeding => self.bleeding,
            ResistanceKind::Flames => self.flames,
            ResistanceKind::Poison => self.poison,
            ResistanceKind::Stunning => self.stunning,
            ResistanceKind::Blindness => self.blindness,
        }
    }

    pub fn set(&mut self, kind: ResistanceKind, value: u32) {
        match kind {
            ResistanceKind::Freezing => self.freezing = value,
            ResistanceKind::Shock => self.shock = value,
            ResistanceKind::Bleeding => self.bleeding = value,
            ResistanceKind::Flames => self.flames = value,
            ResistanceKind::Poison => self.poison = value,
            ResistanceKind::Stunning => self.stunning = value,
            ResistanceKind::Blindness => self.blindness = value,
        }
    }

    pub fn clamped(mut self, limits: &StatLimits) -> Self {
        for kind in ResistanceKind::all() {
            self.set(kind, self.get(kind).min(limits.max_resistance));
        }
        self
    }

    /// Resistances whose value differs from `other`, as `(kind, ours, theirs)`.
    pub fn differences(&self, other: &Self) -> Vec<(ResistanceKind, u32, u32)> {
        ResistanceKind::all()
            .into_iter()
            .filter(|&kind| self.get(kind) != other.get(kind))
            .map(|kind| (kind, self.get(kind), other.get(kind)))
            .collect()
    }
}

// ============================================================================
// Character
// ============================================================================

/// A tracked character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    /// Baseline restored by a reset.
    pub initial_stats: CharacterStats,
    /// Live values.
    pub current_stats: CharacterStats,
    pub resistances: CharacterResistances,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Character {
    /// Create a character with default stats and resistances.
    pub fn new(name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: CharacterId::new(),
            name: name.into(),
            initial_stats: CharacterStats::default(),
            current_stats: CharacterStats::default(),
            resistances: CharacterResistances::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a character whose stat blocks start from defaults overlaid with `overrides`.
    pub fn from_template(
        name: impl Into<String>,
        overrides: &StatsPatch,
        limits: &StatLimits,
        now: DateTime<Utc>,
    ) -> Self {
        let stats = CharacterStats::default()
            .patched(overrides)
            .sanitized(limits);

        Self {
            initial_stats: stats,
            current_stats: stats,
            ..Self::new(name, now)
        }
    }

    /// Advance `updated_at`, never moving it backwards.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = self.updated_at.max(now);
    }

    pub fn is_down(&self) -> bool {
        self.current_stats.hp == 0
    }

    /// Apply the fields present in `update`.
    pub fn apply_update(&mut self, update: &CharacterUpdate, limits: &StatLimits) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(stats) = update.initial_stats {
            self.initial_stats = stats.sanitized(limits);
        }
        if let Some(stats) = update.current_stats {
            self.current_stats = stats.limit_maxima(limits);
        }
        if let Some(resistances) = update.resistances {
            self.resistances = resistances.clamped(limits);
        }
    }
}

/// A partial edit to a character. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_stats: Option<CharacterStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_stats: Option<CharacterStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resistances: Option<CharacterResistances>,
}

impl CharacterUpdate {
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
