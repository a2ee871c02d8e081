//! The character store.
//!
//! [`RosterState`] holds every character plus the selection. Each operation
//! borrows the current state and returns the next one, so a caller can keep
//! the old state around (for snapshots) and swap states atomically.
//!
//! Operations that act on "the selected character" return the state
//! unchanged when nothing is selected or the selection is dangling.

use crate::character::{
    Character, CharacterId, CharacterResistances, CharacterUpdate, StatKind, StatLimits,
    StatsPatch,
};
use crate::stats::{calculate_new_value, percentage_of, StatOperation};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// All characters and which one is selected.
///
/// This is also the persisted shape: `{ characters, selectedCharacterId }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterState {
    #[serde(default)]
    pub characters: Vec<Character>,
    #[serde(default)]
    pub selected_character_id: Option<CharacterId>,
}

/// Totals from an [`RosterState::apply_damage`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageOutcome {
    /// Raw damage dealt across every repetition, whether armor absorbed it or not.
    pub total_damage: u32,
    pub final_armor: u32,
    pub final_hp: u32,
}

/// Result of a turn advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnOutcome {
    pub mana_regained: u32,
}

/// Before and after values of a single modified stat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatChange {
    pub stat: StatKind,
    pub old_value: u32,
    pub new_value: u32,
}

/// Parameters of a stat modification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatModification {
    pub stat: StatKind,
    pub operation: StatOperation,
    pub amount: u32,
    pub is_percentage: bool,
    pub exceed_max: bool,
}

impl StatModification {
    pub fn new(stat: StatKind, operation: StatOperation, amount: u32) -> Self {
        Self {
            stat,
            operation,
            amount,
            is_percentage: false,
            exceed_max: false,
        }
    }

    pub fn percentage(mut self) -> Self {
        self.is_percentage = true;
        self
    }

    pub fn exceeding_max(mut self) -> Self {
        self.exceed_max = true;
        self
    }
}

impl RosterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: CharacterId) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == id)
    }

    /// The selected character, if the selection points at one.
    pub fn selected(&self) -> Option<&Character> {
        self.selected_character_id.and_then(|id| self.get(id))
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    /// Position of the character with `id` in roster order.
    pub fn position_of(&self, id: CharacterId) -> Option<usize> {
        self.characters.iter().position(|c| c.id == id)
    }

    /// Append a new character built from defaults and `overrides`, and select it.
    pub fn create(
        &self,
        name: impl Into<String>,
        overrides: Option<&StatsPatch>,
        limits: &StatLimits,
        now: DateTime<Utc>,
    ) -> (Self, CharacterId) {
        let character = match overrides {
            Some(patch) => Character::from_template(name, patch, limits, now),
            None => Character::new(name, now),
        };
        let id = character.id;

        let mut next = self.clone();
        next.characters.push(character);
        next.selected_character_id = Some(id);
        (next, id)
    }

    /// Point the selection at `id`. The id is not checked against the roster.
    pub fn select(&self, id: CharacterId) -> Self {
        Self {
            characters: self.characters.clone(),
            selected_character_id: Some(id),
        }
    }

    /// Apply a partial edit to the character with `id`.
    pub fn update(
        &self,
        id: CharacterId,
        update: &CharacterUpdate,
        limits: &StatLimits,
        now: DateTime<Utc>,
    ) -> Self {
        self.map_character(id, |character| {
            character.apply_update(update, limits);
            character.touch(now);
        })
    }

    /// Remove the character with `id`. A deleted selection falls back to the
    /// first remaining character, or to none.
    pub fn delete(&self, id: CharacterId) -> Self {
        let characters: Vec<Character> = self
            .characters
            .iter()
            .filter(|c| c.id != id)
            .cloned()
            .collect();

        let selected_character_id = if self.selected_character_id == Some(id) {
            characters.first().map(|c| c.id)
        } else {
            self.selected_character_id
        };

        Self {
            characters,
            selected_character_id,
        }
    }

    /// Apply `repetitions` hits of `damage_amount` to the selected character.
    ///
    /// Armor soaks each hit first unless `true_damage` is set; whatever armor
    /// cannot absorb carries through to hit points.
    pub fn apply_damage(
        &self,
        damage_amount: u32,
        true_damage: bool,
        repetitions: u32,
        now: DateTime<Utc>,
    ) -> (Self, Option<DamageOutcome>) {
        self.map_selected(|character| {
            let stats = &mut character.current_stats;
            let mut total_damage: u32 = 0;

            for _ in 0..repetitions {
                total_damage = total_damage.saturating_add(damage_amount);

                if true_damage {
                    stats.hp = stats.hp.saturating_sub(damage_amount);
                } else if stats.armor >= damage_amount {
                    stats.armor -= damage_amount;
                } else {
                    let overflow = damage_amount - stats.armor;
                    stats.armor = 0;
                    stats.hp = stats.hp.saturating_sub(overflow);
                }
            }

            let outcome = DamageOutcome {
                total_damage,
                final_armor: stats.armor,
                final_hp: stats.hp,
            };
            character.touch(now);
            outcome
        })
    }

    /// Regenerate mana on the selected character.
    pub fn advance_turn(&self, now: DateTime<Utc>) -> (Self, Option<TurnOutcome>) {
        self.map_selected(|character| {
            let stats = &mut character.current_stats;
            let regen = percentage_of(stats.max_mana, stats.mana_regeneration);
            // A buffed pool above the max is left alone rather than cut down.
            let new_mana = stats
                .max_mana
                .min(stats.mana.saturating_add(regen))
                .max(stats.mana);
            let mana_regained = new_mana - stats.mana;

            stats.mana = new_mana;
            character.touch(now);
            TurnOutcome { mana_regained }
        })
    }

    /// Set, raise or lower one live stat of the selected character.
    pub fn modify_stat(
        &self,
        modification: StatModification,
        now: DateTime<Utc>,
    ) -> (Self, Option<StatChange>) {
        self.map_selected(|character| {
            let stats = &mut character.current_stats;
            let kind = modification.stat;
            let old_value = stats.current(kind);
            let new_value = calculate_new_value(
                modification.operation,
                old_value,
                modification.amount,
                stats.max(kind),
                modification.is_percentage,
                modification.exceed_max,
            );

            stats.set_current(kind, new_value);
            character.touch(now);
            StatChange {
                stat: kind,
                old_value,
                new_value,
            }
        })
    }

    /// Restore the selected character's live stats from its baseline, fully refilled.
    pub fn reset(&self, now: DateTime<Utc>) -> (Self, Option<()>) {
        self.map_selected(|character| {
            character.current_stats = character.initial_stats.refilled();
            character.touch(now);
        })
    }

    /// Merge `patch` into the selected character's baseline.
    ///
    /// The live max fields follow the patch, but live current values are
    /// never reduced to fit them.
    pub fn update_initial_stats(
        &self,
        patch: &StatsPatch,
        limits: &StatLimits,
        now: DateTime<Utc>,
    ) -> (Self, Option<()>) {
        self.map_selected(|character| {
            character.initial_stats = character.initial_stats.patched(patch).sanitized(limits);

            let baseline = character.initial_stats;
            let current = &mut character.current_stats;
            if patch.max_hp.is_some() {
                current.max_hp = baseline.max_hp;
            }
            if patch.max_armor.is_some() {
                current.max_armor = baseline.max_armor;
            }
            if patch.max_mana.is_some() {
                current.max_mana = baseline.max_mana;
            }
            if patch.mana_regeneration.is_some() {
                current.mana_regeneration = baseline.mana_regeneration;
            }
            character.touch(now);
        })
    }

    /// Replace the selected character's resistances.
    pub fn update_resistances(
        &self,
        resistances: CharacterResistances,
        limits: &StatLimits,
        now: DateTime<Utc>,
    ) -> (Self, Option<()>) {
        self.map_selected(|character| {
            character.resistances = resistances.clamped(limits);
            character.touch(now);
        })
    }

    /// Overwrite (or re-insert) a character from a snapshot and select it.
    ///
    /// Nothing is recomputed; applying the same snapshot twice is a no-op.
    pub fn restore(&self, character: Character) -> Self {
        let id = character.id;
        let mut next = self.clone();

        match next.characters.iter_mut().find(|c| c.id == id) {
            Some(slot) => *slot = character,
            None => next.characters.push(character),
        }
        next.selected_character_id = Some(id);
        next
    }

    /// Like [`restore`](Self::restore), but a character missing from the
    /// roster is inserted at `index` (clamped to the end) instead of appended.
    pub fn restore_at(&self, character: Character, index: usize) -> Self {
        let id = character.id;
        let mut next = self.clone();

        match next.characters.iter_mut().find(|c| c.id == id) {
            Some(slot) => *slot = character,
            None => {
                let index = index.min(next.characters.len());
                next.characters.insert(index, character);
            }
        }
        next.selected_character_id = Some(id);
        next
    }

    fn map_character(&self, id: CharacterId, edit: impl FnOnce(&mut Character)) -> Self {
        let mut next = self.clone();
        if let Some(character) = next.characters.iter_mut().find(|c| c.id == id) {
            edit(character);
        }
        next
    }

    fn map_selected<T>(&self, edit: impl FnOnce(&mut Character) -> T) -> (Self, Option<T>) {
        let Some(id) = self.selected().map(|c| c.id) else {
            return (self.clone(), None);
        };

        let mut outcome = None;
        let next = self.map_character(id, |character| outcome = Some(edit(character)));
        (next, outcome)
    }
}
