//! Action history with undo/redo navigation.
//!
//! The [`HistoryLedger`] keeps every executed action in order. Two stacks of
//! positions into that ledger drive undo and redo. Recording a new action
//! clears the redo stack, so the timeline never branches.

use crate::character::{
    Character, CharacterId, CharacterResistances, CharacterStats, CharacterUpdate, StatKind,
};
use crate::stats::StatOperation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for ledger entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionId(pub Uuid);

impl ActionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ActionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The kinds of action that get recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    CreateCharacter,
    UpdateCharacter,
    DeleteCharacter,
    ApplyDamage,
    AdvanceTurn,
    ModifyHp,
    ModifyArmor,
    ModifyMana,
    ResetCharacter,
    UpdateInitialStats,
    UpdateResistances,
}

impl ActionKind {
    pub fn name(&self) -> &'static str {
        match self {
            ActionKind::CreateCharacter => "CREATE_CHARACTER",
            ActionKind::UpdateCharacter => "UPDATE_CHARACTER",
            ActionKind::DeleteCharacter => "DELETE_CHARACTER",
            ActionKind::ApplyDamage => "APPLY_DAMAGE",
            ActionKind::AdvanceTurn => "ADVANCE_TURN",
            ActionKind::ModifyHp => "MODIFY_HP",
            ActionKind::ModifyArmor => "MODIFY_ARMOR",
            ActionKind::ModifyMana => "MODIFY_MANA",
            ActionKind::ResetCharacter => "RESET_CHARACTER",
            ActionKind::UpdateInitialStats => "UPDATE_INITIAL_STATS",
            ActionKind::UpdateResistances => "UPDATE_RESISTANCES",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Details of a stat modification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifyStatDetails {
    pub stat_type: StatKind,
    pub operation: StatOperation,
    pub amount: u32,
    pub is_percentage: bool,
    pub exceed_max: bool,
    pub old_value: u32,
    pub new_value: u32,
}

/// Kind-specific payload of a ledger entry.
///
/// The entry's [`ActionKind`] is derived from the variant, so a kind and a
/// payload can never disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionDetails {
    CreateCharacter {
        name: String,
    },
    UpdateCharacter {
        changes: CharacterUpdate,
    },
    DeleteCharacter {
        name: String,
        /// Position the character held in the roster.
        index: usize,
    },
    #[serde(rename_all = "camelCase")]
    ApplyDamage {
        damage_amount: u32,
        true_damage: bool,
        repetitions: u32,
        final_armor: u32,
        final_hp: u32,
        total_damage: u32,
    },
    #[serde(rename_all = "camelCase")]
    AdvanceTurn {
        mana_regained: u32,
    },
    ModifyHp(ModifyStatDetails),
    ModifyArmor(ModifyStatDetails),
    ModifyMana(ModifyStatDetails),
    #[serde(rename_all = "camelCase")]
    ResetCharacter {
        /// Live stats as they were before the reset.
        changed_stats: CharacterStats,
    },
    #[serde(rename_all = "camelCase")]
    UpdateInitialStats {
        old_stats: CharacterStats,
        new_stats: CharacterStats,
    },
    #[serde(rename_all = "camelCase")]
    UpdateResistances {
        old_resistances: CharacterResistances,
        new_resistances: CharacterResistances,
    },
}

impl ActionDetails {
    /// Wrap stat modification details in the variant for their stat.
    pub fn modify_stat(details: ModifyStatDetails) -> Self {
        match details.stat_type {
            StatKind::Hp => ActionDetails::ModifyHp(details),
            StatKind::Armor => ActionDetails::ModifyArmor(details),
            StatKind::Mana => ActionDetails::ModifyMana(details),
        }
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            ActionDetails::CreateCharacter { .. } => ActionKind::CreateCharacter,
            ActionDetails::UpdateCharacter { .. } => ActionKind::UpdateCharacter,
            ActionDetails::DeleteCharacter { .. } => ActionKind::DeleteCharacter,
            ActionDetails::ApplyDamage { .. } => ActionKind::ApplyDamage,
            ActionDetails::AdvanceTurn { .. } => ActionKind::AdvanceTurn,
            ActionDetails::ModifyHp(_) => ActionKind::ModifyHp,
            ActionDetails::ModifyArmor(_) => ActionKind::ModifyArmor,
            ActionDetails::ModifyMana(_) => ActionKind::ModifyMana,
            ActionDetails::ResetCharacter { .. } => ActionKind::ResetCharacter,
            ActionDetails::UpdateInitialStats { .. } => ActionKind::UpdateInitialStats,
            ActionDetails::UpdateResistances { .. } => ActionKind::UpdateResistances,
        }
    }

    /// A one-line, human-readable summary.
    pub fn describe(&self) -> String {
        match self {
            ActionDetails::CreateCharacter { name } => format!("Character \"{name}\" was created"),
            ActionDetails::UpdateCharacter { changes } => match &changes.name {
                Some(name) => format!("Character details were updated (name: \"{name}\")"),
                None => "Character details were updated".to_string(),
            },
            ActionDetails::DeleteCharacter { name, .. } => {
                format!("Character \"{name}\" was deleted")
            }
            ActionDetails::ApplyDamage {
                damage_amount,
                true_damage,
                repetitions,
                final_armor,
                final_hp,
                total_damage,
            } => {
                let kind = if *true_damage { " true" } else { "" };
                format!(
                    "Dealt {total_damage}{kind} damage ({repetitions}x{damage_amount}). \
                     Armor: {final_armor}, HP: {final_hp}"
                )
            }
            ActionDetails::AdvanceTurn { mana_regained } => {
                format!("Advanced turn, regenerated {mana_regained} mana")
            }
            ActionDetails::ModifyHp(details)
            | ActionDetails::ModifyArmor(details)
            | ActionDetails::ModifyMana(details) => {
                let unit = if details.is_percentage { "%" } else { "" };
                format!(
                    "{} {} by {}{unit} ({} -> {})",
                    details.operation.verb(),
                    details.stat_type.label(),
                    details.amount,
                    details.old_value,
                    details.new_value
                )
            }
            ActionDetails::ResetCharacter { .. } => {
                "Character stats were reset to their initial values".to_string()
            }
            ActionDetails::UpdateInitialStats { .. } => "Initial stats were updated".to_string(),
            ActionDetails::UpdateResistances {
                old_resistances,
                new_resistances,
            } => {
                let changes: Vec<String> = old_resistances
                    .differences(new_resistances)
                    .into_iter()
                    .map(|(kind, old, new)| format!("{kind}: {old} -> {new}"))
                    .collect();
                if changes.is_empty() {
                    "Resistances were updated (no changes)".to_string()
                } else {
                    format!("Resistances updated: {}", changes.join(", "))
                }
            }
        }
    }
}

/// One executed action with the character as it was before and after.
///
/// `previous_state` is absent only when the action created the character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterAction {
    pub id: ActionId,
    pub timestamp: DateTime<Utc>,
    pub character_id: CharacterId,
    pub previous_state: Option<Character>,
    pub current_state: Character,
    pub details: ActionDetails,
}

impl CharacterAction {
    pub fn new(
        previous_state: Option<Character>,
        current_state: Character,
        details: ActionDetails,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ActionId::new(),
            timestamp,
            character_id: current_state.id,
            previous_state,
            current_state,
            details,
        }
    }

    pub fn kind(&self) -> ActionKind {
        self.details.kind()
    }

    pub fn describe(&self) -> String {
        self.details.describe()
    }
}

/// The full action record plus the undo and redo stacks.
#[derive(Debug, Clone, Default)]
pub struct HistoryLedger {
    entries: Vec<CharacterAction>,
    undo_stack: Vec<usize>,
    redo_stack: Vec<usize>,
}

impl HistoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an action and make it the next one to undo.
    ///
    /// Anything that was waiting to be redone is discarded.
    pub fn record(&mut self, entry: CharacterAction) -> &CharacterAction {
        let index = self.entries.len();
        self.entries.push(entry);
        self.undo_stack.push(index);
        self.redo_stack.clear();
        &self.entries[index]
    }

    /// Move the most recent undoable entry onto the redo stack and return it.
    pub fn undo(&mut self) -> Option<&CharacterAction> {
        let index = self.undo_stack.pop()?;
        self.redo_stack.push(index);
        self.entries.get(index)
    }

    /// Move the most recent redoable entry back onto the undo stack and return it.
    pub fn redo(&mut self) -> Option<&CharacterAction> {
        let index = self.redo_stack.pop()?;
        self.undo_stack.push(index);
        self.entries.get(index)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Every recorded action, oldest first.
    pub fn entries(&self) -> &[CharacterAction] {
        &self.entries
    }

    pub fn get(&self, id: ActionId) -> Option<&CharacterAction> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries that undo would revert, oldest first.
    pub fn undo_stack(&self) -> impl Iterator<Item = &CharacterAction> + '_ {
        self.undo_stack.iter().map(move |&index| &self.entries[index])
    }

    /// Entries that redo would reapply, oldest first.
    pub fn redo_stack(&self) -> impl Iterator<Item = &CharacterAction> + '_ {
        self.redo_stack.iter().map(move |&index| &self.entries[index])
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Actions that targeted one character, newest first.
    pub fn for_character(
        &self,
        id: CharacterId,
    ) -> impl Iterator<Item = &CharacterAction> + '_ {
        self.entries
            .iter()
            .rev()
            .filter(move |entry| entry.character_id == id)
    }
}
