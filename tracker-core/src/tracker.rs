//! CharacterTracker - the primary public API.
//!
//! The tracker owns the roster, the action history, the clock and the
//! storage slot. Every user action goes through it:
//!
//! 1. snapshot the character before the action,
//! 2. run the roster transition,
//! 3. snapshot the character after it,
//! 4. record both snapshots in the history ledger,
//! 5. persist the roster.
//!
//! Undo and redo restore those snapshots wholesale; no action needs an
//! inverse.
//!
//! # Example
//!
//! ```
//! use tracker_core::{CharacterTracker, MemoryStore, TrackerConfig};
//!
//! let mut tracker = CharacterTracker::new(TrackerConfig::new(), Box::new(MemoryStore::new()));
//! tracker.create_character("Thorin", None);
//! tracker.apply_damage(8, false, 1);
//! assert_eq!(tracker.selected_character().map(|c| c.current_stats.armor), Some(12));
//!
//! tracker.undo();
//! assert_eq!(tracker.selected_character().map(|c| c.current_stats.armor), Some(20));
//! ```

use crate::character::{
    Character, CharacterId, CharacterResistances, CharacterUpdate, StatKind, StatsPatch,
};
use crate::clock::{Clock, MonotonicClock, SystemClock};
use crate::config::TrackerConfig;
use crate::history::{ActionDetails, ActionKind, CharacterAction, HistoryLedger, ModifyStatDetails};
use crate::persist::{load_roster, save_roster, FileStore, KeyValueStore};
use crate::roster::{RosterState, StatModification};
use crate::stats::StatOperation;
use chrono::{DateTime, Utc};

/// Tracks a roster of characters and the history of actions applied to them.
pub struct CharacterTracker {
    config: TrackerConfig,
    roster: RosterState,
    history: HistoryLedger,
    store: Box<dyn KeyValueStore>,
    clock: Box<dyn Clock>,
}

impl CharacterTracker {
    /// Create a tracker backed by `store`, loading any roster already saved there.
    pub fn new(config: TrackerConfig, store: Box<dyn KeyValueStore>) -> Self {
        Self::with_clock(config, store, Box::new(MonotonicClock::new(SystemClock)))
    }

    /// Create a tracker with an explicit clock.
    pub fn with_clock(
        config: TrackerConfig,
        store: Box<dyn KeyValueStore>,
        clock: Box<dyn Clock>,
    ) -> Self {
        let roster = load_roster(store.as_ref(), &config.storage_key);

        Self {
            config,
            roster,
            history: HistoryLedger::new(),
            store,
            clock,
        }
    }

    /// Create a tracker backed by the file store in the configured data directory.
    pub fn open(config: TrackerConfig) -> Self {
        let store = FileStore::open(config.storage_file());
        Self::new(config, Box::new(store))
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn roster(&self) -> &RosterState {
        &self.roster
    }

    pub fn characters(&self) -> &[Character] {
        &self.roster.characters
    }

    pub fn character(&self, id: CharacterId) -> Option<&Character> {
        self.roster.get(id)
    }

    pub fn selected_character(&self) -> Option<&Character> {
        self.roster.selected()
    }

    pub fn history(&self) -> &HistoryLedger {
        &self.history
    }

    /// Actions recorded for one character, newest first.
    pub fn character_history(&self, id: CharacterId) -> Vec<&CharacterAction> {
        self.history.for_character(id).collect()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ========================================================================
    // Roster management
    // ========================================================================

    /// Create a character from defaults (overlaid with `initial_stats`) and select it.
    pub fn create_character(
        &mut self,
        name: impl Into<String>,
        initial_stats: Option<&StatsPatch>,
    ) -> Option<&CharacterAction> {
        let name = name.into();
        let now = self.clock.now();
        let (next, id) = self
            .roster
            .create(name.clone(), initial_stats, &self.config.limits, now);
        let current = next.get(id)?.clone();

        self.commit(next);
        Some(self.record(None, current, ActionDetails::CreateCharacter { name }, now))
    }

    /// Select a character. Selection is not an action and is not recorded.
    pub fn select_character(&mut self, id: CharacterId) {
        let next = self.roster.select(id);
        self.commit(next);
    }

    /// Apply a partial edit to any character. An empty edit records nothing.
    pub fn update_character(
        &mut self,
        id: CharacterId,
        changes: CharacterUpdate,
    ) -> Option<&CharacterAction> {
        if changes.is_empty() {
            return None;
        }
        let previous = self.roster.get(id)?.clone();
        let now = self.clock.now();
        let next = self.roster.update(id, &changes, &self.config.limits, now);
        let current = next.get(id)?.clone();

        self.commit(next);
        Some(self.record(
            Some(previous),
            current,
            ActionDetails::UpdateCharacter { changes },
            now,
        ))
    }

    /// Delete a character.
    ///
    /// The entry keeps the deleted character as both snapshots so undo can
    /// bring it back.
    pub fn delete_character(&mut self, id: CharacterId) -> Option<&CharacterAction> {
        let deleted = self.roster.get(id)?.clone();
        let index = self.roster.position_of(id)?;
        let now = self.clock.now();
        let next = self.roster.delete(id);

        self.commit(next);
        let name = deleted.name.clone();
        Some(self.record(
            Some(deleted.clone()),
            deleted,
            ActionDetails::DeleteCharacter { name, index },
            now,
        ))
    }

    // ========================================================================
    // Actions on the selected character
    // ========================================================================

    /// Hit the selected character `repetitions` times for `damage_amount`.
    pub fn apply_damage(
        &mut self,
        damage_amount: u32,
        true_damage: bool,
        repetitions: u32,
    ) -> Option<&CharacterAction> {
        self.execute_on_selected(
            |roster, now| roster.apply_damage(damage_amount, true_damage, repetitions, now),
            |_, _, outcome| ActionDetails::ApplyDamage {
                damage_amount,
                true_damage,
                repetitions,
                final_armor: outcome.final_armor,
                final_hp: outcome.final_hp,
                total_damage: outcome.total_damage,
            },
        )
    }

    /// Regenerate the selected character's mana for one turn.
    pub fn advance_turn(&mut self) -> Option<&CharacterAction> {
        self.execute_on_selected(
            |roster, now| roster.advance_turn(now),
            |_, _, outcome| ActionDetails::AdvanceTurn {
                mana_regained: outcome.mana_regained,
            },
        )
    }

    /// Set, raise or lower one live stat of the selected character.
    pub fn modify_stat(&mut self, modification: StatModification) -> Option<&CharacterAction> {
        self.execute_on_selected(
            |roster, now| roster.modify_stat(modification, now),
            |_, _, change| {
                ActionDetails::modify_stat(ModifyStatDetails {
                    stat_type: change.stat,
                    operation: modification.operation,
                    amount: modification.amount,
                    is_percentage: modification.is_percentage,
                    exceed_max: modification.exceed_max,
                    old_value: change.old_value,
                    new_value: change.new_value,
                })
            },
        )
    }

    pub fn modify_hp(
        &mut self,
        operation: StatOperation,
        amount: u32,
        is_percentage: bool,
        exceed_max: bool,
    ) -> Option<&CharacterAction> {
        self.modify_stat(StatModification {
            stat: StatKind::Hp,
            operation,
            amount,
            is_percentage,
            exceed_max,
        })
    }

    pub fn modify_armor(
        &mut self,
        operation: StatOperation,
        amount: u32,
        is_percentage: bool,
        exceed_max: bool,
    ) -> Option<&CharacterAction> {
        self.modify_stat(StatModification {
            stat: StatKind::Armor,
            operation,
            amount,
            is_percentage,
            exceed_max,
        })
    }

    pub fn modify_mana(
        &mut self,
        operation: StatOperation,
        amount: u32,
        is_percentage: bool,
        exceed_max: bool,
    ) -> Option<&CharacterAction> {
        self.modify_stat(StatModification {
            stat: StatKind::Mana,
            operation,
            amount,
            is_percentage,
            exceed_max,
        })
    }

    /// Restore the selected character's live stats from its baseline.
    pub fn reset_character(&mut self) -> Option<&CharacterAction> {
        self.execute_on_selected(
            |roster, now| roster.reset(now),
            |previous, _, ()| ActionDetails::ResetCharacter {
                changed_stats: previous.current_stats,
            },
        )
    }

    /// Merge `patch` into the selected character's baseline stats. An empty
    /// patch records nothing.
    pub fn update_initial_stats(&mut self, patch: StatsPatch) -> Option<&CharacterAction> {
        if patch.is_empty() {
            return None;
        }
        let limits = self.config.limits;
        self.execute_on_selected(
            |roster, now| roster.update_initial_stats(&patch, &limits, now),
            |previous, current, ()| ActionDetails::UpdateInitialStats {
                old_stats: previous.initial_stats,
                new_stats: current.initial_stats,
            },
        )
    }

    /// Replace the selected character's resistances.
    pub fn update_resistances(
        &mut self,
        resistances: CharacterResistances,
    ) -> Option<&CharacterAction> {
        let limits = self.config.limits;
        self.execute_on_selected(
            |roster, now| roster.update_resistances(resistances, &limits, now),
            |previous, current, ()| ActionDetails::UpdateResistances {
                old_resistances: previous.resistances,
                new_resistances: current.resistances,
            },
        )
    }

    // ========================================================================
    // Undo / redo
    // ========================================================================

    /// Revert the most recent action.
    ///
    /// Reverting a creation leaves the roster alone, since there is no
    /// earlier state of that character to restore. The entry still moves to
    /// the redo stack, so the history pointer advances even though the
    /// roster does not change. A deleted character goes back to the
    /// position it held.
    pub fn undo(&mut self) -> Option<&CharacterAction> {
        let (id, kind, snapshot, deleted_at) = {
            let entry = self.history.undo()?;
            let deleted_at = match entry.details {
                ActionDetails::DeleteCharacter { index, .. } => Some(index),
                _ => None,
            };
            (entry.id, entry.kind(), entry.previous_state.clone(), deleted_at)
        };
        tracing::debug!("Undo {} ({})", kind, id);

        match (snapshot, deleted_at) {
            (Some(character), Some(index)) => {
                let next = self.roster.restore_at(character, index);
                self.commit(next);
            }
            (Some(character), None) => {
                let next = self.roster.restore(character);
                self.commit(next);
            }
            (None, _) => tracing::debug!("Nothing to restore for {}", kind),
        }

        self.history.get(id)
    }

    /// Reapply the most recently undone action.
    pub fn redo(&mut self) -> Option<&CharacterAction> {
        let (id, kind, character_id, snapshot) = {
            let entry = self.history.redo()?;
            (
                entry.id,
                entry.kind(),
                entry.character_id,
                entry.current_state.clone(),
            )
        };
        tracing::debug!("Redo {} ({})", kind, id);

        let next = match kind {
            ActionKind::DeleteCharacter => self.roster.delete(character_id),
            _ => self.roster.restore(snapshot),
        };
        self.commit(next);

        self.history.get(id)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Run a transition on the selected character and record it.
    ///
    /// `details` receives the before and after snapshots plus the
    /// transition's outcome.
    fn execute_on_selected<T>(
        &mut self,
        transition: impl FnOnce(&RosterState, DateTime<Utc>) -> (RosterState, Option<T>),
        details: impl FnOnce(&Character, &Character, T) -> ActionDetails,
    ) -> Option<&CharacterAction> {
        let previous = self.roster.selected()?.clone();
        let now = self.clock.now();
        let (next, outcome) = transition(&self.roster, now);
        let outcome = outcome?;
        let current = next.get(previous.id)?.clone();
        let details = details(&previous, &current, outcome);

        self.commit(next);
        Some(self.record(Some(previous), current, details, now))
    }

    fn record(
        &mut self,
        previous: Option<Character>,
        current: Character,
        details: ActionDetails,
        now: DateTime<Utc>,
    ) -> &CharacterAction {
        let entry = CharacterAction::new(previous, current, details, now);
        tracing::debug!(
            "Recorded {} for {} ({})",
            entry.kind(),
            entry.current_state.name,
            entry.character_id
        );
        self.history.record(entry)
    }

    /// Swap in the next roster state and persist it if anything changed.
    fn commit(&mut self, next: RosterState) {
        if next == self.roster {
            return;
        }
        self.roster = next;
        self.persist();
    }

    fn persist(&self) {
        if let Err(e) = save_roster(self.store.as_ref(), &self.config.storage_key, &self.roster) {
            tracing::error!("Failed to persist roster: {}", e);
        }
    }
}
