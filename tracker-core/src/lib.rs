//! RPG character tracker engine.
//!
//! This crate provides:
//! - A roster of characters with hit points, armor, mana and resistances
//! - Combat actions (damage with armor soak, turn regeneration, stat edits)
//! - A history ledger of before/after snapshots with undo and redo
//! - Roster persistence to a key-value slot
//!
//! # Quick Start
//!
//! ```ignore
//! use tracker_core::{CharacterTracker, StatOperation, TrackerConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = TrackerConfig::from_env()?;
//!     let mut tracker = CharacterTracker::open(config);
//!
//!     tracker.create_character("Thorin", None);
//!     tracker.apply_damage(12, false, 2);
//!     tracker.modify_mana(StatOperation::Decrease, 25, true, false);
//!     tracker.undo();
//!
//!     for entry in tracker.history().entries() {
//!         println!("{}", entry.describe());
//!     }
//!     Ok(())
//! }
//! ```

pub mod character;
pub mod clock;
pub mod config;
pub mod history;
pub mod persist;
pub mod roster;
pub mod stats;
pub mod testing;
pub mod tracker;

// Primary public API
pub use tracker::CharacterTracker;

pub use character::{
    Character, CharacterId, CharacterResistances, CharacterStats, CharacterUpdate,
    ResistanceKind, StatKind, StatLimits, StatsPatch, DEFAULT_CHARACTER_NAME,
};
pub use clock::{Clock, MonotonicClock, SystemClock};
pub use config::{ConfigError, TrackerConfig};
pub use history::{
    ActionDetails, ActionId, ActionKind, CharacterAction, HistoryLedger, ModifyStatDetails,
};
pub use persist::{FileStore, KeyValueStore, MemoryStore, PersistError};
pub use roster::{DamageOutcome, RosterState, StatChange, StatModification, TurnOutcome};
pub use stats::StatOperation;
pub use testing::{ManualClock, TestHarness};
