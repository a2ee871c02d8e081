//! Testing utilities for the character tracker.
//!
//! This module provides tools for integration testing:
//! - `ManualClock` for deterministic timestamps
//! - `TestHarness` for scripted tracker scenarios over an in-memory store
//! - Assertion helpers for verifying character state

use crate::character::{Character, StatKind};
use crate::clock::Clock;
use crate::config::TrackerConfig;
use crate::persist::{decode_roster, KeyValueStore, MemoryStore};
use crate::roster::RosterState;
use crate::tracker::CharacterTracker;
use chrono::{DateTime, Duration, Utc};
use std::cell::Cell;
use std::rc::Rc;

/// Seconds since the epoch that a fresh [`ManualClock`] starts at.
const MANUAL_CLOCK_START: i64 = 1_700_000_000;

/// A clock that only moves when told to.
///
/// Clones share the same reading, so a test can keep one handle while the
/// tracker owns another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    /// Move the clock by `secs` (negative moves it backwards).
    pub fn advance_secs(&self, secs: i64) {
        self.now.set(self.now.get() + Duration::seconds(secs));
    }

    pub fn set(&self, now: DateTime<Utc>) {
        self.now.set(now);
    }

    /// The current reading.
    pub fn current(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(DateTime::from_timestamp(MANUAL_CLOCK_START, 0).unwrap_or_default())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

/// Test harness for scripted tracker scenarios.
pub struct TestHarness {
    pub tracker: CharacterTracker,
    pub clock: ManualClock,
    pub store: MemoryStore,
}

impl TestHarness {
    /// An empty tracker over a fresh in-memory store.
    pub fn new() -> Self {
        Self::with_store(MemoryStore::new())
    }

    /// A tracker with one default character created and selected.
    pub fn with_character(name: &str) -> Self {
        let mut harness = Self::new();
        harness.tracker.create_character(name, None);
        harness
    }

    /// A tracker loading whatever `store` already holds.
    pub fn with_store(store: MemoryStore) -> Self {
        let clock = ManualClock::default();
        let tracker = CharacterTracker::with_clock(
            TrackerConfig::new(),
            Box::new(store.clone()),
            Box::new(clock.clone()),
        );

        Self {
            tracker,
            clock,
            store,
        }
    }

    /// Raw JSON in the roster slot, if anything was saved.
    pub fn persisted(&self) -> Option<String> {
        self.store.load(&self.tracker.config().storage_key)
    }

    /// The roster as it currently sits in storage.
    pub fn persisted_roster(&self) -> Option<RosterState> {
        decode_roster(&self.persisted()?).ok()
    }

    /// A second tracker over the same store, as after a restart.
    pub fn reopen(&self) -> TestHarness {
        Self::with_store(self.store.clone())
    }

    pub fn selected(&self) -> Option<&Character> {
        self.tracker.selected_character()
    }

    /// Current and max value of a stat on the selected character.
    pub fn stat(&self, kind: StatKind) -> Option<(u32, u32)> {
        let stats = self.selected()?.current_stats;
        Some((stats.current(kind), stats.max(kind)))
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Assertion helpers
// ============================================================================

/// Assert the selected character's current and max value for a stat.
#[track_caller]
pub fn assert_stat(harness: &TestHarness, kind: StatKind, current: u32, max: u32) {
    assert_eq!(
        harness.stat(kind),
        Some((current, max)),
        "{} mismatch",
        kind.label()
    );
}

/// Assert the selected character's name.
#[track_caller]
pub fn assert_selected(harness: &TestHarness, name: &str) {
    let selected = harness.selected().map(|c| c.name.as_str());
    assert_eq!(selected, Some(name), "Expected {name:?} to be selected");
}

/// Assert the undo and redo stack depths.
#[track_caller]
pub fn assert_stack_depths(harness: &TestHarness, undo: usize, redo: usize) {
    let history = harness.tracker.history();
    assert_eq!(
        (history.undo_depth(), history.redo_depth()),
        (undo, redo),
        "Expected {undo} undoable and {redo} redoable actions"
    );
}
