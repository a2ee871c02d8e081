//! Persistence tests: the roster survives restarts through the file store,
//! and bad storage never prevents startup.

use std::fs;
use tempfile::TempDir;
use tracker_core::{
    CharacterTracker, FileStore, KeyValueStore, MemoryStore, StatKind, StatOperation,
    TrackerConfig,
};

fn config_in(dir: &TempDir) -> TrackerConfig {
    TrackerConfig::new().with_data_dir(dir.path())
}

#[test]
fn test_roster_survives_restart() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    let saved = {
        let mut tracker = CharacterTracker::open(config_in(&temp_dir));
        tracker.create_character("Aria", None);
        tracker.create_character("Bram", None);
        tracker.apply_damage(30, false, 1);
        tracker.modify_mana(StatOperation::Decrease, 25, false, false);
        tracker.roster().clone()
    };
    assert!(temp_dir.path().join("storage.json").exists());

    let tracker = CharacterTracker::open(config_in(&temp_dir));
    assert_eq!(tracker.roster(), &saved);

    let bram = tracker.selected_character().expect("Bram should be selected");
    assert_eq!(bram.name, "Bram");
    assert_eq!(bram.current_stats.current(StatKind::Armor), 0);
    assert_eq!(bram.current_stats.current(StatKind::Hp), 70);
    assert_eq!(bram.current_stats.current(StatKind::Mana), 75);

    // History does not outlive the session
    assert!(!tracker.can_undo());
}

#[test]
fn test_undo_is_persisted() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    {
        let mut tracker = CharacterTracker::open(config_in(&temp_dir));
        tracker.create_character("Aria", None);
        tracker.apply_damage(50, true, 1);
        tracker.undo();
    }

    let tracker = CharacterTracker::open(config_in(&temp_dir));
    let aria = tracker.selected_character().expect("Aria should be selected");
    assert_eq!(aria.current_stats.hp, 80);
}

#[test]
fn test_selection_is_persisted() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    let aria = {
        let mut tracker = CharacterTracker::open(config_in(&temp_dir));
        let aria = tracker
            .create_character("Aria", None)
            .expect("Create should succeed")
            .character_id;
        tracker.create_character("Bram", None);
        tracker.select_character(aria);
        aria
    };

    let tracker = CharacterTracker::open(config_in(&temp_dir));
    assert_eq!(tracker.selected_character().map(|c| c.id), Some(aria));
}

#[test]
fn test_corrupt_storage_file_starts_empty() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = config_in(&temp_dir);
    fs::write(config.storage_file(), "{{{{ definitely not json").expect("Write should succeed");

    let mut tracker = CharacterTracker::open(config.clone());
    assert!(tracker.characters().is_empty());

    // The next change overwrites the bad file with a valid one
    tracker.create_character("Aria", None);
    let reopened = CharacterTracker::open(config);
    assert_eq!(reopened.characters().len(), 1);
}

#[test]
fn test_malformed_roster_slot_starts_empty() {
    let store = MemoryStore::with_slot("rpg-character-manager", r#"{"characters": "nope"}"#);
    let tracker = CharacterTracker::new(TrackerConfig::new(), Box::new(store));
    assert!(tracker.characters().is_empty());
    assert!(tracker.selected_character().is_none());
}

#[test]
fn test_storage_keys_are_independent() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    {
        let mut campaign_a = CharacterTracker::open(config_in(&temp_dir).with_storage_key("a"));
        campaign_a.create_character("Aria", None);
    }
    {
        let mut campaign_b = CharacterTracker::open(config_in(&temp_dir).with_storage_key("b"));
        assert!(campaign_b.characters().is_empty());
        campaign_b.create_character("Bram", None);
        campaign_b.create_character("Cora", None);
    }

    let store = FileStore::open(config_in(&temp_dir).storage_file());
    assert!(store.load("a").is_some());
    assert!(store.load("b").is_some());

    let campaign_a = CharacterTracker::open(config_in(&temp_dir).with_storage_key("a"));
    assert_eq!(campaign_a.characters().len(), 1);
}

#[test]
fn test_stored_slot_uses_camel_case_json() {
    let store = MemoryStore::new();
    let mut tracker = CharacterTracker::new(TrackerConfig::new(), Box::new(store.clone()));
    tracker.create_character("Aria", None);

    let raw = store
        .load("rpg-character-manager")
        .expect("Roster should be saved");
    let json: serde_json::Value = serde_json::from_str(&raw).expect("Slot should be JSON");

    let character = &json["characters"][0];
    assert_eq!(character["name"], "Aria");
    assert_eq!(character["currentStats"]["maxHp"], 80);
    assert_eq!(character["currentStats"]["manaRegeneration"], 30);
    assert_eq!(character["resistances"]["blindness"], 100);
    assert_eq!(json["selectedCharacterId"], character["id"]);
}
