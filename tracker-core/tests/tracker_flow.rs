//! End-to-end tests of combat actions, history and undo/redo through the
//! public tracker API.

use tracker_core::testing::{assert_selected, assert_stack_depths, assert_stat};
use tracker_core::{
    ActionDetails, ActionKind, CharacterResistances, StatKind, StatModification, StatOperation,
    StatsPatch, TestHarness,
};

// =============================================================================
// COMBAT
// =============================================================================

#[test]
fn test_armor_absorbs_damage_it_can_cover() {
    let mut harness = TestHarness::with_character("Thorin");
    let entry = harness
        .tracker
        .apply_damage(15, false, 1)
        .expect("Damage should apply");

    assert_eq!(
        entry.details,
        ActionDetails::ApplyDamage {
            damage_amount: 15,
            true_damage: false,
            repetitions: 1,
            final_armor: 5,
            final_hp: 80,
            total_damage: 15,
        }
    );
    assert_stat(&harness, StatKind::Armor, 5, 20);
    assert_stat(&harness, StatKind::Hp, 80, 80);
}

#[test]
fn test_damage_overflows_armor_into_hp() {
    let mut harness = TestHarness::with_character("Thorin");
    harness
        .tracker
        .modify_armor(StatOperation::Set, 5, false, false);
    harness.tracker.apply_damage(8, false, 1);

    assert_stat(&harness, StatKind::Armor, 0, 20);
    assert_stat(&harness, StatKind::Hp, 77, 80);
}

#[test]
fn test_true_damage_ignores_armor_and_floors_at_zero() {
    let mut harness = TestHarness::with_character("Thorin");
    let entry = harness
        .tracker
        .apply_damage(30, true, 4)
        .expect("Damage should apply");

    assert_eq!(entry.describe(), "Dealt 120 true damage (4x30). Armor: 20, HP: 0");
    assert_stat(&harness, StatKind::Hp, 0, 80);
    assert!(harness.selected().unwrap().is_down());
}

#[test]
fn test_turn_regenerates_percentage_of_max() {
    let mut harness = TestHarness::with_character("Mira");
    harness
        .tracker
        .modify_mana(StatOperation::Set, 40, false, false);
    let entry = harness.tracker.advance_turn().expect("Turn should advance");

    assert_eq!(entry.details, ActionDetails::AdvanceTurn { mana_regained: 30 });
    assert_stat(&harness, StatKind::Mana, 70, 100);

    // Regeneration stops at the max
    harness.tracker.advance_turn();
    harness.tracker.advance_turn();
    assert_stat(&harness, StatKind::Mana, 100, 100);
}

#[test]
fn test_turn_keeps_buffed_mana() {
    let mut harness = TestHarness::with_character("Mira");
    harness
        .tracker
        .modify_mana(StatOperation::Increase, 50, false, true);
    assert_stat(&harness, StatKind::Mana, 150, 100);

    let entry = harness.tracker.advance_turn().expect("Turn should advance");
    assert_eq!(entry.details, ActionDetails::AdvanceTurn { mana_regained: 0 });
    assert_stat(&harness, StatKind::Mana, 150, 100);
}

#[test]
fn test_stat_modifications_clamp() {
    let mut harness = TestHarness::with_character("Thorin");

    harness.tracker.modify_hp(StatOperation::Increase, 50, false, false);
    assert_stat(&harness, StatKind::Hp, 80, 80);

    harness.tracker.modify_hp(StatOperation::Decrease, 25, true, false);
    assert_stat(&harness, StatKind::Hp, 60, 80);

    harness.tracker.modify_hp(StatOperation::Decrease, 500, false, false);
    assert_stat(&harness, StatKind::Hp, 0, 80);

    let overheal = StatModification::new(StatKind::Hp, StatOperation::Set, 150)
        .percentage()
        .exceeding_max();
    harness.tracker.modify_stat(overheal);
    assert_stat(&harness, StatKind::Hp, 120, 80);
}

#[test]
fn test_reset_is_idempotent() {
    let mut harness = TestHarness::with_character("Thorin");
    harness.tracker.apply_damage(40, false, 2);
    harness.tracker.modify_mana(StatOperation::Decrease, 90, false, false);

    harness.tracker.reset_character();
    let once = harness.selected().unwrap().current_stats;
    harness.tracker.reset_character();
    let twice = harness.selected().unwrap().current_stats;

    assert_eq!(once, twice);
    assert_eq!(once, harness.selected().unwrap().initial_stats);
}

#[test]
fn test_initial_stats_raise_live_maxima() {
    let mut harness = TestHarness::with_character("Thorin");
    harness.tracker.update_initial_stats(
        StatsPatch::new()
            .with_max(StatKind::Hp, 120)
            .with_regeneration(50),
    );

    let character = harness.selected().unwrap();
    assert_eq!(character.initial_stats.max_hp, 120);
    assert_eq!(character.current_stats.max_hp, 120);
    assert_eq!(character.current_stats.hp, 80);
    assert_eq!(character.current_stats.mana_regeneration, 50);

    harness.tracker.reset_character();
    assert_stat(&harness, StatKind::Hp, 120, 120);
}

#[test]
fn test_created_with_template_stats() {
    let mut harness = TestHarness::new();
    let template = StatsPatch::new()
        .with_max(StatKind::Hp, 150)
        .with_max(StatKind::Mana, 40);
    harness.tracker.create_character("Grok", Some(&template));

    assert_stat(&harness, StatKind::Hp, 150, 150);
    assert_stat(&harness, StatKind::Armor, 20, 20);
    assert_stat(&harness, StatKind::Mana, 40, 40);
}

#[test]
fn test_resistance_changes_are_described() {
    let mut harness = TestHarness::with_character("Thorin");
    let mut resistances = CharacterResistances::default();
    resistances.shock = 140;
    resistances.poison = 60;

    let entry = harness
        .tracker
        .update_resistances(resistances)
        .expect("Resistances should update");
    assert_eq!(
        entry.describe(),
        "Resistances updated: shock: 100 -> 140, poison: 100 -> 60"
    );
}

// =============================================================================
// ROSTER
// =============================================================================

#[test]
fn test_deleting_selected_falls_back_to_first() {
    let mut harness = TestHarness::new();
    harness.tracker.create_character("Aria", None);
    harness.tracker.create_character("Bram", None);
    let cora = harness
        .tracker
        .create_character("Cora", None)
        .expect("Create should succeed")
        .character_id;

    harness.tracker.delete_character(cora);
    assert_selected(&harness, "Aria");

    let ids: Vec<_> = harness.tracker.characters().iter().map(|c| c.id).collect();
    for id in ids {
        harness.tracker.delete_character(id);
    }
    assert!(harness.selected().is_none());
    assert!(harness.tracker.roster().selected_character_id.is_none());
}

#[test]
fn test_actions_target_only_selected_character() {
    let mut harness = TestHarness::new();
    let aria = harness
        .tracker
        .create_character("Aria", None)
        .expect("Create should succeed")
        .character_id;
    harness.tracker.create_character("Bram", None);

    harness.tracker.apply_damage(50, true, 1);
    assert_stat(&harness, StatKind::Hp, 30, 80);

    let untouched = harness.tracker.character(aria).unwrap();
    assert_eq!(untouched.current_stats.hp, 80);
}

// =============================================================================
// UNDO / REDO
// =============================================================================

#[test]
fn test_undo_redo_restores_snapshots() {
    let mut harness = TestHarness::with_character("Thorin");
    harness.tracker.apply_damage(25, false, 1);
    let after_damage = harness.selected().cloned();

    harness.tracker.advance_turn();
    harness.tracker.modify_armor(StatOperation::Set, 10, false, false);
    assert_stack_depths(&harness, 4, 0);

    harness.tracker.undo();
    harness.tracker.undo();
    assert_eq!(harness.selected().cloned(), after_damage);
    assert_stack_depths(&harness, 2, 2);

    harness.tracker.redo();
    harness.tracker.redo();
    assert_stat(&harness, StatKind::Armor, 10, 20);
    assert_stack_depths(&harness, 4, 0);
}

#[test]
fn test_new_action_after_undo_discards_redo() {
    let mut harness = TestHarness::with_character("Thorin");
    harness.tracker.apply_damage(5, false, 1);
    harness.tracker.undo();
    assert!(harness.tracker.can_redo());

    harness.tracker.apply_damage(7, false, 1);
    assert!(!harness.tracker.can_redo());
    assert!(harness.tracker.redo().is_none());
    assert_stat(&harness, StatKind::Armor, 13, 20);
}

#[test]
fn test_undo_all_the_way_back() {
    let mut harness = TestHarness::with_character("Thorin");
    harness.tracker.apply_damage(10, false, 3);
    harness.tracker.reset_character();
    harness.tracker.modify_hp(StatOperation::Decrease, 5, false, false);

    let mut undone = Vec::new();
    while let Some(entry) = harness.tracker.undo() {
        undone.push(entry.kind());
    }

    assert_eq!(
        undone,
        vec![
            ActionKind::ModifyHp,
            ActionKind::ResetCharacter,
            ActionKind::ApplyDamage,
            ActionKind::CreateCharacter,
        ]
    );
    // Creation has no earlier state, so the character stays at its defaults
    assert_selected(&harness, "Thorin");
    assert_stat(&harness, StatKind::Hp, 80, 80);
    assert_stat(&harness, StatKind::Armor, 20, 20);
    assert!(harness.tracker.undo().is_none());
}

#[test]
fn test_undo_restores_selection_of_target() {
    let mut harness = TestHarness::new();
    harness.tracker.create_character("Aria", None);
    harness.tracker.apply_damage(5, false, 1);
    harness.tracker.create_character("Bram", None);
    assert_selected(&harness, "Bram");

    // Undoing Bram's creation leaves the selection alone
    harness.tracker.undo();
    assert_selected(&harness, "Bram");

    // Undoing the damage restores and selects Aria
    harness.tracker.undo();
    assert_selected(&harness, "Aria");
    assert_stat(&harness, StatKind::Armor, 20, 20);
}

#[test]
fn test_undo_and_redo_of_delete() {
    let mut harness = TestHarness::new();
    harness.tracker.create_character("Aria", None);
    let bram = harness
        .tracker
        .create_character("Bram", None)
        .expect("Create should succeed")
        .character_id;
    harness.tracker.apply_damage(12, true, 1);
    harness.tracker.delete_character(bram);
    assert_eq!(harness.tracker.characters().len(), 1);

    harness.tracker.undo();
    assert_eq!(harness.tracker.characters().len(), 2);
    assert_selected(&harness, "Bram");
    assert_stat(&harness, StatKind::Hp, 68, 80);

    harness.tracker.redo();
    assert_eq!(harness.tracker.characters().len(), 1);
    assert!(harness.tracker.character(bram).is_none());
}

#[test]
fn test_undo_delete_restores_roster_order() {
    let mut harness = TestHarness::new();
    let aria = harness
        .tracker
        .create_character("Aria", None)
        .expect("Create should succeed")
        .character_id;
    harness.tracker.create_character("Bram", None);
    let cora = harness
        .tracker
        .create_character("Cora", None)
        .expect("Create should succeed")
        .character_id;
    let names = |harness: &TestHarness| -> Vec<String> {
        harness
            .tracker
            .characters()
            .iter()
            .map(|c| c.name.clone())
            .collect()
    };
    let before = names(&harness);

    harness.tracker.delete_character(aria);
    harness.tracker.undo();
    assert_eq!(names(&harness), before);
    assert_selected(&harness, "Aria");

    // Deleting the selection falls back to the first character, which is Aria again
    harness.tracker.select_character(cora);
    harness.tracker.delete_character(cora);
    assert_selected(&harness, "Aria");
}

#[test]
fn test_undo_rename() {
    let mut harness = TestHarness::with_character("Aria");
    let id = harness.selected().unwrap().id;
    harness
        .tracker
        .update_character(id, tracker_core::CharacterUpdate::rename("Aria Vane"));
    assert_selected(&harness, "Aria Vane");

    harness.tracker.undo();
    assert_selected(&harness, "Aria");
}

// =============================================================================
// HISTORY
// =============================================================================

#[test]
fn test_character_history_newest_first() {
    let mut harness = TestHarness::new();
    let aria = harness
        .tracker
        .create_character("Aria", None)
        .expect("Create should succeed")
        .character_id;
    harness.tracker.apply_damage(5, false, 1);
    harness.tracker.create_character("Bram", None);
    harness.tracker.advance_turn();

    let kinds: Vec<ActionKind> = harness
        .tracker
        .character_history(aria)
        .iter()
        .map(|e| e.kind())
        .collect();
    assert_eq!(kinds, vec![ActionKind::ApplyDamage, ActionKind::CreateCharacter]);
    assert_eq!(harness.tracker.history().len(), 4);
}

#[test]
fn test_history_survives_undo() {
    let mut harness = TestHarness::with_character("Aria");
    harness.tracker.apply_damage(5, false, 1);
    harness.tracker.undo();

    // The ledger keeps every recorded action even when undone
    assert_eq!(harness.tracker.history().len(), 2);
    assert_stack_depths(&harness, 1, 1);
}

#[test]
fn test_timestamps_advance_with_clock() {
    let mut harness = TestHarness::with_character("Aria");
    let created = harness.selected().unwrap().updated_at;

    harness.clock.advance_secs(6);
    harness.tracker.advance_turn();
    let updated = harness.selected().unwrap().updated_at;

    assert_eq!((updated - created).num_seconds(), 6);
    assert_eq!(harness.selected().unwrap().created_at, created);
}
