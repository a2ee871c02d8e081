//! Headless mode for the character tracker.
//!
//! A simple line-oriented protocol for driving the tracker from a terminal,
//! a script or another program:
//! - Every input line is a `#command`
//! - Output lines are tagged (`[ACTION]`, `[UNDO]`, `[STATUS]`, `[ERROR]`, ...)

use crate::commands::{parse_command, Command, Target};
use std::io::{self, BufRead, Write};
use tracker_core::{
    CharacterAction, CharacterId, CharacterTracker, CharacterUpdate, ResistanceKind, StatKind,
    DEFAULT_CHARACTER_NAME,
};

const HELP: &[&str] = &[
    "  #create <name> [maxHp maxArmor maxMana regen] - Create and select a character",
    "  #list                     - List characters",
    "  #select <index|id>        - Select a character",
    "  #delete [index|id]        - Delete a character (default: selected)",
    "  #rename <name>            - Rename the selected character",
    "  #damage <amount> [xN] [true] - Deal damage N times (true damage skips armor)",
    "  #turn                     - Advance a turn (regenerate mana)",
    "  #hp|#armor|#mana <set|inc|dec> <amount>[%] [over] - Modify a stat",
    "  #reset                    - Restore stats to their initial values",
    "  #initial <hp|armor|mana|regen>=<value>... - Change initial stats",
    "  #resist <resistance>=<value>... - Change resistances",
    "  #undo / #redo             - Undo or redo the last action",
    "  #history                  - Show the selected character's history",
    "  #status                   - Show the selected character",
    "  #help                     - Show this help",
    "  #quit                     - Exit",
];

/// Run the protocol on stdin/stdout until `#quit` or end of input.
pub fn run_headless(tracker: &mut CharacterTracker) -> io::Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    run_session(tracker, stdin.lock(), stdout.lock())
}

/// Run the protocol over arbitrary input and output.
pub fn run_session<R: BufRead, W: Write>(
    tracker: &mut CharacterTracker,
    input: R,
    mut out: W,
) -> io::Result<()> {
    writeln!(out, "=== Character Tracker ===")?;
    writeln!(out, "Characters: {}", tracker.characters().len())?;
    if let Some(character) = tracker.selected_character() {
        writeln!(out, "Selected: {}", character.name)?;
    }
    writeln!(out, "Type #help for commands.")?;
    writeln!(out)?;
    out.flush()?;

    for line in input.lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                tracing::error!("Error reading input: {}", e);
                break;
            }
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match parse_command(line) {
            Ok(Command::Quit) => {
                writeln!(out, "Goodbye!")?;
                break;
            }
            Ok(command) => execute(tracker, command, &mut out)?,
            Err(e) => writeln!(out, "[ERROR] {e}")?,
        }
        out.flush()?;
    }

    Ok(())
}

fn execute<W: Write>(
    tracker: &mut CharacterTracker,
    command: Command,
    out: &mut W,
) -> io::Result<()> {
    match command {
        Command::Create { name, stats } => {
            let name = name.unwrap_or_else(|| DEFAULT_CHARACTER_NAME.to_string());
            let entry = tracker.create_character(name, stats.as_ref());
            report_action(out, entry)
        }
        Command::List => list(tracker, out),
        Command::Select(target) => match resolve(tracker, target) {
            Some(id) => {
                tracker.select_character(id);
                match tracker.character(id) {
                    Some(character) => writeln!(out, "[SELECTED] {}", character.name),
                    None => writeln!(out, "[ERROR] No such character"),
                }
            }
            None => writeln!(out, "[ERROR] No such character"),
        },
        Command::Delete(target) => {
            let id = match target {
                Some(target) => resolve(tracker, target),
                None => tracker.selected_character().map(|c| c.id),
            };
            match id {
                Some(id) => {
                    let entry = tracker.delete_character(id);
                    report_action(out, entry)
                }
                None => writeln!(out, "[ERROR] No such character"),
            }
        }
        Command::Rename(name) => match tracker.selected_character().map(|c| c.id) {
            Some(id) => {
                let entry = tracker.update_character(id, CharacterUpdate::rename(name));
                report_action(out, entry)
            }
            None => no_selection(out),
        },
        Command::Damage {
            amount,
            repetitions,
            true_damage,
        } => {
            let entry = tracker.apply_damage(amount, true_damage, repetitions);
            report_action(out, entry)
        }
        Command::Turn => {
            let entry = tracker.advance_turn();
            report_action(out, entry)
        }
        Command::Modify(modification) => {
            let entry = tracker.modify_stat(modification);
            report_action(out, entry)
        }
        Command::Reset => {
            let entry = tracker.reset_character();
            report_action(out, entry)
        }
        Command::Initial(patch) => {
            let entry = tracker.update_initial_stats(patch);
            report_action(out, entry)
        }
        Command::Resist(changes) => {
            let Some(mut resistances) = tracker.selected_character().map(|c| c.resistances)
            else {
                return no_selection(out);
            };
            for (kind, value) in changes {
                resistances.set(kind, value);
            }
            let entry = tracker.update_resistances(resistances);
            report_action(out, entry)
        }
        Command::Undo => match tracker.undo() {
            Some(entry) => writeln!(out, "[UNDO] {}", entry.describe()),
            None => writeln!(out, "[INFO] Nothing to undo"),
        },
        Command::Redo => match tracker.redo() {
            Some(entry) => writeln!(out, "[REDO] {}", entry.describe()),
            None => writeln!(out, "[INFO] Nothing to redo"),
        },
        Command::History => history(tracker, out),
        Command::Status => status(tracker, out),
        Command::Help => {
            writeln!(out, "[HELP]")?;
            for line in HELP {
                writeln!(out, "{line}")?;
            }
            Ok(())
        }
        // Handled by the session loop
        Command::Quit => Ok(()),
    }
}

/// Map a target to a character id present in the roster.
fn resolve(tracker: &CharacterTracker, target: Target) -> Option<CharacterId> {
    match target {
        Target::Index(index) => tracker
            .characters()
            .get(index.checked_sub(1)?)
            .map(|c| c.id),
        Target::Id(id) => tracker.character(id).map(|c| c.id),
    }
}

fn report_action<W: Write>(out: &mut W, entry: Option<&CharacterAction>) -> io::Result<()> {
    match entry {
        Some(entry) => {
            writeln!(out, "[ACTION] {}", entry.describe())?;
            let stats = entry.current_state.current_stats;
            writeln!(
                out,
                "[STATUS] {} HP: {}/{}, Armor: {}/{}, Mana: {}/{}",
                entry.current_state.name,
                stats.hp,
                stats.max_hp,
                stats.armor,
                stats.max_armor,
                stats.mana,
                stats.max_mana
            )
        }
        None => no_selection(out),
    }
}

fn no_selection<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "[ERROR] No character selected")
}

fn list<W: Write>(tracker: &CharacterTracker, out: &mut W) -> io::Result<()> {
    if tracker.characters().is_empty() {
        return writeln!(out, "[LIST] No characters");
    }

    let selected = tracker.selected_character().map(|c| c.id);
    writeln!(out, "[LIST]")?;
    for (i, character) in tracker.characters().iter().enumerate() {
        let marker = if Some(character.id) == selected { "*" } else { " " };
        let stats = character.current_stats;
        writeln!(
            out,
            " {marker}{}. {} (HP {}/{}) {}",
            i + 1,
            character.name,
            stats.hp,
            stats.max_hp,
            character.id
        )?;
    }
    Ok(())
}

fn status<W: Write>(tracker: &CharacterTracker, out: &mut W) -> io::Result<()> {
    let Some(character) = tracker.selected_character() else {
        return no_selection(out);
    };

    let stats = character.current_stats;
    writeln!(out, "[STATUS]")?;
    writeln!(out, "  Character: {}", character.name)?;
    for kind in StatKind::all() {
        writeln!(out, "  {}: {}/{}", kind.label(), stats.current(kind), stats.max(kind))?;
    }
    writeln!(out, "  Mana Regeneration: {}%", stats.mana_regeneration)?;
    if character.is_down() {
        writeln!(out, "  Down: yes")?;
    }

    let resistances: Vec<String> = ResistanceKind::all()
        .into_iter()
        .map(|kind| format!("{kind} {}", character.resistances.get(kind)))
        .collect();
    writeln!(out, "  Resistances: {}", resistances.join(", "))?;
    writeln!(
        out,
        "  Undo: {}, Redo: {}",
        tracker.history().undo_depth(),
        tracker.history().redo_depth()
    )
}

fn history<W: Write>(tracker: &CharacterTracker, out: &mut W) -> io::Result<()> {
    let Some(character) = tracker.selected_character() else {
        return no_selection(out);
    };

    let entries = tracker.character_history(character.id);
    if entries.is_empty() {
        return writeln!(out, "[HISTORY] No actions yet");
    }

    writeln!(out, "[HISTORY] {}", character.name)?;
    for entry in entries {
        writeln!(
            out,
            "  {} {:<20} {}",
            entry.timestamp.format("%H:%M:%S"),
            entry.kind().name(),
            entry.describe()
        )?;
    }
    Ok(())
}
