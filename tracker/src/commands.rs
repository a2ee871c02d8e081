//! Parsing of headless protocol lines into commands.

use thiserror::Error;
use tracker_core::{
    CharacterId, ResistanceKind, StatKind, StatModification, StatOperation, StatsPatch,
};

/// How a command names a character: by its 1-based position in `#list` or by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Index(usize),
    Id(CharacterId),
}

/// A parsed protocol command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Create {
        name: Option<String>,
        stats: Option<StatsPatch>,
    },
    List,
    Select(Target),
    /// Delete a character; without a target, the selected one.
    Delete(Option<Target>),
    Rename(String),
    Damage {
        amount: u32,
        repetitions: u32,
        true_damage: bool,
    },
    Turn,
    Modify(StatModification),
    Reset,
    Initial(StatsPatch),
    Resist(Vec<(ResistanceKind, u32)>),
    Undo,
    Redo,
    History,
    Status,
    Help,
    Quit,
}

/// Errors from parsing a protocol line.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Commands start with '#'. Type #help for help.")]
    NotACommand,

    #[error("Unknown command #{0}. Type #help for help.")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("Not a valid amount: {0:?}")]
    InvalidNumber(String),

    #[error("Unknown operation {0:?} (expected set, inc or dec)")]
    UnknownOperation(String),

    #[error("Unknown field {0:?}")]
    UnknownField(String),
}

const CREATE_USAGE: &str = "#create <name> [maxHp maxArmor maxMana regen]";
const SELECT_USAGE: &str = "#select <index|id>";
const RENAME_USAGE: &str = "#rename <name>";
const DAMAGE_USAGE: &str = "#damage <amount> [xN] [true]";
const MODIFY_USAGE: &str = "#hp|#armor|#mana <set|inc|dec> <amount>[%] [over]";
const INITIAL_USAGE: &str = "#initial <hp|armor|mana|regen>=<value>...";
const RESIST_USAGE: &str = "#resist <resistance>=<value>...";

/// Parse one line of input.
pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let body = line.trim().strip_prefix('#').ok_or(CommandError::NotACommand)?;
    let mut parts = body.split_whitespace();
    let name = parts.next().unwrap_or_default().to_lowercase();
    let args: Vec<&str> = parts.collect();

    match name.as_str() {
        "create" | "new" => parse_create(&args),
        "list" | "ls" => Ok(Command::List),
        "select" => match args.as_slice() {
            [target] => Ok(Command::Select(parse_target(target)?)),
            _ => Err(CommandError::Usage(SELECT_USAGE)),
        },
        "delete" => match args.as_slice() {
            [] => Ok(Command::Delete(None)),
            [target] => Ok(Command::Delete(Some(parse_target(target)?))),
            _ => Err(CommandError::Usage("#delete [index|id]")),
        },
        "rename" => {
            if args.is_empty() {
                Err(CommandError::Usage(RENAME_USAGE))
            } else {
                Ok(Command::Rename(args.join(" ")))
            }
        }
        "damage" | "dmg" => parse_damage(&args),
        "turn" | "next" => Ok(Command::Turn),
        "hp" => parse_modify(StatKind::Hp, &args),
        "armor" => parse_modify(StatKind::Armor, &args),
        "mana" => parse_modify(StatKind::Mana, &args),
        "reset" => Ok(Command::Reset),
        "initial" => parse_initial(&args),
        "resist" => parse_resist(&args),
        "undo" => Ok(Command::Undo),
        "redo" => Ok(Command::Redo),
        "history" => Ok(Command::History),
        "status" => Ok(Command::Status),
        "help" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

fn parse_create(args: &[&str]) -> Result<Command, CommandError> {
    // Four trailing numbers are the starting maxima and regen.
    let split = args.len().saturating_sub(4);
    let numbers: Result<Vec<u32>, _> = args[split..].iter().map(|n| n.parse::<u32>()).collect();

    if let Ok(numbers) = numbers {
        if let [hp, armor, mana, regen] = numbers[..] {
            if split == 0 {
                return Err(CommandError::Usage(CREATE_USAGE));
            }
            let stats = StatsPatch::new()
                .with_max(StatKind::Hp, hp)
                .with_max(StatKind::Armor, armor)
                .with_max(StatKind::Mana, mana)
                .with_regeneration(regen);
            return Ok(Command::Create {
                name: Some(args[..split].join(" ")),
                stats: Some(stats),
            });
        }
    }

    Ok(Command::Create {
        name: (!args.is_empty()).then(|| args.join(" ")),
        stats: None,
    })
}

fn parse_target(raw: &str) -> Result<Target, CommandError> {
    if let Ok(index) = raw.parse::<usize>() {
        return if index == 0 {
            Err(CommandError::InvalidNumber(raw.to_string()))
        } else {
            Ok(Target::Index(index))
        };
    }
    CharacterId::parse(raw)
        .map(Target::Id)
        .ok_or(CommandError::Usage(SELECT_USAGE))
}

fn parse_damage(args: &[&str]) -> Result<Command, CommandError> {
    let (amount, rest) = args
        .split_first()
        .ok_or(CommandError::Usage(DAMAGE_USAGE))?;
    let amount = parse_amount(amount)?;

    let mut repetitions = 1;
    let mut true_damage = false;
    for arg in rest {
        let lower = arg.to_lowercase();
        if let Some(count) = lower.strip_prefix('x') {
            repetitions = parse_amount(count)?;
            if repetitions == 0 {
                return Err(CommandError::InvalidNumber(arg.to_string()));
            }
        } else if lower == "true" {
            true_damage = true;
        } else {
            return Err(CommandError::Usage(DAMAGE_USAGE));
        }
    }

    Ok(Command::Damage {
        amount,
        repetitions,
        true_damage,
    })
}

fn parse_modify(stat: StatKind, args: &[&str]) -> Result<Command, CommandError> {
    let (operation, amount, rest) = match args {
        [operation, amount, rest @ ..] => (*operation, *amount, rest),
        _ => return Err(CommandError::Usage(MODIFY_USAGE)),
    };

    let operation = parse_operation(operation)?;
    let (amount, is_percentage) = match amount.strip_suffix('%') {
        Some(number) => (parse_amount(number)?, true),
        None => (parse_amount(amount)?, false),
    };
    let exceed_max = match rest {
        [] => false,
        [flag] if flag.eq_ignore_ascii_case("over") => true,
        _ => return Err(CommandError::Usage(MODIFY_USAGE)),
    };

    Ok(Command::Modify(StatModification {
        stat,
        operation,
        amount,
        is_percentage,
        exceed_max,
    }))
}

fn parse_operation(raw: &str) -> Result<StatOperation, CommandError> {
    match raw.to_lowercase().as_str() {
        "set" | "=" => Ok(StatOperation::Set),
        "inc" | "increase" | "+" => Ok(StatOperation::Increase),
        "dec" | "decrease" | "-" => Ok(StatOperation::Decrease),
        _ => Err(CommandError::UnknownOperation(raw.to_string())),
    }
}

fn parse_initial(args: &[&str]) -> Result<Command, CommandError> {
    if args.is_empty() {
        return Err(CommandError::Usage(INITIAL_USAGE));
    }

    let mut patch = StatsPatch::new();
    for arg in args {
        let (field, value) = split_assignment(arg, INITIAL_USAGE)?;
        patch = match field.to_lowercase().as_str() {
            "hp" | "maxhp" => patch.with_max(StatKind::Hp, value),
            "armor" | "maxarmor" => patch.with_max(StatKind::Armor, value),
            "mana" | "maxmana" => patch.with_max(StatKind::Mana, value),
            "regen" | "manaregeneration" => patch.with_regeneration(value),
            _ => return Err(CommandError::UnknownField(field.to_string())),
        };
    }
    Ok(Command::Initial(patch))
}

fn parse_resist(args: &[&str]) -> Result<Command, CommandError> {
    if args.is_empty() {
        return Err(CommandError::Usage(RESIST_USAGE));
    }

    args.iter()
        .map(|arg| {
            let (field, value) = split_assignment(arg, RESIST_USAGE)?;
            let kind = ResistanceKind::from_name(field)
                .ok_or_else(|| CommandError::UnknownField(field.to_string()))?;
            Ok((kind, value))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Command::Resist)
}

fn split_assignment<'a>(
    arg: &'a str,
    usage: &'static str,
) -> Result<(&'a str, u32), CommandError> {
    let (field, value) = arg.split_once('=').ok_or(CommandError::Usage(usage))?;
    Ok((field, parse_amount(value)?))
}

fn parse_amount(raw: &str) -> Result<u32, CommandError> {
    raw.parse()
        .map_err(|_| CommandError::InvalidNumber(raw.to_string()))
}
