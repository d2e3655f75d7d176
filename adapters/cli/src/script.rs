//! Line-oriented input scripts.
//!
//! Every directive occupies one line. Blank lines and lines starting with `#`
//! are skipped.
//!
//! ```text
//! move 1 0
//! weapon bow
//! attack
//! wait 30
//! use potion
//! inventory
//! quit
//! ```

use maze_quest_core::{Command, ItemKind, Weapon};
use thiserror::Error;

/// One scripted step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Step {
    /// Runs one tick carrying the command.
    Input(Command),
    /// Runs the given number of ticks without input.
    Wait(u32),
}

/// Failure to parse a script line.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("script line {line}: {reason}")]
pub(crate) struct ScriptError {
    /// One-based line number.
    pub(crate) line: usize,
    /// What was wrong with the line.
    pub(crate) reason: String,
}

/// Parses a whole script.
pub(crate) fn parse(source: &str) -> Result<Vec<Step>, ScriptError> {
    source
        .lines()
        .enumerate()
        .filter_map(|(index, line)| {
            let line_number = index + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                return None;
            }
            Some(parse_line(trimmed).map_err(|reason| ScriptError {
                line: line_number,
                reason,
            }))
        })
        .collect()
}

fn parse_line(line: &str) -> Result<Step, String> {
    let mut words = line.split_whitespace();
    let directive = words.next().unwrap_or_default();
    let arguments: Vec<&str> = words.collect();

    let step = match (directive, arguments.as_slice()) {
        ("move", [dx, dy]) => Step::Input(Command::Move {
            dx: parse_offset(dx)?,
            dy: parse_offset(dy)?,
        }),
        ("attack", []) => Step::Input(Command::Attack),
        ("inventory", []) => Step::Input(Command::ToggleInventory),
        ("use", [item]) => Step::Input(Command::UseItem {
            item: parse_item(item)?,
        }),
        ("weapon", [weapon]) => Step::Input(Command::SelectWeapon {
            weapon: parse_weapon(weapon)?,
        }),
        ("wait", [ticks]) => Step::Wait(
            ticks
                .parse()
                .map_err(|_| format!("'{ticks}' is not a tick count"))?,
        ),
        ("quit", []) => Step::Input(Command::Quit),
        ("move" | "attack" | "inventory" | "use" | "weapon" | "wait" | "quit", _) => {
            return Err(format!("wrong number of arguments for '{directive}'"));
        }
        _ => return Err(format!("unknown directive '{directive}'")),
    };

    Ok(step)
}

fn parse_offset(value: &str) -> Result<i32, String> {
    value
        .parse()
        .map_err(|_| format!("'{value}' is not an offset"))
}

fn parse_item(value: &str) -> Result<ItemKind, String> {
    match value {
        "key" => Ok(ItemKind::Key),
        "bomb" => Ok(ItemKind::Bomb),
        "potion" => Ok(ItemKind::Potion),
        other => Err(format!("unknown item '{other}'")),
    }
}

fn parse_weapon(value: &str) -> Result<Weapon, String> {
    match value {
        "sword" => Ok(Weapon::Sword),
        "bow" => Ok(Weapon::Bow),
        "bomb" => Ok(Weapon::Bomb),
        other => Err(format!("unknown weapon '{other}'")),
    }
}
