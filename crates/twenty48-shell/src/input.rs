use std::str::FromStr;

use anyhow::{Result, anyhow};
use twenty48_core::Direction;

/// One player action read from the keyboard or a script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Move(Direction),
    Restart,
    Quit,
}

impl Command {
    /// Single-key bindings: WASD, vi-style hjkl, `r` restart, `q` quit.
    pub fn from_key(key: char) -> Option<Self> {
        let cmd = match key.to_ascii_lowercase() {
            'w' | 'k' => Command::Move(Direction::Up),
            's' | 'j' => Command::Move(Direction::Down),
            'a' | 'h' => Command::Move(Direction::Left),
            'd' | 'l' => Command::Move(Direction::Right),
            'r' => Command::Restart,
            'q' => Command::Quit,
            _ => return None,
        };
        Some(cmd)
    }
}

impl FromStr for Command {
    type Err = anyhow::Error;

    /// Whole-word commands: direction names, `arrowup`-style key names,
    /// `restart`, `quit`/`exit`, or a single bound key.
    fn from_str(s: &str) -> Result<Self> {
        let word = s.trim().to_ascii_lowercase();
        let mut chars = word.chars();
        if let (Some(key), None) = (chars.next(), chars.next()) {
            return Command::from_key(key).ok_or_else(|| anyhow!("unbound key '{key}'"));
        }
        match word.as_str() {
            "restart" | "new" => Ok(Command::Restart),
            "quit" | "exit" => Ok(Command::Quit),
            other => {
                let name = other.strip_prefix("arrow").unwrap_or(other);
                name.parse::<Direction>().map(Command::Move)
            }
        }
    }
}

/// Parse a line of input into commands.
///
/// Each whitespace-separated token is a whole-word command or, failing
/// that, a run of single keys (`"wwad"` is four moves).
pub fn parse_line(line: &str) -> Result<Vec<Command>> {
    let mut commands = Vec::new();
    for token in line.split_whitespace() {
        if let Ok(cmd) = token.parse::<Command>() {
            commands.push(cmd);
            continue;
        }
        for key in token.chars() {
            let cmd = Command::from_key(key)
                .ok_or_else(|| anyhow!("unrecognized input '{token}' (bad key '{key}')"))?;
            commands.push(cmd);
        }
    }
    Ok(commands)
}
