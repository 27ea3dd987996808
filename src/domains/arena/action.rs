use serde::{Deserialize, Serialize};
use std::fmt::Display;
use tracing::{info, warn};

use crate::common::ActionError;

use super::agent::Agent;
use super::bomb::{Bomb, BombRegistry};
use super::grid::Grid;
use super::movement::{MoveOutcome, Terrain};
use super::position::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    Move,
    Bomb,
}

impl Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Move => write!(f, "MOVE"),
            Command::Bomb => write!(f, "BOMB"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAction {
    pub command: Command,
    pub target: Position,
    /// Free text after the coordinates, kept verbatim.
    pub message: String,
}

/// Why a BOMB request did not produce a bomb. Never disqualifying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BombRefusal {
    NoBombLeft,
    CellOccupied,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionReport {
    pub placed: Option<Bomb>,
    pub refused: Option<BombRefusal>,
    pub movement: MoveOutcome,
}

/// Parses `<COMMAND> <x> <y> [message...]`.
pub fn parse(raw: &str) -> Result<ParsedAction, ActionError> {
    let mut rest = raw.trim();
    if rest.is_empty() {
        return Err(ActionError::NoResponse);
    }

    let mut tokens = Vec::with_capacity(3);
    while tokens.len() < 3 && !rest.is_empty() {
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        tokens.push(&rest[..end]);
        rest = rest[end..].trim_start();
    }
    let &[command, x, y] = tokens.as_slice() else {
        return Err(ActionError::MissingTokens { raw: raw.to_string() });
    };

    let x = parse_coordinate(x)?;
    let y = parse_coordinate(y)?;
    let command = match command.to_ascii_uppercase().as_str() {
        "MOVE" => Command::Move,
        "BOMB" => Command::Bomb,
        _ => {
            return Err(ActionError::UnknownCommand {
                command: command.to_string(),
            })
        }
    };

    Ok(ParsedAction {
        command,
        target: Position::new(x, y),
        message: rest.to_string(),
    })
}

fn parse_coordinate(token: &str) -> Result<i32, ActionError> {
    token.parse().map_err(|_| ActionError::InvalidCoordinate {
        token: token.to_string(),
    })
}

/// Executes one agent response against the arena.
///
/// Any parse failure or out-of-bounds target disqualifies the agent before
/// anything else about it changes.
pub fn apply(
    grid: &Grid,
    bombs: &mut BombRegistry,
    agent: &mut Agent,
    raw: &str,
) -> Result<ActionReport, ActionError> {
    agent.last_action = raw.trim().to_string();

    let action = match parse(raw) {
        Ok(action) => action,
        Err(error) => {
            agent.disqualify();
            return Err(error);
        }
    };
    agent.message = action.message.clone();

    let target = action.target;
    if !grid.contains(target) {
        agent.disqualify();
        return Err(ActionError::OutOfBounds {
            x: target.x,
            y: target.y,
        });
    }

    let mut placed = None;
    let mut refused = None;
    if action.command == Command::Bomb {
        if agent.bombs_left == 0 {
            info!(agent = %agent.name, "wants to place a bomb but has none left");
            refused = Some(BombRefusal::NoBombLeft);
        } else if bombs.bomb_at(agent.position.x, agent.position.y).is_some() {
            warn!(agent = %agent.name, position = %agent.position, "cell already holds a bomb");
            refused = Some(BombRefusal::CellOccupied);
        } else {
            let bomb = Bomb::new(agent.id, agent.position, agent.bomb_range);
            bombs.place(bomb);
            agent.bombs_left -= 1;
            info!(agent = %agent.name, position = %agent.position, "places a bomb");
            placed = Some(bomb);
        }
    }

    let movement = Terrain::new(grid, bombs).resolve_move(agent, target);
    Ok(ActionReport {
        placed,
        refused,
        movement,
    })
}
