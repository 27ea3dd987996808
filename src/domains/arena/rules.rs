//! Fixed rules of the arena. None of these are configurable.

use super::position::Position;
use std::time::Duration;

pub const WIDTH: i32 = 13;
pub const HEIGHT: i32 = 11;
pub const MAX_TURNS: u32 = 200;

pub const BOMB_LIFETIME: u32 = 8;
pub const BOMB_RANGE: u32 = 3;
pub const INITIAL_BOMBS: u32 = 1;

pub const MIN_AGENTS: usize = 2;
pub const MAX_AGENTS: usize = 4;

/// Response budget for the very first turn.
pub const FIRST_TURN_TIMEOUT: Duration = Duration::from_millis(1000);
/// Response budget for every later turn.
pub const TURN_TIMEOUT: Duration = Duration::from_millis(100);

/// Start corners, assigned to agents in id order.
pub const START_POSITIONS: [Position; MAX_AGENTS] = [
    Position::new(0, 0),
    Position::new(WIDTH - 1, HEIGHT - 1),
    Position::new(WIDTH - 1, 0),
    Position::new(0, HEIGHT - 1),
];
