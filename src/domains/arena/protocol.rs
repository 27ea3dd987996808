//! Text protocol spoken with agent processes.
//!
//! Prelude, sent once: `<width> <height> <agent_id>`.
//!
//! Turn state: one line per grid row, then the entity count, then one line
//! per entity `<type> <owner_or_id> <x> <y> <param1> <param2>`. Agents
//! (type 0) carry bombs left and bomb range, bombs (type 1) carry timer and
//! range. Agents are listed before bombs.

use super::agent::{Agent, AgentId};
use super::bomb::{Bomb, BombRegistry};
use super::grid::Grid;

pub const AGENT_ENTITY: u8 = 0;
pub const BOMB_ENTITY: u8 = 1;

pub fn prelude(grid: &Grid, agent_id: AgentId) -> String {
    format!("{} {} {}", grid.width(), grid.height(), agent_id)
}

pub fn agent_line(agent: &Agent) -> String {
    format!(
        "{} {} {} {} {} {}",
        AGENT_ENTITY, agent.id, agent.position.x, agent.position.y, agent.bombs_left, agent.bomb_range
    )
}

pub fn bomb_line(bomb: &Bomb) -> String {
    format!(
        "{} {} {} {} {} {}",
        BOMB_ENTITY, bomb.owner_id, bomb.position.x, bomb.position.y, bomb.timer, bomb.range
    )
}

/// Serializes a turn state without a trailing newline.
pub fn turn_state(grid: &Grid, agents: &[Agent], bombs: &BombRegistry) -> String {
    let entities: Vec<String> = agents
        .iter()
        .map(agent_line)
        .chain(bombs.iter().map(bomb_line))
        .collect();

    let mut lines: Vec<String> = grid.rows().collect();
    lines.push(entities.len().to_string());
    lines.extend(entities);
    lines.join("\n")
}
