use serde::{Deserialize, Serialize};

use super::agent::{return_bomb, Agent, AgentId};
use super::position::Position;
use super::rules::BOMB_LIFETIME;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bomb {
    pub owner_id: AgentId,
    pub position: Position,
    /// Turns left before detonation; 0 means it goes off this turn.
    pub timer: u32,
    pub range: u32,
}

impl Bomb {
    pub fn new(owner_id: AgentId, position: Position, range: u32) -> Self {
        Self {
            owner_id,
            position,
            timer: BOMB_LIFETIME,
            range,
        }
    }

    /// Returns whether the bomb explodes this turn.
    pub fn tick(&mut self) -> bool {
        self.timer = self.timer.saturating_sub(1);
        self.timer == 0
    }

    /// Placed during the current turn: no tick has elapsed yet.
    pub fn is_fresh(&self) -> bool {
        self.timer == BOMB_LIFETIME
    }
}

/// All bombs still on the grid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BombRegistry {
    bombs: Vec<Bomb>,
}

impl BombRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn place(&mut self, bomb: Bomb) {
        self.bombs.push(bomb);
    }

    /// Counts every bomb down by one. Bombs reaching zero leave the registry,
    /// go back to their owners and are returned in placement order.
    pub fn tick_all(&mut self, agents: &mut [Agent]) -> Vec<Bomb> {
        let mut exploding = Vec::new();
        let mut remaining = Vec::with_capacity(self.bombs.len());
        for mut bomb in self.bombs.drain(..) {
            if bomb.tick() {
                return_bomb(agents, bomb.owner_id);
                exploding.push(bomb);
            } else {
                remaining.push(bomb);
            }
        }
        self.bombs = remaining;
        exploding
    }

    /// Any bomb on the cell, including one already forced to zero this turn.
    pub fn bomb_at(&self, x: i32, y: i32) -> Option<&Bomb> {
        self.bombs
            .iter()
            .find(|bomb| bomb.position.x == x && bomb.position.y == y)
    }

    pub(crate) fn bomb_at_mut(&mut self, position: Position) -> Option<&mut Bomb> {
        self.bombs.iter_mut().find(|bomb| bomb.position == position)
    }

    /// A bomb blocks its cell once at least one tick has elapsed since placement.
    pub fn blocks_movement(&self, x: i32, y: i32) -> bool {
        self.bomb_at(x, y).is_some_and(|bomb| !bomb.is_fresh())
    }

    /// Drops every bomb whose timer reached zero.
    pub fn remove_detonated(&mut self) {
        self.bombs.retain(|bomb| bomb.timer > 0);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bomb> {
        self.bombs.iter()
    }

    pub fn len(&self) -> usize {
        self.bombs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bombs.is_empty()
    }
}
