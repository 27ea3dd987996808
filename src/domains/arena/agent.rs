use serde::{Deserialize, Serialize};

use super::position::{Direction, Position};
use super::rules::{BOMB_RANGE, INITIAL_BOMBS};

pub type AgentId = usize;

/// Presentation hint for renderers; the rules never read it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionState {
    Idle,
    Moving,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub position: Position,
    pub bombs_left: u32,
    pub bomb_range: u32,
    /// Boxes destroyed so far.
    pub score: u32,
    pub disqualified: bool,
    pub last_action: String,
    pub message: String,

    pub previous_position: Position,
    pub direction: Direction,
    pub state: MotionState,
}

impl Agent {
    pub fn new(id: AgentId, name: impl Into<String>, start: Position) -> Self {
        let name = name.into();
        Self {
            id,
            name: if name.trim().is_empty() { format!("Agent {}", id) } else { name },
            position: start,
            bombs_left: INITIAL_BOMBS,
            bomb_range: BOMB_RANGE,
            score: 0,
            disqualified: false,
            last_action: String::new(),
            message: String::new(),
            previous_position: start,
            direction: if start.x == 0 { Direction::Down } else { Direction::Up },
            state: MotionState::Idle,
        }
    }

    pub fn is_eligible(&self) -> bool {
        !self.disqualified
    }

    pub fn disqualify(&mut self) {
        self.disqualified = true;
        self.state = MotionState::Idle;
    }

    pub fn move_to(&mut self, next: Position) {
        if let Some(direction) = Direction::between(self.position, next) {
            self.direction = direction;
        }
        self.previous_position = self.position;
        self.position = next;
        self.state = MotionState::Moving;
    }

    pub fn stay(&mut self) {
        self.previous_position = self.position;
        self.state = MotionState::Idle;
    }
}

/// Hands a detonated bomb back to its owner.
pub(crate) fn return_bomb(agents: &mut [Agent], owner_id: AgentId) {
    if let Some(owner) = agents.get_mut(owner_id) {
        owner.bombs_left += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_agent_faces_into_the_arena() {
        let left = Agent::new(0, "", Position::new(0, 0));
        assert_eq!(left.name, "Agent 0");
        assert_eq!(left.direction, Direction::Down);
        assert_eq!(left.bombs_left, 1);

        let right = Agent::new(1, "Right", Position::new(12, 10));
        assert_eq!(right.direction, Direction::Up);
        assert_eq!(right.previous_position, right.position);
    }

    #[test]
    fn blank_names_fall_back_to_the_id() {
        assert_eq!(Agent::new(2, "   ", Position::new(12, 0)).name, "Agent 2");
    }

    #[test]
    fn move_to_tracks_direction_and_previous_cell() {
        let mut agent = Agent::new(0, "a", Position::new(3, 3));
        agent.move_to(Position::new(4, 3));
        assert_eq!(agent.direction, Direction::Right);
        assert_eq!(agent.previous_position, Position::new(3, 3));
        assert_eq!(agent.state, MotionState::Moving);

        agent.stay();
        assert_eq!(agent.previous_position, Position::new(4, 3));
        assert_eq!(agent.state, MotionState::Idle);
    }
}
