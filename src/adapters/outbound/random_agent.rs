use crate::common::DomainResult;
use crate::domains::arena::{AgentController, Position};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

/// In-process bot that wanders to random cells, sometimes dropping a bomb on
/// the way. It reads the same text protocol as an external process would and
/// keeps each order until it has had time to get there.
pub struct RandomAgent {
    rng: StdRng,
    width: i32,
    height: i32,
    agent_id: Option<usize>,
    position: Position,
    current_action: Option<String>,
    turns_left: i32,
}

impl RandomAgent {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            rng: seed.map(StdRng::seed_from_u64).unwrap_or_else(StdRng::from_entropy),
            width: 0,
            height: 0,
            agent_id: None,
            position: Position::new(0, 0),
            current_action: None,
            turns_left: 0,
        }
    }

    fn read_prelude(&mut self, prelude: &str) {
        let values: Vec<i32> = prelude
            .split_whitespace()
            .filter_map(|token| token.parse().ok())
            .collect();
        if let [width, height, id] = values[..] {
            self.width = width;
            self.height = height;
            self.agent_id = usize::try_from(id).ok();
        }
    }

    fn read_own_position(&mut self, state: &str) {
        let Some(agent_id) = self.agent_id else {
            return;
        };
        for line in state.lines().skip(self.height.max(0) as usize + 1) {
            let fields: Vec<i64> = line
                .split_whitespace()
                .filter_map(|token| token.parse().ok())
                .collect();
            if let [0, owner, x, y, _, _] = fields[..] {
                if owner == agent_id as i64 {
                    self.position = Position::new(x as i32, y as i32);
                }
            }
        }
    }

    fn decide(&mut self) {
        if self.turns_left <= 0 || self.current_action.is_none() {
            let target = Position::new(
                self.rng.gen_range(0..self.width.max(1)),
                self.rng.gen_range(0..self.height.max(1)),
            );
            let command = if self.rng.gen_bool(0.5) { "MOVE" } else { "BOMB" };
            self.current_action = Some(format!("{} {} {}", command, target.x, target.y));
            self.turns_left = target.manhattan(self.position) + 1;
        }
        self.turns_left -= 1;
    }
}

#[async_trait]
impl AgentController for RandomAgent {
    async fn send_prelude(&mut self, prelude: &str) -> DomainResult<()> {
        self.read_prelude(prelude);
        Ok(())
    }

    async fn send_turn_state(&mut self, state: &str) -> DomainResult<()> {
        self.read_own_position(state);
        self.decide();
        Ok(())
    }

    async fn receive(&mut self, _budget: Duration) -> Option<String> {
        self.current_action.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ActionError;
    use crate::domains::arena::action;
    use crate::domains::arena::rules::{HEIGHT, WIDTH};
    use crate::domains::arena::{protocol, Agent, BombRegistry, Grid};

    #[tokio::test]
    async fn answers_with_valid_in_bounds_actions() {
        let grid = Grid::empty(WIDTH, HEIGHT);
        let agents = vec![
            Agent::new(0, "a", Position::new(0, 0)),
            Agent::new(1, "b", Position::new(12, 10)),
        ];
        let state = protocol::turn_state(&grid, &agents, &BombRegistry::new());

        let mut bot = RandomAgent::new(Some(42));
        bot.send_prelude(&protocol::prelude(&grid, 1)).await.unwrap();
        assert_eq!(bot.agent_id, Some(1));

        for _ in 0..50 {
            bot.send_turn_state(&state).await.unwrap();
            assert_eq!(bot.position, Position::new(12, 10));
            let raw = bot.receive(Duration::from_millis(100)).await.unwrap();
            let parsed = action::parse(&raw).map_err(|e: ActionError| e.to_string()).unwrap();
            assert!(grid.contains(parsed.target));
        }
    }
}
