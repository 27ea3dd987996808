use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::agent::AgentId;
use super::events::{EndReason, GameEvent};

/// Per-agent statistics rebuilt from a game's events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentLine {
    pub name: String,
    pub boxes_destroyed: u32,
    pub bombs_placed: u32,
    pub moves: u32,
    pub disqualified: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scoreboard {
    pub game_id: String,
    pub turns: u32,
    pub agents: BTreeMap<AgentId, AgentLine>,
    pub end_reason: Option<EndReason>,
    pub winners: Vec<AgentId>,
}

impl Scoreboard {
    pub fn from_events<'a>(events: impl IntoIterator<Item = &'a GameEvent>) -> Self {
        let mut board = Self::default();
        for event in events {
            board.apply_event(event);
        }
        board
    }

    pub fn apply_event(&mut self, event: &GameEvent) {
        match event {
            GameEvent::GameStarted { game_id, agents, .. } => {
                self.game_id = game_id.clone();
                self.agents = agents
                    .iter()
                    .enumerate()
                    .map(|(id, name)| {
                        (
                            id,
                            AgentLine {
                                name: name.clone(),
                                ..AgentLine::default()
                            },
                        )
                    })
                    .collect();
            }
            GameEvent::BombPlaced { agent_id, .. } => {
                self.agents.entry(*agent_id).or_default().bombs_placed += 1;
            }
            GameEvent::BoxDestroyed { credited, .. } => {
                for agent_id in credited {
                    self.agents.entry(*agent_id).or_default().boxes_destroyed += 1;
                }
            }
            GameEvent::AgentMoved { agent_id, .. } => {
                self.agents.entry(*agent_id).or_default().moves += 1;
            }
            GameEvent::AgentDisqualified { agent_id, reason, .. } => {
                self.agents.entry(*agent_id).or_default().disqualified = Some(reason.clone());
            }
            GameEvent::GameEnded { turn, reason, winners, .. } => {
                self.turns = *turn;
                self.end_reason = Some(*reason);
                self.winners = winners.clone();
            }
            _ => {}
        }
    }
}
