use crate::common::DomainEvent;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::agent::AgentId;
use super::position::{Direction, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    TurnLimit,
    NoBoxesLeft,
    Disqualification,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GameEvent {
    GameStarted {
        game_id: String,
        agents: Vec<String>,
        width: i32,
        height: i32,
        boxes: usize,
        timestamp: DateTime<Utc>,
    },
    TurnStarted {
        game_id: String,
        turn: u32,
        timestamp: DateTime<Utc>,
    },
    BombPlaced {
        game_id: String,
        agent_id: AgentId,
        position: Position,
        timestamp: DateTime<Utc>,
    },
    BombDetonated {
        game_id: String,
        owner_id: AgentId,
        position: Position,
        chained: bool,
        timestamp: DateTime<Utc>,
    },
    BoxDestroyed {
        game_id: String,
        position: Position,
        credited: Vec<AgentId>,
        timestamp: DateTime<Utc>,
    },
    AgentMoved {
        game_id: String,
        agent_id: AgentId,
        from: Position,
        to: Position,
        direction: Direction,
        timestamp: DateTime<Utc>,
    },
    MoveUnreachable {
        game_id: String,
        agent_id: AgentId,
        target: Position,
        timestamp: DateTime<Utc>,
    },
    AgentDisqualified {
        game_id: String,
        agent_id: AgentId,
        reason: String,
        timestamp: DateTime<Utc>,
    },
    GameEnded {
        game_id: String,
        turn: u32,
        reason: EndReason,
        winners: Vec<AgentId>,
        timestamp: DateTime<Utc>,
    },
}

impl DomainEvent for GameEvent {
    fn event_type(&self) -> &'static str {
        match self {
            GameEvent::GameStarted { .. } => "GameStarted",
            GameEvent::TurnStarted { .. } => "TurnStarted",
            GameEvent::BombPlaced { .. } => "BombPlaced",
            GameEvent::BombDetonated { .. } => "BombDetonated",
            GameEvent::BoxDestroyed { .. } => "BoxDestroyed",
            GameEvent::AgentMoved { .. } => "AgentMoved",
            GameEvent::MoveUnreachable { .. } => "MoveUnreachable",
            GameEvent::AgentDisqualified { .. } => "AgentDisqualified",
            GameEvent::GameEnded { .. } => "GameEnded",
        }
    }

    fn aggregate_id(&self) -> &str {
        match self {
            GameEvent::GameStarted { game_id, .. } => game_id,
            GameEvent::TurnStarted { game_id, .. } => game_id,
            GameEvent::BombPlaced { game_id, .. } => game_id,
            GameEvent::BombDetonated { game_id, .. } => game_id,
            GameEvent::BoxDestroyed { game_id, .. } => game_id,
            GameEvent::AgentMoved { game_id, .. } => game_id,
            GameEvent::MoveUnreachable { game_id, .. } => game_id,
            GameEvent::AgentDisqualified { game_id, .. } => game_id,
            GameEvent::GameEnded { game_id, .. } => game_id,
        }
    }

    fn event_version(&self) -> u64 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            GameEvent::GameStarted { timestamp, .. } => *timestamp,
            GameEvent::TurnStarted { timestamp, .. } => *timestamp,
            GameEvent::BombPlaced { timestamp, .. } => *timestamp,
            GameEvent::BombDetonated { timestamp, .. } => *timestamp,
            GameEvent::BoxDestroyed { timestamp, .. } => *timestamp,
            GameEvent::AgentMoved { timestamp, .. } => *timestamp,
            GameEvent::MoveUnreachable { timestamp, .. } => *timestamp,
            GameEvent::AgentDisqualified { timestamp, .. } => *timestamp,
            GameEvent::GameEnded { timestamp, .. } => *timestamp,
        }
    }
}
