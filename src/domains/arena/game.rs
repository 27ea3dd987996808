use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::common::{ActionError, AggregateRoot, DomainError, DomainResult};

use super::action::{self, ActionReport};
use super::agent::{Agent, AgentId};
use super::bomb::{Bomb, BombRegistry};
use super::events::{EndReason, GameEvent};
use super::explosion::{self, Blast};
use super::grid::Grid;
use super::movement::MoveOutcome;
use super::position::Position;
use super::protocol;
use super::rules::{HEIGHT, MAX_AGENTS, MAX_TURNS, MIN_AGENTS, START_POSITIONS, WIDTH};

/// Raw responses collected for one turn, keyed by agent id. A missing entry
/// means the agent did not answer in time.
pub type TurnActions = HashMap<AgentId, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Running,
    Ended,
}

/// Turn controller and owner of the whole arena state.
pub struct Game {
    pub id: String,
    grid: Grid,
    bombs: BombRegistry,
    agents: Vec<Agent>,
    explosions: HashSet<Position>,
    turn: u32,
    boxes_left: usize,
    status: GameStatus,
    end_reason: Option<EndReason>,
    version: u64,
    uncommitted_events: Vec<GameEvent>,
}

impl Game {
    pub fn new(agent_names: Vec<String>, grid: Grid) -> DomainResult<Self> {
        Self::with_id(Uuid::new_v4().to_string(), agent_names, grid)
    }

    pub fn with_id(id: String, agent_names: Vec<String>, grid: Grid) -> DomainResult<Self> {
        if !(MIN_AGENTS..=MAX_AGENTS).contains(&agent_names.len()) {
            return Err(DomainError::InvalidAgentCount {
                min: MIN_AGENTS,
                max: MAX_AGENTS,
                actual: agent_names.len(),
            });
        }
        if grid.width() != WIDTH || grid.height() != HEIGHT {
            return Err(DomainError::InvalidLayout {
                reason: format!(
                    "grid must be {}x{}, got {}x{}",
                    WIDTH,
                    HEIGHT,
                    grid.width(),
                    grid.height()
                ),
            });
        }

        let agents: Vec<Agent> = agent_names
            .into_iter()
            .enumerate()
            .map(|(i, name)| Agent::new(i, name, START_POSITIONS[i]))
            .collect();

        let names = agents.iter().map(|a| a.name.clone()).collect();
        let boxes = grid.box_count();
        let mut game = Self {
            id: id.clone(),
            boxes_left: boxes,
            grid,
            bombs: BombRegistry::new(),
            agents,
            explosions: HashSet::new(),
            turn: 0,
            status: GameStatus::Running,
            end_reason: None,
            version: 0,
            uncommitted_events: Vec::new(),
        };

        game.record(GameEvent::GameStarted {
            game_id: id,
            agents: names,
            width: WIDTH,
            height: HEIGHT,
            boxes,
            timestamp: Utc::now(),
        });
        Ok(game)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[cfg(test)]
    pub(crate) fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn bombs(&self) -> &BombRegistry {
        &self.bombs
    }

    #[cfg(test)]
    pub(crate) fn bombs_mut(&mut self) -> &mut BombRegistry {
        &mut self.bombs
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agent(&self, id: AgentId) -> DomainResult<&Agent> {
        self.agents.get(id).ok_or(DomainError::UnknownAgent { id })
    }

    #[cfg(test)]
    pub(crate) fn agent_mut(&mut self, id: AgentId) -> DomainResult<&mut Agent> {
        self.agents.get_mut(id).ok_or(DomainError::UnknownAgent { id })
    }

    /// Agents still asked for an action each turn.
    pub fn eligible_agents(&self) -> Vec<AgentId> {
        self.agents
            .iter()
            .filter(|agent| agent.is_eligible())
            .map(|agent| agent.id)
            .collect()
    }

    /// Cells on fire during the last resolved turn.
    pub fn explosions(&self) -> &HashSet<Position> {
        &self.explosions
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn boxes_left(&self) -> usize {
        self.boxes_left
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == GameStatus::Running
    }

    pub fn end_reason(&self) -> Option<EndReason> {
        self.end_reason
    }

    pub fn prelude(&self, agent_id: AgentId) -> String {
        protocol::prelude(&self.grid, agent_id)
    }

    pub fn turn_state(&self) -> String {
        protocol::turn_state(&self.grid, &self.agents, &self.bombs)
    }

    /// Resolves one full turn. Does nothing once the game has ended.
    pub fn advance(&mut self, actions: &TurnActions) {
        if !self.is_running() {
            return;
        }

        info!(game_id = %self.id, turn = self.turn + 1, "turn started");
        self.record(GameEvent::TurnStarted {
            game_id: self.id.clone(),
            turn: self.turn,
            timestamp: Utc::now(),
        });

        let exploding = self.tick_bombs();
        self.propagate_explosions(exploding);
        self.process_actions(actions);
        self.boxes_left = self.grid.box_count();
        self.turn += 1;

        if let Some(reason) = self.check_end() {
            self.finish(reason);
        }
    }

    pub fn tick_bombs(&mut self) -> Vec<Bomb> {
        self.bombs.tick_all(&mut self.agents)
    }

    pub fn propagate_explosions(&mut self, exploding: Vec<Bomb>) -> Blast {
        let blast = explosion::propagate(&mut self.grid, &mut self.bombs, &mut self.agents, exploding);

        for bomb in &blast.detonated {
            let chained = blast.chained.contains(bomb);
            self.record(GameEvent::BombDetonated {
                game_id: self.id.clone(),
                owner_id: bomb.owner_id,
                position: bomb.position,
                chained,
                timestamp: Utc::now(),
            });
        }
        for destroyed in &blast.destroyed_boxes {
            debug!(position = %destroyed.position, credited = ?destroyed.credited, "box destroyed");
            self.record(GameEvent::BoxDestroyed {
                game_id: self.id.clone(),
                position: destroyed.position,
                credited: destroyed.credited.clone(),
                timestamp: Utc::now(),
            });
        }

        self.explosions = blast.scorched.clone();
        blast
    }

    /// Applies responses in agent id order. Eligible agents without a
    /// response are disqualified.
    pub fn process_actions(&mut self, actions: &TurnActions) {
        for id in self.eligible_agents() {
            let result = match actions.get(&id).filter(|raw| !raw.trim().is_empty()) {
                Some(raw) => action::apply(&self.grid, &mut self.bombs, &mut self.agents[id], raw),
                None => {
                    self.agents[id].disqualify();
                    Err(ActionError::NoResponse)
                }
            };
            self.record_action(id, result);
        }
    }

    /// Non-disqualified agents sharing the best score. Empty when nobody is
    /// eligible; more than one entry is a draw.
    pub fn get_winners(&self) -> Vec<&Agent> {
        let candidates: Vec<&Agent> = self.agents.iter().filter(|a| a.is_eligible()).collect();
        let best = candidates.iter().map(|a| a.score).max().unwrap_or(0);
        candidates.into_iter().filter(|a| a.score == best).collect()
    }

    fn check_end(&self) -> Option<EndReason> {
        if self.agents.iter().any(|a| a.disqualified) {
            Some(EndReason::Disqualification)
        } else if self.boxes_left == 0 {
            Some(EndReason::NoBoxesLeft)
        } else if self.turn >= MAX_TURNS {
            Some(EndReason::TurnLimit)
        } else {
            None
        }
    }

    fn finish(&mut self, reason: EndReason) {
        self.status = GameStatus::Ended;
        self.end_reason = Some(reason);
        let winners: Vec<AgentId> = self.get_winners().iter().map(|a| a.id).collect();
        info!(game_id = %self.id, turn = self.turn, ?reason, ?winners, "game ended");
        self.record(GameEvent::GameEnded {
            game_id: self.id.clone(),
            turn: self.turn,
            reason,
            winners,
            timestamp: Utc::now(),
        });
    }

    fn record_action(&mut self, id: AgentId, result: Result<ActionReport, ActionError>) {
        match result {
            Ok(report) => {
                if let Some(bomb) = report.placed {
                    self.record(GameEvent::BombPlaced {
                        game_id: self.id.clone(),
                        agent_id: id,
                        position: bomb.position,
                        timestamp: Utc::now(),
                    });
                }
                self.record_movement(id, report.movement);
            }
            Err(error) => {
                let name = &self.agents[id].name;
                if error == ActionError::NoResponse {
                    warn!(agent = %name, "disqualified for not providing output in time");
                } else {
                    warn!(agent = %name, %error, "disqualified for providing invalid input");
                }
                self.record(GameEvent::AgentDisqualified {
                    game_id: self.id.clone(),
                    agent_id: id,
                    reason: error.to_string(),
                    timestamp: Utc::now(),
                });
            }
        }
    }

    fn record_movement(&mut self, id: AgentId, outcome: MoveOutcome) {
        match outcome {
            MoveOutcome::Stayed => {}
            MoveOutcome::Moved { from, to, direction } => {
                debug!(agent = %self.agents[id].name, %to, "moves");
                self.record(GameEvent::AgentMoved {
                    game_id: self.id.clone(),
                    agent_id: id,
                    from,
                    to,
                    direction,
                    timestamp: Utc::now(),
                });
            }
            MoveOutcome::Unreachable { target } => {
                warn!(agent = %self.agents[id].name, %target, "cannot reach destination");
                self.record(GameEvent::MoveUnreachable {
                    game_id: self.id.clone(),
                    agent_id: id,
                    target,
                    timestamp: Utc::now(),
                });
            }
        }
    }

    fn record(&mut self, event: GameEvent) {
        self.add_event(event);
        self.version += 1;
    }
}

impl AggregateRoot for Game {
    type Event = GameEvent;

    fn aggregate_id(&self) -> &str {
        &self.id
    }

    fn aggregate_type(&self) -> &'static str {
        "ArenaGame"
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted_events
    }

    fn mark_events_as_committed(&mut self) {
        self.uncommitted_events.clear();
    }

    fn add_event(&mut self, event: Self::Event) {
        self.uncommitted_events.push(event);
    }
}
