use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::common::{
    AggregateRoot, ApplicationError, ApplicationResult, DomainError, EventEnvelope, EventMetadata, EventStore,
};
use crate::domains::arena::rules::{FIRST_TURN_TIMEOUT, TURN_TIMEOUT};
use crate::domains::arena::{Agent, AgentController, AgentId, EndReason, Game, GameEvent, Scoreboard, TurnActions};
use crate::domains::logger::DynLogger;

const EVENT_SOURCE: &str = "hypersonic-arena";

/// Final result of a refereed match.
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    pub game_id: String,
    pub turns: u32,
    pub end_reason: Option<EndReason>,
    pub winners: Vec<AgentId>,
    pub agents: Vec<Agent>,
    pub scoreboard: Scoreboard,
}

impl MatchOutcome {
    pub fn is_draw(&self) -> bool {
        self.winners.len() > 1
    }

    pub fn winner_names(&self) -> Vec<&str> {
        self.winners
            .iter()
            .filter_map(|id| self.agents.get(*id))
            .map(|agent| agent.name.as_str())
            .collect()
    }
}

/// Drives a [`Game`] against one controller per agent: sends the prelude,
/// then each turn's state, collects the answers within the response budget
/// and hands them to the game. Every event the game records is forwarded to
/// the replay store, if one is attached.
pub struct MatchRunner {
    game: Game,
    controllers: Vec<Box<dyn AgentController>>,
    logger: DynLogger,
    event_store: Option<Arc<dyn EventStore>>,
    first_turn_budget: Duration,
    turn_budget: Duration,
    history: Vec<GameEvent>,
    unavailable: HashSet<AgentId>,
}

impl MatchRunner {
    pub fn new(game: Game, controllers: Vec<Box<dyn AgentController>>, logger: DynLogger) -> ApplicationResult<Self> {
        let expected = game.agents().len();
        if controllers.len() != expected {
            return Err(DomainError::InvalidAgentCount {
                min: expected,
                max: expected,
                actual: controllers.len(),
            }
            .into());
        }

        Ok(Self {
            game,
            controllers,
            logger,
            event_store: None,
            first_turn_budget: FIRST_TURN_TIMEOUT,
            turn_budget: TURN_TIMEOUT,
            history: Vec::new(),
            unavailable: HashSet::new(),
        })
    }

    pub fn with_event_store(mut self, event_store: Arc<dyn EventStore>) -> Self {
        self.event_store = Some(event_store);
        self
    }

    /// Overrides the response budgets (first turn, later turns).
    pub fn with_budgets(mut self, first_turn: Duration, later_turns: Duration) -> Self {
        self.first_turn_budget = first_turn;
        self.turn_budget = later_turns;
        self
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Every event recorded so far, in order.
    pub fn history(&self) -> &[GameEvent] {
        &self.history
    }

    fn budget(&self) -> Duration {
        if self.game.turn() == 0 {
            self.first_turn_budget
        } else {
            self.turn_budget
        }
    }

    /// Plays the match to its end and releases every controller, even when
    /// persisting the replay fails halfway.
    pub async fn run(&mut self) -> ApplicationResult<MatchOutcome> {
        let result = self.play().await;
        for controller in self.controllers.iter_mut() {
            controller.terminate().await;
        }
        result?;

        let outcome = self.outcome();
        self.announce(&outcome);
        Ok(outcome)
    }

    async fn play(&mut self) -> ApplicationResult<()> {
        let names: Vec<&str> = self.game.agents().iter().map(|a| a.name.as_str()).collect();
        self.logger
            .info(&format!("Game {} started with {}", self.game.id, names.join(", ")));
        self.commit_events().await?;
        self.send_preludes().await;

        while self.game.is_running() {
            let actions = self.collect_actions().await;
            self.game.advance(&actions);
            self.narrate_turn();
            self.commit_events().await?;
        }

        Ok(())
    }

    async fn send_preludes(&mut self) {
        for id in 0..self.controllers.len() {
            let prelude = self.game.prelude(id);
            if let Err(e) = self.controllers[id].send_prelude(&prelude).await {
                self.logger.warn(&format!("Could not reach {}: {}", self.game.agents()[id].name, e));
                self.unavailable.insert(id);
            }
        }
    }

    /// Broadcasts the turn state and waits for each eligible agent in id
    /// order. Agents that could not be reached get no entry, which the game
    /// treats as a missed response.
    async fn collect_actions(&mut self) -> TurnActions {
        let state = self.game.turn_state();
        let budget = self.budget();
        let mut actions = TurnActions::new();

        for id in self.game.eligible_agents() {
            if self.unavailable.contains(&id) {
                continue;
            }
            let controller = &mut self.controllers[id];
            if let Err(e) = controller.send_turn_state(&state).await {
                self.logger.warn(&format!("Lost {}: {}", self.game.agents()[id].name, e));
                self.unavailable.insert(id);
                continue;
            }
            match controller.receive(budget).await {
                Some(response) => {
                    actions.insert(id, response);
                }
                None => self.logger.warn(&format!(
                    "{} did not answer within {}ms",
                    self.game.agents()[id].name,
                    budget.as_millis()
                )),
            }
        }

        actions
    }

    fn narrate_turn(&self) {
        let turn = self.game.turn();
        for event in self.game.uncommitted_events() {
            match event {
                GameEvent::BoxDestroyed { position, credited, .. } => self.logger.info(&format!(
                    "Turn {}: box at {} destroyed, credited to {:?}",
                    turn, position, credited
                )),
                GameEvent::AgentDisqualified { agent_id, reason, .. } => self.logger.warn(&format!(
                    "Turn {}: {} disqualified ({})",
                    turn, self.game.agents()[*agent_id].name, reason
                )),
                _ => {}
            }
        }
    }

    /// Drains the game's uncommitted events into the history and, when
    /// configured, the replay store.
    async fn commit_events(&mut self) -> ApplicationResult<()> {
        let events: Vec<GameEvent> = self.game.uncommitted_events().to_vec();
        if events.is_empty() {
            return Ok(());
        }

        if let Some(store) = &self.event_store {
            let metadata = EventMetadata {
                turn: self.game.turn(),
                source: EVENT_SOURCE.to_string(),
            };
            let envelopes = events
                .iter()
                .map(|event| EventEnvelope::new(event, self.game.aggregate_type(), metadata.clone()))
                .collect::<Result<Vec<_>, _>>()
                .map_err(DomainError::from)?;
            store
                .append_events(self.game.aggregate_id(), envelopes)
                .await
                .map_err(ApplicationError::EventStore)?;
        }

        self.history.extend(events);
        self.game.mark_events_as_committed();
        Ok(())
    }

    fn outcome(&self) -> MatchOutcome {
        MatchOutcome {
            game_id: self.game.id.clone(),
            turns: self.game.turn(),
            end_reason: self.game.end_reason(),
            winners: self.game.get_winners().iter().map(|a| a.id).collect(),
            agents: self.game.agents().to_vec(),
            scoreboard: Scoreboard::from_events(&self.history),
        }
    }

    fn announce(&self, outcome: &MatchOutcome) {
        let reason = outcome
            .end_reason
            .map(|r| format!("{:?}", r))
            .unwrap_or_else(|| "unknown".to_string());
        let names = outcome.winner_names();
        let message = match names.len() {
            0 => format!("Game {} over after {} turns ({}): no winner", outcome.game_id, outcome.turns, reason),
            1 => format!("Game {} over after {} turns ({}): {} wins", outcome.game_id, outcome.turns, reason, names[0]),
            _ => format!(
                "Game {} over after {} turns ({}): draw between {}",
                outcome.game_id,
                outcome.turns,
                reason,
                names.join(", ")
            ),
        };
        self.logger.info(&message);
    }
}
