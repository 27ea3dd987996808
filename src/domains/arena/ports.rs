use crate::common::DomainResult;
use async_trait::async_trait;
use std::time::Duration;

/// Port to whatever decides an agent's actions: a subprocess, an in-process
/// bot, a scripted test double.
///
/// The game only ever sees text: the prelude once, then one turn state per
/// turn, and at most one response line per turn.
#[async_trait]
pub trait AgentController: Send {
    async fn send_prelude(&mut self, prelude: &str) -> DomainResult<()>;

    async fn send_turn_state(&mut self, state: &str) -> DomainResult<()>;

    /// Waits up to `budget` for one response line. `None` means the agent
    /// did not answer in time.
    async fn receive(&mut self, budget: Duration) -> Option<String>;

    /// Releases whatever backs the controller. Must be safe to call twice.
    async fn terminate(&mut self) {}
}
