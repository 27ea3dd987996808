use crate::common::DomainResult;
use crate::domains::arena::AgentController;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::{sleep, timeout};

/// Everything a scripted agent was sent, shared with whoever built it.
#[derive(Debug, Default)]
pub struct Transcript {
    pub prelude: Option<String>,
    pub states: Vec<String>,
    pub terminated: bool,
}

pub type SharedTranscript = Arc<Mutex<Transcript>>;

/// Replays a fixed list of responses, one per turn. `None` entries and an
/// exhausted script both count as "no response".
pub struct ScriptedAgent {
    responses: VecDeque<Option<String>>,
    latency: Duration,
    transcript: SharedTranscript,
}

impl ScriptedAgent {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_gaps(responses.into_iter().map(|r| Some(r.into())))
    }

    pub fn with_gaps(responses: impl IntoIterator<Item = Option<String>>) -> Self {
        Self {
            responses: responses.into_iter().collect(),
            latency: Duration::ZERO,
            transcript: Arc::new(Mutex::new(Transcript::default())),
        }
    }

    /// Delay every response by `latency`, to exercise response budgets.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn transcript(&self) -> SharedTranscript {
        self.transcript.clone()
    }
}

#[async_trait]
impl AgentController for ScriptedAgent {
    async fn send_prelude(&mut self, prelude: &str) -> DomainResult<()> {
        if let Ok(mut transcript) = self.transcript.lock() {
            transcript.prelude = Some(prelude.to_string());
        }
        Ok(())
    }

    async fn send_turn_state(&mut self, state: &str) -> DomainResult<()> {
        if let Ok(mut transcript) = self.transcript.lock() {
            transcript.states.push(state.to_string());
        }
        Ok(())
    }

    async fn receive(&mut self, budget: Duration) -> Option<String> {
        let response = self.responses.pop_front().flatten()?;
        if !self.latency.is_zero() && timeout(budget, sleep(self.latency)).await.is_err() {
            return None;
        }
        Some(response)
    }

    async fn terminate(&mut self) {
        if let Ok(mut transcript) = self.transcript.lock() {
            transcript.terminated = true;
        }
    }
}
