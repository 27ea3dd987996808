use crate::common::{DomainError, DomainResult};
use crate::domains::arena::{AgentController, AgentId};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::time::timeout;
use tracing::{debug, warn};

const TERMINATE_GRACE: Duration = Duration::from_millis(500);

/// An agent running as its own process: turn states go to its stdin, one
/// action per turn is read back from its stdout. Stderr is forwarded to the
/// debug log.
pub struct ExecutableAgent {
    agent_id: AgentId,
    name: String,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stdout: Option<Lines<BufReader<ChildStdout>>>,
}

impl ExecutableAgent {
    /// Spawns `program` with `args`. Must be called from within a tokio runtime.
    pub fn spawn(agent_id: AgentId, name: &str, program: &str, args: &[String]) -> DomainResult<Self> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| DomainError::AgentUnavailable {
                id: agent_id,
                reason: format!("failed to start '{}': {}", program, e),
            })?;

        debug!(agent = name, pid = ?child.id(), program, ?args, "started agent process");

        if let Some(stderr) = child.stderr.take() {
            let name = name.to_string();
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    debug!(agent = %name, "stderr: {}", line);
                }
            });
        }

        Ok(Self {
            agent_id,
            name: name.to_string(),
            stdin: child.stdin.take(),
            stdout: child.stdout.take().map(|stdout| BufReader::new(stdout).lines()),
            child: Some(child),
        })
    }

    async fn send(&mut self, data: &str) -> DomainResult<()> {
        let stdin = self.stdin.as_mut().ok_or_else(|| DomainError::AgentUnavailable {
            id: self.agent_id,
            reason: "process has been terminated".to_string(),
        })?;

        let mut payload = String::with_capacity(data.len() + 1);
        payload.push_str(data);
        payload.push('\n');

        let written = async {
            stdin.write_all(payload.as_bytes()).await?;
            stdin.flush().await
        }
        .await;

        written.map_err(|e| DomainError::AgentUnavailable {
            id: self.agent_id,
            reason: format!("error sending data: {}", e),
        })
    }
}

#[async_trait]
impl AgentController for ExecutableAgent {
    async fn send_prelude(&mut self, prelude: &str) -> DomainResult<()> {
        self.send(prelude).await
    }

    async fn send_turn_state(&mut self, state: &str) -> DomainResult<()> {
        self.send(state).await
    }

    async fn receive(&mut self, budget: Duration) -> Option<String> {
        let lines = self.stdout.as_mut()?;
        match timeout(budget, lines.next_line()).await {
            Ok(Ok(Some(line))) => Some(line.trim().to_string()),
            Ok(Ok(None)) => {
                warn!(agent = %self.name, "closed its output");
                None
            }
            Ok(Err(e)) => {
                warn!(agent = %self.name, error = %e, "failed to read output");
                None
            }
            Err(_) => {
                warn!(agent = %self.name, ?budget, "did not provide output in time");
                None
            }
        }
    }

    async fn terminate(&mut self) {
        self.stdin = None;
        self.stdout = None;
        if let Some(mut child) = self.child.take() {
            if let Ok(Some(status)) = child.try_wait() {
                debug!(agent = %self.name, %status, "process already exited");
                return;
            }
            if let Err(e) = child.start_kill() {
                warn!(agent = %self.name, error = %e, "failed to kill process");
            }
            match timeout(TERMINATE_GRACE, child.wait()).await {
                Ok(_) => debug!(agent = %self.name, "terminated"),
                Err(_) => warn!(agent = %self.name, "did not terminate in time"),
            }
        }
    }
}
