use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::domains::arena::rules::{MAX_AGENTS, MIN_AGENTS};

/// Environment variables prefixed with this override file settings, with `__`
/// separating nested keys (`HYPERSONIC__GAME__SEED=7`).
pub const ENV_PREFIX: &str = "HYPERSONIC";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub game: GameConfig,
    pub agents: Vec<AgentConfig>,
    pub logging: LoggingConfig,
    pub replay: ReplayConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Seeds layout choice and in-process bots. Unset means a fresh game every run.
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentKind {
    Executable,
    Random,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default)]
    pub name: String,
    pub kind: AgentKind,
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
}

impl AgentConfig {
    pub fn random(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: AgentKind::Random,
            command: None,
            args: Vec::new(),
        }
    }

    pub fn executable(name: &str, command: &str, args: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            kind: AgentKind::Executable,
            command: Some(command.to_string()),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// File the match narration goes to, next to the console output.
    pub path: Option<String>,
    /// Default tracing filter, overridden by `RUST_LOG`.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            path: None,
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    pub enabled: bool,
    pub directory: PathBuf,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            directory: PathBuf::from("replays"),
        }
    }
}

impl Default for Config {
    /// Two built-in random bots, console logging only, no replay.
    fn default() -> Self {
        Self {
            game: GameConfig::default(),
            agents: vec![AgentConfig::random("Random1"), AgentConfig::random("Random2")],
            logging: LoggingConfig::default(),
            replay: ReplayConfig::default(),
        }
    }
}

impl Config {
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Layered load: defaults, then `path` if it exists, then `HYPERSONIC__*`
    /// environment variables.
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let count = self.agents.len();
        if !(MIN_AGENTS..=MAX_AGENTS).contains(&count) {
            return Err(anyhow!(
                "expected between {} and {} agents, got {}",
                MIN_AGENTS,
                MAX_AGENTS,
                count
            ));
        }
        for (id, agent) in self.agents.iter().enumerate() {
            if agent.kind == AgentKind::Executable && agent.command.as_deref().map_or(true, str::is_empty) {
                return Err(anyhow!("agent {} is executable but has no command", id));
            }
        }
        Ok(())
    }
}
