use thiserror::Error;

/// Why an agent's response could not be turned into a command.
///
/// Every variant ends in disqualification of the issuing agent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    #[error("no response received")]
    NoResponse,

    #[error("expected 'BOMB x y' or 'MOVE x y', found '{raw}'")]
    MissingTokens { raw: String },

    #[error("coordinate '{token}' is not an integer")]
    InvalidCoordinate { token: String },

    #[error("unknown command '{command}'")]
    UnknownCommand { command: String },

    #[error("out of bounds coordinates ({x}, {y})")]
    OutOfBounds { x: i32, y: i32 },
}

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid layout: {reason}")]
    InvalidLayout { reason: String },

    #[error("A game needs between {min} and {max} agents, got {actual}")]
    InvalidAgentCount { min: usize, max: usize, actual: usize },

    #[error("Agent not found: {id}")]
    UnknownAgent { id: usize },

    #[error("Agent {id} is unavailable: {reason}")]
    AgentUnavailable { id: usize, reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Event store error: {0}")]
    EventStore(String),

    #[error("Configuration error: {0}")]
    Configuration(#[from] anyhow::Error),
}

pub type DomainResult<T> = Result<T, DomainError>;
pub type ApplicationResult<T> = Result<T, ApplicationError>;
