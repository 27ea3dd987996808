use crate::adapters::outbound::{ExecutableAgent, RandomAgent};
use crate::common::{ApplicationResult, DomainError};
use crate::config::{AgentConfig, AgentKind};
use crate::domains::arena::{AgentController, Game};

/// Starts one controller per configured agent, in id order, named after the
/// game's agents. Random bots get a seed derived from `seed` so a seeded match
/// is reproducible.
pub fn build_controllers(
    game: &Game,
    agents: &[AgentConfig],
    seed: Option<u64>,
) -> ApplicationResult<Vec<Box<dyn AgentController>>> {
    let mut controllers: Vec<Box<dyn AgentController>> = Vec::with_capacity(agents.len());

    for (agent, config) in game.agents().iter().zip(agents) {
        let id = agent.id;
        match config.kind {
            AgentKind::Executable => {
                let command = config.command.as_deref().ok_or_else(|| DomainError::AgentUnavailable {
                    id,
                    reason: "no command configured".to_string(),
                })?;
                controllers.push(Box::new(ExecutableAgent::spawn(id, &agent.name, command, &config.args)?));
            }
            AgentKind::Random => {
                let bot_seed = seed.map(|s| s.wrapping_add(id as u64 + 1));
                controllers.push(Box::new(RandomAgent::new(bot_seed)));
            }
        }
    }

    Ok(controllers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::arena::Grid;

    fn game_for(agents: &[AgentConfig]) -> Game {
        let names = agents.iter().map(|a| a.name.clone()).collect();
        Game::new(names, Grid::empty(13, 11)).unwrap()
    }

    #[test]
    fn unnamed_agents_take_the_game_name() {
        let game = game_for(&[AgentConfig::random(""), AgentConfig::random("Bob")]);
        assert_eq!(game.agents()[0].name, "Agent 0");
        assert_eq!(game.agents()[1].name, "Bob");
    }

    #[tokio::test]
    async fn builds_random_bots() {
        let agents = vec![AgentConfig::random("a"), AgentConfig::random("b")];
        let controllers = build_controllers(&game_for(&agents), &agents, Some(1)).unwrap();
        assert_eq!(controllers.len(), 2);
    }

    #[tokio::test]
    async fn missing_program_is_reported() {
        let agents = vec![
            AgentConfig::executable("ghost", "/nonexistent/agent-binary", &[]),
            AgentConfig::random("r"),
        ];
        assert!(build_controllers(&game_for(&agents), &agents, None).is_err());
    }
}
