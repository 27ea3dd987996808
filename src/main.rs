use hypersonic_arena::adapters::inbound::FileReplayStore;
use hypersonic_arena::adapters::outbound::{init_combined_logger, init_console_logger};
use hypersonic_arena::application::{build_controllers, MatchRunner};
use hypersonic_arena::domains::arena::{random_layout, Game};
use hypersonic_arena::Config;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::error::Error;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = "config.toml";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => Config::from_file(&path).await?,
        None => Config::load(DEFAULT_CONFIG)?,
    };

    // The file logger claims the `log` facade, so it goes first; the tracing
    // subscriber still installs even though its log bridge then cannot.
    let logger = match &config.logging.path {
        Some(path) => init_combined_logger(path),
        None => init_console_logger(),
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    info!("Starting Hypersonic arena");

    let grid = match config.game.seed {
        Some(seed) => random_layout(&mut StdRng::seed_from_u64(seed)),
        None => random_layout(&mut rand::thread_rng()),
    };

    let agents = &config.agents;
    let names = agents.iter().map(|a| a.name.clone()).collect();
    let game = Game::new(names, grid)?;
    let controllers = build_controllers(&game, agents, config.game.seed)?;

    let mut runner = MatchRunner::new(game, controllers, logger)?;
    if config.replay.enabled {
        let store = FileReplayStore::new(config.replay.directory.clone());
        info!(path = %store.replay_path(&runner.game().id).display(), "recording replay");
        runner = runner.with_event_store(Arc::new(store));
    }

    let outcome = runner.run().await?;

    for agent in &outcome.agents {
        let status = if agent.disqualified { " (disqualified)" } else { "" };
        println!("{}: {} boxes{}", agent.name, agent.score, status);
    }
    let winners = outcome.winner_names();
    match winners.len() {
        0 => println!("No winner"),
        1 => println!("Winner: {}", winners[0]),
        _ => println!("Draw: {}", winners.join(", ")),
    }

    Ok(())
}
