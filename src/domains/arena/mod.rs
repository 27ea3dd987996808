pub mod action;
pub mod agent;
pub mod bomb;
pub mod events;
pub mod explosion;
pub mod game;
pub mod grid;
pub mod layouts;
pub mod movement;
pub mod ports;
pub mod position;
pub mod projections;
pub mod protocol;
pub mod rules;

pub use action::{ActionReport, BombRefusal, Command, ParsedAction};
pub use agent::*;
pub use bomb::*;
pub use events::*;
pub use explosion::{Blast, DestroyedBox};
pub use game::*;
pub use grid::*;
pub use layouts::*;
pub use movement::*;
pub use ports::*;
pub use position::*;
pub use projections::*;
