pub mod file_replay_store;

pub use file_replay_store::*;
