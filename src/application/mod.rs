pub mod match_runner;
pub mod roster;

pub use match_runner::*;
pub use roster::*;
