pub mod console_logger;
pub mod executable_agent;
pub mod file_logger;
pub mod multi_logger;
pub mod noop_logger;
pub mod random_agent;
pub mod scripted_agent;

pub use console_logger::*;
pub use executable_agent::*;
pub use file_logger::*;
pub use multi_logger::*;
pub use noop_logger::*;
pub use random_agent::*;
pub use scripted_agent::*;
