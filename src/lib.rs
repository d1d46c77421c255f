// Library exports for the net snake AI client
// This allows the replay tool and the tests to use the planner directly

pub mod client;
pub mod config;
pub mod debug_logger;
pub mod error;
pub mod grid;
pub mod node;
pub mod planner;
pub mod priority;
pub mod protocol;
pub mod replay;
pub mod types;
