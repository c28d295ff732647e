//! Load-run orchestration module.

mod generator;
mod orchestrator;
mod stats;

pub use generator::MessageGenerator;
pub use orchestrator::{LoadRun, LoadRunConfig};
pub use stats::RunStats;
