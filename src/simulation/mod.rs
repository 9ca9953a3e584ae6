//! Single-path retirement simulation

mod engine;
mod records;
mod state;

pub use engine::PathSimulator;
pub use records::{SimulationOutcome, SimulationRecord};
pub use state::PortfolioState;
