// Use cases layer: the simulation driver and the loop that ticks it.

pub mod simulation;
pub mod types;
pub mod world;

pub use simulation::{Simulation, SimulationSettings};
pub use types::{ControlEvent, FrameUpdate, RunState, TickOutcome};
