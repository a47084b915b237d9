// Tuning layer: fixed physical/chemical constants kept apart from runtime config.

pub mod particle;
pub mod reaction;

pub use particle::{CanvasTuning, ParticleTuning, ReactantProfile};
pub use reaction::ReactionTuning;
