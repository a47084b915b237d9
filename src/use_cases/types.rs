// Use-case level inputs/outputs for the simulation loop.

use crate::domain::{ParticleCounts, ParticleSnapshot, RatioError, ReactionSnapshot};
use crate::domain::IngredientRatios;

#[derive(Debug, Clone)]
pub enum ControlEvent {
    /// Start/Pause button.
    Toggle,
    Start,
    Pause,
    /// Rebuilds model and field from the pending ratios.
    Restart,
    /// Slider values; validated on every running tick and on restart.
    SetRatios(IngredientRatios),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Paused,
    Running,
    Exhausted,
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    Advanced,
    /// Paused or exhausted; particles coasted, model untouched.
    Idle,
    /// Ingredient input was invalid; the run was paused instead.
    Rejected(RatioError),
    /// The model froze on this tick.
    Exhausted,
}

#[derive(Debug, Clone)]
pub struct FrameUpdate {
    pub tick: u64,
    pub run_state: RunState,
    pub reaction: ReactionSnapshot,
    pub counts: ParticleCounts,
    pub particles: Vec<ParticleSnapshot>,
    pub warning: Option<String>,
}
