// Domain layer: reaction kinetics, particle bodies and the per-tick systems.

pub mod field;
pub mod layout;
pub mod ratios;
pub mod reactant;
pub mod reaction;
pub mod state;
pub mod systems;
pub mod tuning;

pub use field::ParticleField;
pub use ratios::{IngredientRatios, RatioError};
pub use reactant::Reactant;
pub use reaction::{AdvanceOutcome, ReactionModel};
pub use state::{
    BurnRateSample, Particle, ParticleCounts, ParticleSnapshot, ReactionSnapshot,
};
pub use systems::eviction::EvictionPolicy;
