// Domain-level simulation bodies and the snapshot types handed to adapters.

use crate::domain::reactant::Reactant;
use glam::Vec2;

/// Reaction values published once per tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReactionSnapshot {
    pub time: f64,
    pub kno3_concentration: f64,
    pub charcoal_concentration: f64,
    pub sulfur_concentration: f64,
    pub temperature: f64,
    pub pressure: f64,
    /// Latest per-step energy release, scaled by 10^5 for display.
    pub energy_release: f64,
    pub burn_rate: f64,
}

/// Live particle counts derived from the concentrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParticleCounts {
    pub kno3: usize,
    pub charcoal: usize,
    pub sulfur: usize,
    pub total: usize,
}

impl ParticleCounts {
    pub fn new(kno3: usize, charcoal: usize, sulfur: usize) -> Self {
        Self {
            kno3,
            charcoal,
            sulfur,
            total: kno3 + charcoal + sulfur,
        }
    }

    pub fn get(&self, kind: Reactant) -> usize {
        match kind {
            Reactant::Kno3 => self.kno3,
            Reactant::Charcoal => self.charcoal,
            Reactant::Sulfur => self.sulfur,
        }
    }
}

/// One entry of the burn-rate log, keyed by model time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BurnRateSample {
    pub time: f64,
    pub burn_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleSnapshot {
    pub kind: Reactant,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

pub struct Particle {
    /// Creation order within the current field; never reused.
    pub id: u64,
    pub kind: Reactant,
    pub position: Vec2,
    pub velocity: Vec2,

    // Accumulated for the current frame only.
    pub acceleration: Vec2,

    pub mass: f32,
    pub radius: f32,
}

impl Particle {
    pub fn new(id: u64, kind: Reactant, position: Vec2, mass: f32, radius: f32) -> Self {
        Self {
            id,
            kind,
            position,
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            mass,
            radius,
        }
    }

    /// Newton's second law: accumulate `force / mass` into the acceleration.
    pub fn apply_force(&mut self, force: Vec2) {
        self.acceleration += force / self.mass;
    }

    pub fn kinetic_energy(&self) -> f32 {
        0.5 * self.mass * self.velocity.length_squared()
    }
}

impl From<&Particle> for ParticleSnapshot {
    fn from(p: &Particle) -> Self {
        Self {
            kind: p.kind,
            x: p.position.x,
            y: p.position.y,
            radius: p.radius,
        }
    }
}
