// The particle field: sole owner of the particle collection.

use crate::domain::layout::layout_particles;
use crate::domain::reactant::Reactant;
use crate::domain::state::{Particle, ParticleCounts, ParticleSnapshot};
use crate::domain::systems::collisions::resolve_collisions;
use crate::domain::systems::eviction::{EvictionPolicy, evict_to_counts};
use crate::domain::systems::motion::{MotionConfig, coast_particles, integrate_particles};
use crate::domain::tuning::{CanvasTuning, ParticleTuning};
use glam::Vec2;
use rand::SeedableRng;
use rand::rngs::StdRng;

pub struct ParticleField {
    particles: Vec<Particle>,
    tuning: ParticleTuning,
    eviction: EvictionPolicy,
    rng: StdRng,
}

impl ParticleField {
    pub fn new(particles: Vec<Particle>, tuning: ParticleTuning, eviction: EvictionPolicy) -> Self {
        let seed = match eviction {
            EvictionPolicy::Random { seed } => seed,
            _ => 0,
        };
        Self {
            particles,
            tuning,
            eviction,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Builds the initial powder block for the given counts.
    pub fn from_layout(
        counts: ParticleCounts,
        canvas: &CanvasTuning,
        tuning: ParticleTuning,
        eviction: EvictionPolicy,
    ) -> Self {
        let particles = layout_particles(counts, canvas, &tuning);
        Self::new(particles, tuning, eviction)
    }

    /// Evicts particles until each type matches `counts`. Returns the number removed.
    pub fn resize(&mut self, counts: ParticleCounts) -> usize {
        evict_to_counts(&mut self.particles, counts, self.eviction, &mut self.rng)
    }

    pub fn integrate(&mut self, force: Vec2, dt: f32) {
        let cfg = MotionConfig {
            gravity: self.tuning.gravity,
            dt,
        };
        integrate_particles(&mut self.particles, force, cfg);
    }

    pub fn coast(&mut self, dt: f32) {
        coast_particles(&mut self.particles, dt);
    }

    /// Returns the number of overlapping pairs found in this pass.
    pub fn resolve_collisions(&mut self) -> usize {
        resolve_collisions(&mut self.particles, self.tuning.restitution)
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn count_of(&self, kind: Reactant) -> usize {
        self.particles.iter().filter(|p| p.kind == kind).count()
    }

    pub fn eviction_policy(&self) -> EvictionPolicy {
        self.eviction
    }

    pub fn snapshots(&self) -> Vec<ParticleSnapshot> {
        self.particles.iter().map(ParticleSnapshot::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sketch_field(policy: EvictionPolicy) -> ParticleField {
        ParticleField::from_layout(
            ParticleCounts::new(375, 225, 150),
            &CanvasTuning::default(),
            ParticleTuning::default(),
            policy,
        )
    }

    #[test]
    fn when_resized_then_live_counts_match_model_counts() {
        let mut field = sketch_field(EvictionPolicy::default());
        let counts = ParticleCounts::new(374, 224, 149);

        assert_eq!(field.resize(counts), 3);
        assert_eq!(field.len(), counts.total);
        assert_eq!(field.count_of(Reactant::Kno3), 374);
        assert_eq!(field.count_of(Reactant::Charcoal), 224);
        assert_eq!(field.count_of(Reactant::Sulfur), 149);
    }

    #[test]
    fn when_oldest_first_then_lowest_ids_of_a_type_leave_first() {
        let mut field = sketch_field(EvictionPolicy::OldestFirst);
        field.resize(ParticleCounts::new(374, 225, 150));

        assert_eq!(field.particles()[0].id, 1);
    }

    #[test]
    fn when_newest_first_then_last_particle_of_a_type_leaves_first() {
        let mut field = sketch_field(EvictionPolicy::NewestFirst);
        field.resize(ParticleCounts::new(374, 225, 150));

        assert_eq!(field.particles()[0].id, 0);
        assert!(field.particles().iter().all(|p| p.id != 374));
    }

    #[test]
    fn when_integrating_and_colliding_then_packed_block_spreads_out() {
        let mut field = sketch_field(EvictionPolicy::default());
        let before: Vec<Vec2> = field.particles().iter().map(|p| p.position).collect();

        field.integrate(Vec2::new(0.0, 0.07), 1.0);
        let contacts = field.resolve_collisions();

        // The sketch packs particles 3px apart with 3-6px radii.
        assert!(contacts > 0);
        let moved = field
            .particles()
            .iter()
            .zip(&before)
            .filter(|(p, b)| p.position != **b)
            .count();
        assert_eq!(moved, field.len());
        assert!(field.particles().iter().all(|p| p.position.is_finite()));
    }

    #[test]
    fn when_snapshotting_then_every_particle_is_reported_in_order() {
        let field = sketch_field(EvictionPolicy::default());
        let snapshots = field.snapshots();

        assert_eq!(snapshots.len(), 750);
        assert_eq!(snapshots[0].kind, Reactant::Kno3);
        assert_eq!(snapshots[0].x, field.particles()[0].position.x);
    }
}
