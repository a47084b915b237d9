use crate::domain::reactant::Reactant;
use crate::domain::state::{Particle, ParticleCounts};
use rand::rngs::StdRng;
use rand::seq::index;

/// Which particles of a type go first when its count drops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvictionPolicy {
    /// Evict the earliest-created particles of the type.
    #[default]
    OldestFirst,
    /// Keep the earliest-created particles and evict the newest.
    NewestFirst,
    /// Evict a seeded random subset.
    Random { seed: u64 },
}

/// Drops particles until every type matches its target count.
///
/// Types already at or below their target are left alone; eviction never
/// spawns. Survivors keep their relative order. Returns the number removed.
pub fn evict_to_counts(
    particles: &mut Vec<Particle>,
    counts: ParticleCounts,
    policy: EvictionPolicy,
    rng: &mut StdRng,
) -> usize {
    let mut keep = vec![true; particles.len()];

    for kind in Reactant::ALL {
        let positions: Vec<usize> = particles
            .iter()
            .enumerate()
            .filter(|(_, p)| p.kind == kind)
            .map(|(i, _)| i)
            .collect();

        let target = counts.get(kind);
        if positions.len() <= target {
            continue;
        }
        let excess = positions.len() - target;

        match policy {
            EvictionPolicy::OldestFirst => {
                for &i in &positions[..excess] {
                    keep[i] = false;
                }
            }
            EvictionPolicy::NewestFirst => {
                for &i in &positions[target..] {
                    keep[i] = false;
                }
            }
            EvictionPolicy::Random { .. } => {
                for pick in index::sample(rng, positions.len(), excess).into_iter() {
                    keep[positions[pick]] = false;
                }
            }
        }
    }

    let before = particles.len();
    let mut flags = keep.into_iter();
    particles.retain(|_| flags.next().unwrap_or(true));
    before - particles.len()
}
