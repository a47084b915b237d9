use crate::domain::state::Particle;

/// Single all-pairs pass over the current collection (naive O(n^2)).
///
/// Pairs are visited in collection order and each pair is resolved at most
/// once; the pass is not iterated to convergence. Returns the number of
/// overlapping pairs found. A uniform grid or sweep-and-prune broad phase
/// would slot in here if particle counts grow well past a few hundred.
pub fn resolve_collisions(particles: &mut [Particle], restitution: f32) -> usize {
    let mut contacts = 0;
    let n = particles.len();

    for i in 0..n {
        for j in (i + 1)..n {
            let (left, right) = particles.split_at_mut(j);
            if collide(&mut left[i], &mut right[0], restitution) {
                contacts += 1;
            }
        }
    }

    contacts
}

/// Separates an overlapping pair and, if closing, exchanges an impulse.
/// Returns true when the pair overlapped.
pub fn collide(a: &mut Particle, b: &mut Particle, restitution: f32) -> bool {
    let distance = a.position.distance(b.position);
    let min_distance = a.radius + b.radius;
    if distance >= min_distance {
        return false;
    }

    let overlap = min_distance - distance;
    // Coincident centres have no direction; both corrections become no-ops.
    let normal = (a.position - b.position).normalize_or_zero();

    a.position += normal * (overlap / 2.0);
    b.position -= normal * (overlap / 2.0);

    let relative_velocity = a.velocity - b.velocity;
    let vel_along_normal = relative_velocity.dot(normal);

    if vel_along_normal < 0.0 {
        let mut impulse_mag = -(1.0 + restitution) * vel_along_normal;
        impulse_mag /= 1.0 / a.mass + 1.0 / b.mass;

        let impulse = normal * impulse_mag;
        a.velocity += impulse / a.mass;
        b.velocity -= impulse / b.mass;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::reactant::Reactant;
    use glam::Vec2;

    fn body(x: f32, y: f32, vx: f32, vy: f32, mass: f32, radius: f32) -> Particle {
        let mut p = Particle::new(0, Reactant::Sulfur, Vec2::new(x, y), mass, radius);
        p.velocity = Vec2::new(vx, vy);
        p
    }

    #[test]
    fn when_equal_masses_meet_head_on_then_each_moves_half_overlap_and_bounces_at_restitution() {
        // Radii 6 + 6, centres 10 apart: overlap of 2.
        let mut a = body(0.0, 0.0, 1.5, 0.0, 32.07, 6.0);
        let mut b = body(10.0, 0.0, -1.5, 0.0, 32.07, 6.0);
        let closing_speed = 3.0;

        assert!(collide(&mut a, &mut b, 0.8));

        assert!((a.position.x - -1.0).abs() < 1e-5);
        assert!((b.position.x - 11.0).abs() < 1e-5);

        // Velocities swap direction and keep 80% of the closing speed.
        assert!((a.velocity.x - -1.2).abs() < 1e-5);
        assert!((b.velocity.x - 1.2).abs() < 1e-5);
        let separating_speed = b.velocity.x - a.velocity.x;
        assert!((separating_speed - 0.8 * closing_speed).abs() < 1e-5);
    }

    #[test]
    fn when_particles_do_not_touch_then_nothing_changes() {
        let mut a = body(0.0, 0.0, 1.0, 0.0, 10.0, 3.0);
        let mut b = body(6.0, 0.0, -1.0, 0.0, 10.0, 3.0);

        assert!(!collide(&mut a, &mut b, 0.8));
        assert_eq!(a.position, Vec2::ZERO);
        assert_eq!(b.velocity, Vec2::new(-1.0, 0.0));
    }

    #[test]
    fn when_overlapping_pair_is_separating_then_only_positions_are_corrected() {
        let mut a = body(0.0, 0.0, -1.0, 0.0, 10.0, 6.0);
        let mut b = body(10.0, 0.0, 1.0, 0.0, 10.0, 6.0);

        assert!(collide(&mut a, &mut b, 0.8));
        assert_eq!(a.velocity, Vec2::new(-1.0, 0.0));
        assert_eq!(b.velocity, Vec2::new(1.0, 0.0));
        assert!((b.position.x - a.position.x - 12.0).abs() < 1e-5);
    }

    #[test]
    fn when_centres_coincide_then_no_nan_is_produced() {
        let mut a = body(5.0, 5.0, 1.0, 0.0, 10.0, 6.0);
        let mut b = body(5.0, 5.0, -1.0, 0.0, 10.0, 6.0);

        assert!(collide(&mut a, &mut b, 0.8));
        assert!(a.position.is_finite() && b.position.is_finite());
        assert!(a.velocity.is_finite() && b.velocity.is_finite());
        assert_eq!(a.velocity, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn when_pairs_collide_then_kinetic_energy_never_increases() {
        let cases = [
            body(0.0, 0.0, 2.0, 0.5, 101.1, 6.0),
            body(8.0, 1.0, -1.0, 0.0, 12.01, 3.0),
            body(3.0, 4.0, 0.0, -3.0, 32.07, 6.0),
            body(1.0, 9.0, 0.3, 0.7, 12.01, 3.0),
        ];

        for i in 0..cases.len() {
            for j in (i + 1)..cases.len() {
                let mut a = clone_body(&cases[i]);
                let mut b = clone_body(&cases[j]);
                let before = a.kinetic_energy() + b.kinetic_energy();
                collide(&mut a, &mut b, 0.8);
                let after = a.kinetic_energy() + b.kinetic_energy();
                assert!(after <= before + 1e-4, "pair ({i}, {j}): {before} -> {after}");
            }
        }
    }

    #[test]
    fn when_resolving_collection_then_overlapping_pairs_are_counted() {
        let mut particles = vec![
            body(0.0, 0.0, 0.0, 0.0, 10.0, 6.0),
            body(10.0, 0.0, 0.0, 0.0, 10.0, 6.0),
            body(100.0, 100.0, 0.0, 0.0, 10.0, 6.0),
        ];

        assert_eq!(resolve_collisions(&mut particles, 0.8), 1);
        assert_eq!(particles[2].position, Vec2::new(100.0, 100.0));
    }

    fn clone_body(p: &Particle) -> Particle {
        body(
            p.position.x,
            p.position.y,
            p.velocity.x,
            p.velocity.y,
            p.mass,
            p.radius,
        )
    }
}
