use crate::domain::state::Particle;
use glam::Vec2;

#[derive(Debug, Clone, Copy)]
pub struct MotionConfig {
    pub gravity: f32, // px/frame^2, applied as m*g then divided by m
    pub dt: f32,      // frames
}

/// Applies the uniform reaction force and gravity, then integrates one step.
pub fn integrate_particles(particles: &mut [Particle], force: Vec2, cfg: MotionConfig) {
    for p in particles.iter_mut() {
        p.apply_force(force);
        let weight = Vec2::new(0.0, p.mass * cfg.gravity);
        p.apply_force(weight);
        step(p, cfg.dt);
    }
}

/// Moves particles along their current velocity without applying any force.
pub fn coast_particles(particles: &mut [Particle], dt: f32) {
    for p in particles.iter_mut() {
        step(p, dt);
    }
}

fn step(p: &mut Particle, dt: f32) {
    p.velocity += p.acceleration * dt;
    p.position += p.velocity * dt;
    p.acceleration = Vec2::ZERO;
}
