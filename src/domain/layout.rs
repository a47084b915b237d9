// Initial placement of the powder block: a tightly packed grid resting just
// below the floor line, typed in KNO3 -> charcoal -> sulfur order.

use crate::domain::reactant::Reactant;
use crate::domain::state::{Particle, ParticleCounts};
use crate::domain::tuning::{CanvasTuning, ParticleTuning};
use glam::Vec2;

pub fn layout_particles(
    counts: ParticleCounts,
    canvas: &CanvasTuning,
    tuning: &ParticleTuning,
) -> Vec<Particle> {
    let total = counts.total;
    if total == 0 {
        return Vec::new();
    }

    let per_row = (total as f64).sqrt().ceil() as usize;
    let cell_width = canvas.width / per_row as f32;
    let cell_height = canvas.height / per_row as f32;

    let bottom_y = canvas.floor_line_y() + canvas.floor_offset;
    let block_width = per_row as f32 * cell_width;
    let start_x = (canvas.width - block_width) / 2.0 + canvas.block_offset_x;

    let mut particles = Vec::with_capacity(total);
    'rows: for row in 0..per_row {
        let y = bottom_y - row as f32 * canvas.spacing - cell_height / 2.0;
        for col in 0..per_row {
            if particles.len() >= total {
                break 'rows;
            }
            let x = start_x + col as f32 * canvas.spacing + cell_width / 2.0;

            let index = particles.len();
            let kind = kind_for_index(index, counts);
            let profile = tuning.profile(kind);
            particles.push(Particle::new(
                index as u64,
                kind,
                Vec2::new(x, y),
                profile.mass,
                profile.radius,
            ));
        }
    }

    particles
}

fn kind_for_index(index: usize, counts: ParticleCounts) -> Reactant {
    if index < counts.kno3 {
        Reactant::Kno3
    } else if index < counts.kno3 + counts.charcoal {
        Reactant::Charcoal
    } else {
        Reactant::Sulfur
    }
}
