use crate::domain::reactant::Reactant;

/// Per-reactant body properties.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReactantProfile {
    /// Molecular mass in g/mol, used directly as the body mass.
    pub mass: f32,

    /// Collision radius in pixels.
    pub radius: f32,

    /// Display color (RGB); only forwarded to the renderer.
    pub color: [u8; 3],
}

/// Physics tuning for the particle field.
#[derive(Debug, Clone, Copy)]
pub struct ParticleTuning {
    /// Downward acceleration applied every integrated frame.
    pub gravity: f32,

    /// Collision elasticity (1.0 = elastic, 0.0 = inelastic).
    pub restitution: f32,

    /// Frames advanced per tick; the sketch moves one frame per tick.
    pub frame_step: f32,

    pub kno3: ReactantProfile,
    pub charcoal: ReactantProfile,
    pub sulfur: ReactantProfile,
}

// Visual scale shared by all radii (radius = estimated size in nm * SMALLNESS).
const SMALLNESS: f32 = 15.0;

impl Default for ParticleTuning {
    fn default() -> Self {
        Self {
            gravity: 0.0002,
            restitution: 0.8,
            frame_step: 1.0,
            kno3: ReactantProfile {
                mass: 101.1,
                radius: 0.4 * SMALLNESS,
                color: [255, 0, 0],
            },
            charcoal: ReactantProfile {
                mass: 12.01,
                radius: 0.2 * SMALLNESS,
                color: [0, 0, 0],
            },
            sulfur: ReactantProfile {
                mass: 32.07,
                radius: 0.4 * SMALLNESS,
                color: [255, 255, 0],
            },
        }
    }
}

impl ParticleTuning {
    pub fn profile(&self, kind: Reactant) -> ReactantProfile {
        match kind {
            Reactant::Kno3 => self.kno3,
            Reactant::Charcoal => self.charcoal,
            Reactant::Sulfur => self.sulfur,
        }
    }
}

/// Sketch canvas geometry used to lay out the initial particle block.
#[derive(Debug, Clone, Copy)]
pub struct CanvasTuning {
    pub width: f32,
    pub height: f32,

    /// Fraction of the canvas height where the floor line is drawn.
    pub floor_fraction: f32,

    /// Distance below the floor line where the bottom row sits.
    pub floor_offset: f32,

    /// Horizontal shift of the block from the centred position.
    pub block_offset_x: f32,

    /// Spacing between neighbouring particles, in pixels.
    pub spacing: f32,
}

impl Default for CanvasTuning {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            floor_fraction: 0.9,
            floor_offset: 10.0,
            block_offset_x: 300.0,
            spacing: 3.0,
        }
    }
}

impl CanvasTuning {
    pub fn floor_line_y(&self) -> f32 {
        self.height * self.floor_fraction
    }
}
