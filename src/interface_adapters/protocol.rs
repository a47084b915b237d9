// Wire protocol DTOs and conversions for renderer clients.

use crate::domain::{IngredientRatios, ParticleCounts, ParticleSnapshot, Reactant, ReactionSnapshot};
use crate::use_cases::{ControlEvent, FrameUpdate, RunState, SimulationSettings};
use serde::{Deserialize, Serialize};

/// Messages the server sends to renderer clients over the WebSocket.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum ServerMessage {
    // Static drawing info, sent once per connection.
    Legend(LegendDto),
    // One simulation tick.
    Frame(FrameDto),
    // Run/pause/exhausted transitions for the start button.
    RunState(RunStateDto),
}

/// Messages clients send over the WebSocket or to `POST /control`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ClientMessage {
    Toggle,
    Start,
    Pause,
    Restart,
    SetRatios(RatiosDto),
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RatiosDto {
    pub kno3: f64,
    pub charcoal: f64,
    pub sulfur: f64,
}

impl From<ClientMessage> for ControlEvent {
    fn from(msg: ClientMessage) -> Self {
        match msg {
            ClientMessage::Toggle => ControlEvent::Toggle,
            ClientMessage::Start => ControlEvent::Start,
            ClientMessage::Pause => ControlEvent::Pause,
            ClientMessage::Restart => ControlEvent::Restart,
            ClientMessage::SetRatios(r) => {
                ControlEvent::SetRatios(IngredientRatios::new(r.kno3, r.charcoal, r.sulfur))
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FrameDto {
    pub tick: u64,
    pub run_state: RunStateDto,
    pub reaction: ReactionDto,
    pub counts: CountsDto,
    pub particles: Vec<ParticleDto>,
    pub warning: Option<String>,
}

impl From<FrameUpdate> for FrameDto {
    fn from(frame: FrameUpdate) -> Self {
        Self {
            tick: frame.tick,
            run_state: frame.run_state.into(),
            reaction: frame.reaction.into(),
            counts: frame.counts.into(),
            particles: frame.particles.iter().map(ParticleDto::from).collect(),
            warning: frame.warning,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReactionDto {
    pub time: f64,
    pub kno3_concentration: f64,
    pub charcoal_concentration: f64,
    pub sulfur_concentration: f64,
    pub temperature: f64,
    pub pressure: f64,
    pub energy_release: f64,
    pub burn_rate: f64,
}

impl From<ReactionSnapshot> for ReactionDto {
    fn from(s: ReactionSnapshot) -> Self {
        Self {
            time: s.time,
            kno3_concentration: s.kno3_concentration,
            charcoal_concentration: s.charcoal_concentration,
            sulfur_concentration: s.sulfur_concentration,
            temperature: s.temperature,
            pressure: s.pressure,
            energy_release: s.energy_release,
            burn_rate: s.burn_rate,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CountsDto {
    pub kno3: usize,
    pub charcoal: usize,
    pub sulfur: usize,
    pub total: usize,
}

impl From<ParticleCounts> for CountsDto {
    fn from(c: ParticleCounts) -> Self {
        Self {
            kno3: c.kno3,
            charcoal: c.charcoal,
            sulfur: c.sulfur,
            total: c.total,
        }
    }
}

/// Flattened particle for drawing; color comes from the legend.
#[derive(Debug, Clone, Serialize)]
pub struct ParticleDto {
    pub kind: Reactant,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

impl From<&ParticleSnapshot> for ParticleDto {
    fn from(p: &ParticleSnapshot) -> Self {
        Self {
            kind: p.kind,
            x: p.x,
            y: p.y,
            radius: p.radius,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum RunStateDto {
    Paused,
    Running,
    Exhausted,
}

impl From<RunState> for RunStateDto {
    fn from(state: RunState) -> Self {
        match state {
            RunState::Paused => RunStateDto::Paused,
            RunState::Running => RunStateDto::Running,
            RunState::Exhausted => RunStateDto::Exhausted,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LegendDto {
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub floor_line_y: f32,
    pub reactants: Vec<ReactantLegendDto>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReactantLegendDto {
    pub kind: Reactant,
    pub label: &'static str,
    pub color: [u8; 3],
    pub radius: f32,
    pub mass: f32,
}

impl From<&SimulationSettings> for LegendDto {
    fn from(settings: &SimulationSettings) -> Self {
        Self {
            canvas_width: settings.canvas.width,
            canvas_height: settings.canvas.height,
            floor_line_y: settings.canvas.floor_line_y(),
            reactants: Reactant::ALL
                .iter()
                .map(|&kind| {
                    let profile = settings.particles.profile(kind);
                    ReactantLegendDto {
                        kind,
                        label: kind.name(),
                        color: profile.color,
                        radius: profile.radius,
                        mass: profile.mass,
                    }
                })
                .collect(),
        }
    }
}
