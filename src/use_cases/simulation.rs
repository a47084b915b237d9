// Simulation driver: owns one reaction model and one particle field and
// advances both together, one complete tick at a time.

use super::types::{ControlEvent, FrameUpdate, RunState, TickOutcome};
use crate::domain::tuning::{CanvasTuning, ParticleTuning, ReactionTuning};
use crate::domain::{
    AdvanceOutcome, EvictionPolicy, IngredientRatios, ParticleField, RatioError, ReactionModel,
};
use tracing::{debug, info, warn};

/// Everything needed to (re)build the model and field.
#[derive(Debug, Clone, Copy)]
pub struct SimulationSettings {
    pub particle_budget: usize,
    pub eviction: EvictionPolicy,
    pub reaction: ReactionTuning,
    pub particles: ParticleTuning,
    pub canvas: CanvasTuning,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            particle_budget: 750,
            eviction: EvictionPolicy::default(),
            reaction: ReactionTuning::default(),
            particles: ParticleTuning::default(),
            canvas: CanvasTuning::default(),
        }
    }
}

pub struct Simulation {
    settings: SimulationSettings,
    pending_ratios: IngredientRatios,
    model: ReactionModel,
    field: ParticleField,
    run_state: RunState,
    warning: Option<String>,
    tick: u64,
}

impl Simulation {
    /// Builds a paused simulation. Fails if the ratios cannot drive a run.
    pub fn new(ratios: IngredientRatios, settings: SimulationSettings) -> Result<Self, RatioError> {
        ratios.validate()?;
        let (model, field) = build(ratios, &settings);
        Ok(Self {
            settings,
            pending_ratios: ratios,
            model,
            field,
            run_state: RunState::Paused,
            warning: None,
            tick: 0,
        })
    }

    pub fn handle_event(&mut self, event: ControlEvent) {
        match event {
            ControlEvent::Toggle => match self.run_state {
                RunState::Paused => self.set_run_state(RunState::Running),
                RunState::Running => self.set_run_state(RunState::Paused),
                RunState::Exhausted => warn!("reaction exhausted; restart to run again"),
            },
            ControlEvent::Start => {
                if self.run_state == RunState::Exhausted {
                    warn!("reaction exhausted; restart to run again");
                } else {
                    self.set_run_state(RunState::Running);
                }
            }
            ControlEvent::Pause => {
                if self.run_state == RunState::Running {
                    self.set_run_state(RunState::Paused);
                }
            }
            ControlEvent::Restart => {
                if let Err(err) = self.restart() {
                    warn!(%err, "restart rejected");
                }
            }
            ControlEvent::SetRatios(ratios) => {
                debug!(
                    kno3 = ratios.kno3,
                    charcoal = ratios.charcoal,
                    sulfur = ratios.sulfur,
                    "ingredient ratios updated"
                );
                self.pending_ratios = ratios;
                if ratios.validate().is_ok() {
                    self.warning = None;
                }
            }
        }
    }

    /// Reconstructs the model and field from the pending ratios and pauses.
    /// On invalid input nothing changes and the warning is recorded.
    pub fn restart(&mut self) -> Result<(), RatioError> {
        if let Err(err) = self.pending_ratios.validate() {
            self.warning = Some(err.to_string());
            return Err(err);
        }

        let (model, field) = build(self.pending_ratios, &self.settings);
        self.model = model;
        self.field = field;
        self.warning = None;
        self.set_run_state(RunState::Paused);
        info!(
            particles = self.field.len(),
            kno3 = self.pending_ratios.kno3,
            charcoal = self.pending_ratios.charcoal,
            sulfur = self.pending_ratios.sulfur,
            "simulation restarted"
        );
        Ok(())
    }

    /// Runs one complete tick.
    pub fn tick(&mut self) -> TickOutcome {
        self.tick += 1;
        let dt = self.settings.particles.frame_step;

        if self.run_state != RunState::Running {
            self.field.coast(dt);
            return TickOutcome::Idle;
        }

        if let Err(err) = self.pending_ratios.validate() {
            self.warning = Some(err.to_string());
            self.set_run_state(RunState::Paused);
            return TickOutcome::Rejected(err);
        }

        if self.model.advance() == AdvanceOutcome::Exhausted {
            self.set_run_state(RunState::Exhausted);
            self.field.coast(dt);
            return TickOutcome::Exhausted;
        }

        self.field.resize(self.model.particle_counts());
        let force = self.model.compute_forces();
        self.field.integrate(force, dt);
        self.field.resolve_collisions();
        self.warning = None;

        TickOutcome::Advanced
    }

    pub fn frame(&self) -> FrameUpdate {
        FrameUpdate {
            tick: self.tick,
            run_state: self.run_state,
            reaction: self.model.snapshot(),
            counts: self.model.particle_counts(),
            particles: self.field.snapshots(),
            warning: self.warning.clone(),
        }
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub fn model(&self) -> &ReactionModel {
        &self.model
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub fn pending_ratios(&self) -> IngredientRatios {
        self.pending_ratios
    }

    pub fn warning(&self) -> Option<&str> {
        self.warning.as_deref()
    }

    pub fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    fn set_run_state(&mut self, next: RunState) {
        if self.run_state != next {
            info!(from = ?self.run_state, to = ?next, "run state changed");
            self.run_state = next;
        }
    }
}

fn build(ratios: IngredientRatios, settings: &SimulationSettings) -> (ReactionModel, ParticleField) {
    let model = ReactionModel::new(ratios, settings.particle_budget, settings.reaction);
    let field = ParticleField::from_layout(
        model.particle_counts(),
        &settings.canvas,
        settings.particles,
        settings.eviction,
    );
    (model, field)
}
