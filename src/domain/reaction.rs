// Simplified black-powder kinetics: first-order decay of each ingredient,
// a temperature driven by released energy, and an ideal-gas pressure.

use crate::domain::ratios::IngredientRatios;
use crate::domain::reactant::Reactant;
use crate::domain::state::{BurnRateSample, ParticleCounts, ReactionSnapshot};
use crate::domain::tuning::ReactionTuning;
use glam::Vec2;
use tracing::info;

/// Result of a single `advance` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    Advanced,
    /// The model is frozen; nothing changed.
    Exhausted,
}

pub struct ReactionModel {
    ratios: IngredientRatios,
    tuning: ReactionTuning,
    particle_budget: usize,

    time: f64,
    concentrations: [f64; 3],
    temperature: f64,
    pressure: f64,
    energy_release: f64,
    total_consumed: f64,
    burn_rate: f64,

    counts: ParticleCounts,
    burn_rate_log: Vec<BurnRateSample>,
    exhausted: bool,
}

impl ReactionModel {
    pub fn new(ratios: IngredientRatios, particle_budget: usize, tuning: ReactionTuning) -> Self {
        let concentrations = ratios.as_array();
        Self {
            ratios,
            tuning,
            particle_budget,
            time: 0.0,
            concentrations,
            temperature: tuning.initial_temperature,
            pressure: tuning.initial_pressure,
            energy_release: 0.0,
            total_consumed: 0.0,
            burn_rate: 0.0,
            counts: counts_for(&concentrations, particle_budget),
            burn_rate_log: Vec::new(),
            exhausted: false,
        }
    }

    /// Advances the model by one fixed time step.
    pub fn advance(&mut self) -> AdvanceOutcome {
        if self.exhausted {
            return AdvanceOutcome::Exhausted;
        }
        if self.reached_exhaustion() {
            self.exhausted = true;
            let peak = self
                .burn_rate_log
                .iter()
                .map(|s| s.burn_rate)
                .fold(0.0_f64, f64::max);
            info!(
                time = self.time,
                samples = self.burn_rate_log.len(),
                peak_burn_rate = peak,
                final_burn_rate = self.burn_rate,
                "reaction exhausted"
            );
            return AdvanceOutcome::Exhausted;
        }

        let dt = self.tuning.time_step;
        let rates = self.rates();

        for (c, rate) in self.concentrations.iter_mut().zip(rates) {
            *c = (*c + rate * dt).max(0.0);
        }
        self.counts = counts_for(&self.concentrations, self.particle_budget);

        let weighted: f64 = self
            .tuning
            .energy_weights
            .iter()
            .zip(rates)
            .map(|(w, r)| w * r)
            .sum();
        self.energy_release = -weighted * dt;

        let initial_total = self.ratios.sum();
        if initial_total > 0.0 {
            self.temperature += self.energy_release / initial_total;
        }

        let moles: f64 = self.concentrations.iter().sum();
        self.pressure = moles * self.tuning.gas_constant * self.temperature;

        self.burn_rate = self.mean_consumption_per_step() * 100.0;
        self.burn_rate_log.push(BurnRateSample {
            time: self.time,
            burn_rate: self.burn_rate,
        });

        self.time += dt;
        self.total_consumed += rates.iter().sum::<f64>().abs();

        AdvanceOutcome::Advanced
    }

    /// Uniform force applied to every particle for the current tick.
    ///
    /// All three terms act along the y axis: propulsion from the burn rate,
    /// a restoring term from the temperature rise, and a pressure term.
    pub fn compute_forces(&self) -> Vec2 {
        if self.time <= 0.0 {
            return Vec2::ZERO;
        }

        let propulsion = self.mean_consumption_per_step() * self.tuning.burn_rate_force_factor;
        let delta_temperature = self.temperature - self.tuning.initial_temperature;
        let thermal = -delta_temperature * self.tuning.temperature_force_factor;
        let pressure = -self.pressure * self.tuning.pressure_force_factor;

        Vec2::new(0.0, (propulsion + thermal + pressure) as f32)
    }

    pub fn snapshot(&self) -> ReactionSnapshot {
        ReactionSnapshot {
            time: self.time,
            kno3_concentration: self.concentrations[0],
            charcoal_concentration: self.concentrations[1],
            sulfur_concentration: self.concentrations[2],
            temperature: self.temperature,
            pressure: self.pressure,
            energy_release: self.energy_release * 1e5,
            burn_rate: self.burn_rate,
        }
    }

    pub fn particle_counts(&self) -> ParticleCounts {
        self.counts
    }

    pub fn burn_rate_history(&self) -> &[BurnRateSample] {
        &self.burn_rate_log
    }

    pub fn concentration(&self, kind: Reactant) -> f64 {
        self.concentrations[kind.index()]
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn ratios(&self) -> IngredientRatios {
        self.ratios
    }

    pub fn particle_budget(&self) -> usize {
        self.particle_budget
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    fn rates(&self) -> [f64; 3] {
        let k = self.tuning.decay_constants;
        let c = self.concentrations;
        let sulfur_rate = if self.ratios.sulfur == 0.0 {
            0.0
        } else {
            -k[2] * c[2]
        };
        [-k[0] * c[0], -k[1] * c[1], sulfur_rate]
    }

    // Consumed reactant per elapsed step; zero before the first step completes.
    fn mean_consumption_per_step(&self) -> f64 {
        let steps = self.time / self.tuning.time_step;
        if steps > 0.0 {
            self.total_consumed / steps
        } else {
            0.0
        }
    }

    // Sulfur is optional: a sulfur-free mix never exhausts on sulfur.
    fn reached_exhaustion(&self) -> bool {
        self.counts.kno3 == 0
            || self.concentrations[1] <= 0.0
            || (self.ratios.sulfur > 0.0 && self.concentrations[2] <= 0.0)
    }
}

fn counts_for(concentrations: &[f64; 3], budget: usize) -> ParticleCounts {
    // `as usize` saturates negative values at zero.
    let per_type = concentrations.map(|c| (c * budget as f64).floor() as usize);
    ParticleCounts::new(per_type[0], per_type[1], per_type[2])
}
