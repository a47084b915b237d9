/// Chemistry tuning for the gunpowder reaction model.
///
/// Keep this separate from runtime/server configuration (tick rates, ports, etc.).

#[derive(Debug, Clone, Copy)]
pub struct ReactionTuning {
    /// Fixed model step in seconds.
    pub time_step: f64,

    /// Starting temperature in Kelvin.
    pub initial_temperature: f64,

    /// Pressure reported before the first step, in Pa.
    pub initial_pressure: f64,

    /// Ideal gas constant in J/(mol*K).
    pub gas_constant: f64,

    /// First-order decay constants per reactant (KNO3, charcoal, sulfur).
    pub decay_constants: [f64; 3],

    /// Weights turning per-species rates into released energy.
    /// Numerically equal to the decay constants but tuned independently.
    pub energy_weights: [f64; 3],

    /// Scales the burn-rate propulsion term.
    pub burn_rate_force_factor: f64,

    /// Scales the temperature-deviation term.
    pub temperature_force_factor: f64,

    /// Scales the pressure term (disabled by default).
    pub pressure_force_factor: f64,
}

impl Default for ReactionTuning {
    fn default() -> Self {
        Self {
            time_step: 0.001,
            initial_temperature: 298.15,
            initial_pressure: 101_325.0,
            gas_constant: 8.314,
            decay_constants: [0.1, 0.2, 0.15],
            energy_weights: [0.1, 0.2, 0.15],
            burn_rate_force_factor: 0.05 * 10.0,
            temperature_force_factor: 0.01 * 10.0,
            pressure_force_factor: 0.1 * 0.0,
        }
    }
}
