// The three ingredients of black powder.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reactant {
    /// Potassium nitrate (the oxidizer).
    Kno3,
    Charcoal,
    Sulfur,
}

impl Reactant {
    /// All reactants in canonical order; arrays indexed by `index()` follow it.
    pub const ALL: [Reactant; 3] = [Reactant::Kno3, Reactant::Charcoal, Reactant::Sulfur];

    pub fn index(self) -> usize {
        match self {
            Reactant::Kno3 => 0,
            Reactant::Charcoal => 1,
            Reactant::Sulfur => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Reactant::Kno3 => "KNO3",
            Reactant::Charcoal => "charcoal",
            Reactant::Sulfur => "sulfur",
        }
    }
}
