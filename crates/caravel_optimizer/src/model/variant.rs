use serde::{Deserialize, Serialize};

/// The three formulations form a strict ladder; every richer variant keeps
/// the full constraint skeleton of the one below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelVariant {
    /// Capacity and range limits only.
    Capacity,
    /// Adds fuel-tank state and mid-route refueling at stations.
    Fuel,
    /// Adds gross-weight state, municipal weight ceilings, and
    /// weight-dependent toll charges.
    FuelTolls,
}

impl ModelVariant {
    pub fn tracks_fuel(&self) -> bool {
        !matches!(self, ModelVariant::Capacity)
    }

    pub fn tracks_weight(&self) -> bool {
        matches!(self, ModelVariant::FuelTolls)
    }

    /// The explicit range limit only binds when fuel is not modelled;
    /// fuel-balance feasibility supersedes it otherwise.
    pub fn enforces_range(&self) -> bool {
        matches!(self, ModelVariant::Capacity)
    }
}
