use serde::{Deserialize, Serialize};

/// Operating cost structure shared by every model variant. Fuel and toll
/// prices live on the network nodes; this covers the distance-independent
/// and distance-proportional components plus the cruise speed used for
/// travel-time estimates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostSchedule {
    /// Charged once per activated vehicle.
    pub fixed_per_vehicle: f64,
    pub per_km: f64,
    pub average_speed_kmh: f64,
}

impl CostSchedule {
    pub fn travel_time_minutes(&self, distance_km: f64) -> f64 {
        distance_km / self.average_speed_kmh * 60.0
    }
}

impl Default for CostSchedule {
    fn default() -> Self {
        Self {
            fixed_per_vehicle: 300_000.0,
            per_km: 3_000.0,
            average_speed_kmh: 60.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn travel_time_uses_average_speed() {
        let costs = CostSchedule::default();
        assert_eq!(costs.travel_time_minutes(60.0), 60.0);
        assert_eq!(costs.travel_time_minutes(30.0), 30.0);
    }
}
