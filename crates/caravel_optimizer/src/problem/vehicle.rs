use serde::{Deserialize, Serialize};

use crate::define_index_newtype;

define_index_newtype!(VehicleIdx, Vehicle);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    external_id: String,
    capacity_kg: f64,
    range_km: f64,
    tank_capacity: f64,
    /// Kilometres travelled per fuel unit.
    fuel_efficiency: f64,
    empty_weight_kg: f64,
}

impl Vehicle {
    pub fn external_id(&self) -> &str {
        &self.external_id
    }

    pub fn capacity_kg(&self) -> f64 {
        self.capacity_kg
    }

    pub fn range_km(&self) -> f64 {
        self.range_km
    }

    pub fn tank_capacity(&self) -> f64 {
        self.tank_capacity
    }

    pub fn fuel_efficiency(&self) -> f64 {
        self.fuel_efficiency
    }

    pub fn empty_weight_kg(&self) -> f64 {
        self.empty_weight_kg
    }

    /// Fuel units burnt over `distance_km`.
    pub fn consumption(&self, distance_km: f64) -> f64 {
        distance_km / self.fuel_efficiency
    }

    /// Heaviest the vehicle can get: empty weight plus a full load.
    pub fn max_gross_weight_kg(&self) -> f64 {
        self.empty_weight_kg + self.capacity_kg
    }
}

#[derive(Default)]
pub struct VehicleBuilder {
    external_id: Option<String>,
    capacity_kg: Option<f64>,
    range_km: Option<f64>,
    tank_capacity: Option<f64>,
    fuel_efficiency: Option<f64>,
    empty_weight_kg: Option<f64>,
}

impl VehicleBuilder {
    pub fn set_vehicle_id(&mut self, external_id: impl Into<String>) -> &mut VehicleBuilder {
        self.external_id = Some(external_id.into());
        self
    }

    pub fn set_capacity_kg(&mut self, capacity_kg: f64) -> &mut VehicleBuilder {
        self.capacity_kg = Some(capacity_kg);
        self
    }

    pub fn set_range_km(&mut self, range_km: f64) -> &mut VehicleBuilder {
        self.range_km = Some(range_km);
        self
    }

    pub fn set_tank_capacity(&mut self, tank_capacity: f64) -> &mut VehicleBuilder {
        self.tank_capacity = Some(tank_capacity);
        self
    }

    pub fn set_fuel_efficiency(&mut self, km_per_unit: f64) -> &mut VehicleBuilder {
        self.fuel_efficiency = Some(km_per_unit);
        self
    }

    pub fn set_empty_weight_kg(&mut self, empty_weight_kg: f64) -> &mut VehicleBuilder {
        self.empty_weight_kg = Some(empty_weight_kg);
        self
    }

    pub fn build(self) -> Vehicle {
        Vehicle {
            external_id: self.external_id.expect("Vehicle ID is required"),
            capacity_kg: self.capacity_kg.expect("Load capacity is required"),
            range_km: self.range_km.unwrap_or(f64::INFINITY),
            tank_capacity: self.tank_capacity.unwrap_or(0.0),
            fuel_efficiency: self.fuel_efficiency.unwrap_or(1.0),
            empty_weight_kg: self.empty_weight_kg.unwrap_or(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_fills_defaults() {
        let mut builder = VehicleBuilder::default();
        builder.set_vehicle_id("V001");
        builder.set_capacity_kg(9_000.0);
        let vehicle = builder.build();

        assert_eq!(vehicle.external_id(), "V001");
        assert_eq!(vehicle.capacity_kg(), 9_000.0);
        assert!(vehicle.range_km().is_infinite());
        assert_eq!(vehicle.empty_weight_kg(), 0.0);
    }

    #[test]
    fn consumption_follows_efficiency() {
        let mut builder = VehicleBuilder::default();
        builder.set_vehicle_id("V001");
        builder.set_capacity_kg(9_000.0);
        builder.set_fuel_efficiency(5.0);
        let vehicle = builder.build();

        assert_eq!(vehicle.consumption(300.0), 60.0);
    }
}
