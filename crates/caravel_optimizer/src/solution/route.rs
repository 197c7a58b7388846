use serde::Serialize;

use crate::problem::{node::NodeIdx, vehicle::VehicleIdx};

/// State of one vehicle at one stop, produced once by the decoder's replay
/// and never mutated afterwards. Fuel and weight are present only when the
/// model variant tracks them; a toll charge only at toll plazas.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteEvent {
    pub(crate) node: NodeIdx,
    pub(crate) cumulative_km: f64,
    /// Demand satisfied at this stop; 0 at the depot, stations and tolls.
    pub(crate) delivered_kg: f64,
    /// Cargo still on board after serving this stop.
    pub(crate) load_kg: f64,
    pub(crate) fuel: Option<f64>,
    pub(crate) refueled: Option<f64>,
    /// Empty weight plus remaining cargo, after serving this stop.
    pub(crate) gross_weight_kg: Option<f64>,
    pub(crate) toll_charge: Option<f64>,
}

impl RouteEvent {
    pub fn node(&self) -> NodeIdx {
        self.node
    }

    pub fn cumulative_km(&self) -> f64 {
        self.cumulative_km
    }

    pub fn delivered_kg(&self) -> f64 {
        self.delivered_kg
    }

    pub fn load_kg(&self) -> f64 {
        self.load_kg
    }

    pub fn fuel(&self) -> Option<f64> {
        self.fuel
    }

    pub fn refueled(&self) -> Option<f64> {
        self.refueled
    }

    pub fn gross_weight_kg(&self) -> Option<f64> {
        self.gross_weight_kg
    }

    pub fn toll_charge(&self) -> Option<f64> {
        self.toll_charge
    }
}

/// Closed, ordered itinerary of one activated vehicle, depot to depot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    pub(crate) vehicle: VehicleIdx,
    pub(crate) events: Vec<RouteEvent>,
    pub(crate) clients_served: usize,
    pub(crate) fuel_cost: f64,
    pub(crate) toll_cost: f64,
}

impl Route {
    pub fn vehicle(&self) -> VehicleIdx {
        self.vehicle
    }

    pub fn events(&self) -> &[RouteEvent] {
        &self.events
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeIdx> {
        self.events.iter().map(RouteEvent::node)
    }

    pub fn clients_served(&self) -> usize {
        self.clients_served
    }

    pub fn total_distance_km(&self) -> f64 {
        self.events.last().map_or(0.0, RouteEvent::cumulative_km)
    }

    /// Cargo on board when leaving the depot.
    pub fn initial_load_kg(&self) -> f64 {
        self.events.first().map_or(0.0, RouteEvent::load_kg)
    }

    pub fn delivered_kg(&self) -> f64 {
        self.events.iter().map(RouteEvent::delivered_kg).sum()
    }

    pub fn fuel_cost(&self) -> f64 {
        self.fuel_cost
    }

    pub fn toll_cost(&self) -> f64 {
        self.toll_cost
    }
}
