use crate::error::SolveError;
use crate::model::{Model, variable::VarKey};
use crate::problem::network::Network;

use super::{
    adapter::MilpSolver,
    budget::SolveBudget,
    outcome::{Assignment, SolveStatus, SolverOutcome},
};

/// One vehicle's itinerary for the [`ScriptedSolver`]: the non-depot stops
/// in visit order, with optional departure fuel and station refuels.
#[derive(Debug, Clone)]
pub struct PlannedRoute {
    vehicle: String,
    stops: Vec<String>,
    initial_fuel: Option<f64>,
    refuels: Vec<(String, f64)>,
}

impl PlannedRoute {
    pub fn new(vehicle: impl Into<String>, stops: &[&str]) -> Self {
        Self {
            vehicle: vehicle.into(),
            stops: stops.iter().map(|s| (*s).to_owned()).collect(),
            initial_fuel: None,
            refuels: Vec::new(),
        }
    }

    /// Departure fuel; defaults to a full tank.
    pub fn with_initial_fuel(mut self, units: f64) -> Self {
        self.initial_fuel = Some(units);
        self
    }

    pub fn with_refuel(mut self, station: impl Into<String>, units: f64) -> Self {
        self.refuels.push((station.into(), units));
        self
    }
}

/// Deterministic stand-in for an external MIP engine: it converts scripted
/// itineraries into the exact variable assignment a real backend would
/// return for them. Useful for tests and for exercising the decode/verify
/// pipeline without a solver installation. It does not check feasibility;
/// the verifier is expected to do that downstream.
pub struct ScriptedSolver {
    network: Network,
    plans: Vec<PlannedRoute>,
}

impl ScriptedSolver {
    pub fn new(network: Network, plans: Vec<PlannedRoute>) -> Self {
        Self { network, plans }
    }
}

impl MilpSolver for ScriptedSolver {
    fn solve(&self, model: &Model, _budget: &SolveBudget) -> Result<SolverOutcome, SolveError> {
        let network = &self.network;
        let mut values = vec![0.0; model.variables().len()];

        let set = |key: VarKey, value: f64, values: &mut Vec<f64>| -> Result<(), SolveError> {
            let id = model
                .var(&key)
                .ok_or_else(|| SolveError::Backend(format!("no variable for {key:?}")))?;
            values[id.get()] = value;
            Ok(())
        };

        for plan in &self.plans {
            let vehicle = network
                .find_vehicle(&plan.vehicle)
                .ok_or_else(|| SolveError::Backend(format!("unknown vehicle {}", plan.vehicle)))?;
            let stops = plan
                .stops
                .iter()
                .map(|id| {
                    network
                        .find_node(id)
                        .ok_or_else(|| SolveError::Backend(format!("unknown node {id}")))
                })
                .collect::<Result<Vec<_>, _>>()?;

            let depot = network.depot();
            let mut order = vec![depot];
            order.extend(&stops);
            order.push(depot);

            set(VarKey::VehicleUsed { vehicle }, 1.0, &mut values)?;
            for pair in order.windows(2) {
                set(
                    VarKey::ArcUse {
                        vehicle,
                        from: pair[0],
                        to: pair[1],
                    },
                    1.0,
                    &mut values,
                )?;
            }
            for (position, &node) in stops.iter().enumerate() {
                set(
                    VarKey::VisitOrder { vehicle, node },
                    (position + 1) as f64,
                    &mut values,
                )?;
            }

            let profile = network.vehicle(vehicle);
            if model.variant().tracks_fuel() {
                let mut fuel = plan.initial_fuel.unwrap_or(profile.tank_capacity());
                set(VarKey::FuelLevel { vehicle, node: depot }, fuel, &mut values)?;
                for pair in order.windows(2) {
                    let (from, to) = (pair[0], pair[1]);
                    let distance = network
                        .distance_km(from, to)
                        .ok_or_else(|| SolveError::Backend("arc not in network".to_owned()))?;
                    fuel -= profile.consumption(distance);
                    if to == depot {
                        // The depot variable keeps the departure value.
                        continue;
                    }
                    let refuel = plan
                        .refuels
                        .iter()
                        .find(|(id, _)| network.find_node(id) == Some(to))
                        .map(|&(_, units)| units)
                        .unwrap_or(0.0);
                    if network.node(to).is_station() {
                        set(VarKey::Refuel { vehicle, node: to }, refuel, &mut values)?;
                        fuel += refuel;
                    }
                    set(VarKey::FuelLevel { vehicle, node: to }, fuel, &mut values)?;
                }
            }

            if model.variant().tracks_weight() {
                let total: f64 = stops.iter().map(|&n| network.node(n).demand_kg()).sum();
                let mut weight = profile.empty_weight_kg() + total;
                set(
                    VarKey::GrossWeight { vehicle, node: depot },
                    weight,
                    &mut values,
                )?;
                for &node in &stops {
                    weight -= network.node(node).demand_kg();
                    set(VarKey::GrossWeight { vehicle, node }, weight, &mut values)?;
                    if network.node(node).is_toll() {
                        set(VarKey::TolledWeight { vehicle, node }, weight, &mut values)?;
                    }
                }
            }
        }

        let objective = model.objective().evaluate(&values);
        Ok(SolverOutcome::new(
            Assignment::new(values),
            objective,
            0.0,
            SolveStatus::Optimal,
        ))
    }
}
