use fxhash::{FxHashMap, FxHashSet};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::DecodeError;
use crate::model::{Model, ModelVariant, variable::VarKey};
use crate::problem::{network::Network, node::NodeIdx, vehicle::VehicleIdx};
use crate::solver::{SolveStatus, SolverOutcome};

use super::route::{Route, RouteEvent};

/// Relative tolerance when comparing replayed state against the solver's
/// own state variables.
const STATE_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StateQuantity {
    Fuel,
    GrossWeight,
}

/// The solver's state variable disagrees with the deterministic replay.
/// Signals a formulation bug; reported, never silently accepted. The
/// replayed value is authoritative for all downstream reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateMismatch {
    pub vehicle: String,
    pub node: String,
    pub quantity: StateQuantity,
    pub solver_value: f64,
    pub replayed_value: f64,
}

/// Ordered, replayed routes for every activated vehicle, plus the solver
/// quality figures carried forward for reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedSolution {
    pub(crate) variant: ModelVariant,
    pub(crate) routes: Vec<Route>,
    pub(crate) objective: f64,
    pub(crate) gap: f64,
    pub(crate) status: SolveStatus,
    pub(crate) mismatches: Vec<StateMismatch>,
}

impl DecodedSolution {
    pub fn variant(&self) -> ModelVariant {
        self.variant
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn objective(&self) -> f64 {
        self.objective
    }

    pub fn gap(&self) -> f64 {
        self.gap
    }

    pub fn status(&self) -> SolveStatus {
        self.status
    }

    pub fn mismatches(&self) -> &[StateMismatch] {
        &self.mismatches
    }

    pub fn total_distance_km(&self) -> f64 {
        self.routes.iter().map(Route::total_distance_km).sum()
    }
}

/// Reassembles ordered routes from the solved arc matrix and replays each
/// one stop by stop. Consumes the outcome; decision state is read exactly
/// once. Rebuilding from the same outcome yields identical routes.
pub fn decode(
    network: &Network,
    model: &Model,
    outcome: SolverOutcome,
) -> Result<DecodedSolution, DecodeError> {
    let assignment = outcome.assignment();
    let mut routes = Vec::new();
    let mut mismatches = Vec::new();

    for vehicle in network.fleet().indices() {
        let activated = model
            .var(&VarKey::VehicleUsed { vehicle })
            .is_some_and(|id| assignment.binary(id));
        if !activated {
            continue;
        }

        let order = walk_route(network, model, &outcome, vehicle)?;
        let route = replay(network, model, &outcome, vehicle, &order, &mut mismatches);
        routes.push(route);
    }

    debug!(
        routes = routes.len(),
        mismatches = mismatches.len(),
        "decoded solver assignment"
    );

    Ok(DecodedSolution {
        variant: model.variant(),
        routes,
        objective: outcome.objective(),
        gap: outcome.gap(),
        status: outcome.status(),
        mismatches,
    })
}

/// Follows the unique used outgoing arc from the depot until the depot
/// recurs. Anything else is a broken arc matrix.
fn walk_route(
    network: &Network,
    model: &Model,
    outcome: &SolverOutcome,
    vehicle: VehicleIdx,
) -> Result<Vec<NodeIdx>, DecodeError> {
    let vehicle_id = || network.vehicle(vehicle).external_id().to_owned();
    let node_id = |node: NodeIdx| network.node(node).external_id().to_owned();

    let mut successor: FxHashMap<NodeIdx, NodeIdx> = FxHashMap::default();
    for arc in network.admissible_arcs(vehicle) {
        let used = model
            .var(&VarKey::ArcUse {
                vehicle,
                from: arc.from(),
                to: arc.to(),
            })
            .is_some_and(|id| outcome.assignment().binary(id));
        if used && successor.insert(arc.from(), arc.to()).is_some() {
            return Err(DecodeError::BranchingRoute {
                vehicle: vehicle_id(),
                node: node_id(arc.from()),
            });
        }
    }

    let depot = network.depot();
    let mut order = vec![depot];
    let mut visited: FxHashSet<NodeIdx> = FxHashSet::default();
    let mut current = depot;
    loop {
        let Some(&next) = successor.get(&current) else {
            return Err(DecodeError::DisconnectedRoute {
                vehicle: vehicle_id(),
                node: node_id(current),
            });
        };
        order.push(next);
        if next == depot {
            return Ok(order);
        }
        if !visited.insert(next) {
            return Err(DecodeError::PrematureCycle {
                vehicle: vehicle_id(),
                node: node_id(next),
            });
        }
        current = next;
    }
}

/// Replays an ordered route arc by arc, recomputing every per-stop state
/// from the inputs alone and cross-checking the solver's fuel and weight
/// variables along the way.
fn replay(
    network: &Network,
    model: &Model,
    outcome: &SolverOutcome,
    vehicle: VehicleIdx,
    order: &[NodeIdx],
    mismatches: &mut Vec<StateMismatch>,
) -> Route {
    let variant = model.variant();
    let assignment = outcome.assignment();
    let profile = network.vehicle(vehicle);
    let depot = network.depot();

    let total_demand: f64 = order
        .iter()
        .filter(|&&node| node != depot)
        .map(|&node| network.node(node).demand_kg())
        .sum();
    let clients_served = order
        .iter()
        .filter(|&&node| network.node(node).is_client())
        .count();

    let mut load = total_demand;
    let mut fuel = variant.tracks_fuel().then(|| {
        model
            .var(&VarKey::FuelLevel {
                vehicle,
                node: depot,
            })
            .map_or(0.0, |id| assignment.value(id))
    });
    let gross = |load: f64| variant.tracks_weight().then(|| profile.empty_weight_kg() + load);

    let mut cumulative_km = 0.0;
    let mut fuel_cost = 0.0;
    let mut toll_cost = 0.0;
    let mut events = vec![RouteEvent {
        node: depot,
        cumulative_km,
        delivered_kg: 0.0,
        load_kg: load,
        fuel,
        refueled: variant.tracks_fuel().then_some(0.0),
        gross_weight_kg: gross(load),
        toll_charge: None,
    }];

    if let Some(weight) = gross(load) {
        check_state(
            network,
            model,
            outcome,
            vehicle,
            depot,
            StateQuantity::GrossWeight,
            weight,
            mismatches,
        );
    }

    for pair in order.windows(2) {
        let (from, to) = (pair[0], pair[1]);
        let distance = network
            .distance_km(from, to)
            .expect("walked arcs exist in the network");
        cumulative_km += distance;

        let node = network.node(to);
        let delivered = if to == depot { 0.0 } else { node.demand_kg() };
        load -= delivered;

        let mut refueled = None;
        if let Some(level) = fuel.as_mut() {
            *level -= profile.consumption(distance);
            let bought = if node.is_station() {
                model
                    .var(&VarKey::Refuel { vehicle, node: to })
                    .map_or(0.0, |id| assignment.value(id))
            } else {
                0.0
            };
            *level += bought;
            fuel_cost += bought * node.fuel_price().unwrap_or(0.0);
            refueled = Some(bought);
        }

        let weight = gross(load);
        let toll_charge = match (node.toll_rates(), weight) {
            (Some((base_rate, rate_per_ton)), Some(weight)) => {
                let charge = base_rate + weight / 1_000.0 * rate_per_ton;
                toll_cost += charge;
                Some(charge)
            }
            _ => None,
        };

        if to != depot {
            if let Some(level) = fuel {
                check_state(
                    network,
                    model,
                    outcome,
                    vehicle,
                    to,
                    StateQuantity::Fuel,
                    level,
                    mismatches,
                );
            }
            if let Some(weight) = weight {
                check_state(
                    network,
                    model,
                    outcome,
                    vehicle,
                    to,
                    StateQuantity::GrossWeight,
                    weight,
                    mismatches,
                );
            }
        }

        events.push(RouteEvent {
            node: to,
            cumulative_km,
            delivered_kg: delivered,
            load_kg: load,
            fuel,
            refueled,
            gross_weight_kg: weight,
            toll_charge,
        });
    }

    Route {
        vehicle,
        events,
        clients_served,
        fuel_cost,
        toll_cost,
    }
}

#[allow(clippy::too_many_arguments)]
fn check_state(
    network: &Network,
    model: &Model,
    outcome: &SolverOutcome,
    vehicle: VehicleIdx,
    node: NodeIdx,
    quantity: StateQuantity,
    replayed_value: f64,
    mismatches: &mut Vec<StateMismatch>,
) {
    let key = match quantity {
        StateQuantity::Fuel => VarKey::FuelLevel { vehicle, node },
        StateQuantity::GrossWeight => VarKey::GrossWeight { vehicle, node },
    };
    let Some(id) = model.var(&key) else {
        return;
    };
    let solver_value = outcome.assignment().value(id);

    let scale = solver_value.abs().max(replayed_value.abs()).max(1.0);
    if (solver_value - replayed_value).abs() > STATE_TOLERANCE * scale {
        let mismatch = StateMismatch {
            vehicle: network.vehicle(vehicle).external_id().to_owned(),
            node: network.node(node).external_id().to_owned(),
            quantity,
            solver_value,
            replayed_value,
        };
        warn!(
            vehicle = %mismatch.vehicle,
            node = %mismatch.node,
            ?quantity,
            solver_value,
            replayed_value,
            "solver state variable disagrees with route replay"
        );
        mismatches.push(mismatch);
    }
}
