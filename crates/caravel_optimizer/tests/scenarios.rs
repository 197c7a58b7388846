use std::f64::consts::PI;

use caravel_optimizer::error::ConstraintCategory;
use caravel_optimizer::model::{ModelBuilder, ModelVariant};
use caravel_optimizer::problem::costs::CostSchedule;
use caravel_optimizer::problem::location::Location;
use caravel_optimizer::problem::network::{Network, NetworkBuilder};
use caravel_optimizer::problem::node::Node;
use caravel_optimizer::problem::vehicle::{Vehicle, VehicleBuilder};
use caravel_optimizer::solution::{decode, dispatch_rows, verify};
use caravel_optimizer::solver::{
    MilpSolver, PlannedRoute, ScriptedSolver, SolveBudget, SolveStatus, SolverOutcome,
};

const KM_PER_DEGREE: f64 = 6_371.008_8 * PI / 180.0;

fn km_north(km: f64) -> Location {
    Location::from_lat_lon(km / KM_PER_DEGREE, 0.0)
}

fn vehicle(id: &str, capacity_kg: f64, configure: impl FnOnce(&mut VehicleBuilder)) -> Vehicle {
    let mut builder = VehicleBuilder::default();
    builder.set_vehicle_id(id);
    builder.set_capacity_kg(capacity_kg);
    configure(&mut builder);
    builder.build()
}

/// One depot, two clients at 10 and 20 km with demand 5 each, one vehicle
/// with capacity 10 and range 100.
fn delivery_network() -> Network {
    let mut builder = NetworkBuilder::default();
    builder.add_node(Node::depot("CD01", km_north(0.0)));
    builder.add_node(Node::client("C001", km_north(10.0), 5.0));
    builder.add_node(Node::client("C002", km_north(20.0), 5.0));
    builder.add_vehicle(vehicle("V001", 10.0, |b| {
        b.set_range_km(100.0);
    }));
    builder.build().unwrap()
}

/// A 300 km round trip on a 250 km tank with a station at the far turn.
fn refueling_network() -> Network {
    let mut builder = NetworkBuilder::default();
    builder.add_node(Node::depot("CD01", km_north(0.0)));
    builder.add_node(Node::client("C001", km_north(100.0), 5.0));
    builder.add_node(Node::station("E001", km_north(150.0), 5_000.0));
    builder.add_vehicle(vehicle("V001", 10.0, |b| {
        b.set_tank_capacity(50.0);
        b.set_fuel_efficiency(5.0);
    }));
    builder.build().unwrap()
}

/// Two 6 000 kg deliveries, the farther client behind a 12 000 kg municipal
/// limit and a weight-priced toll plaza.
fn weight_restricted_network() -> Network {
    let mut builder = NetworkBuilder::default();
    builder.add_node(Node::depot("CD01", km_north(0.0)));
    builder.add_node(Node::client("C001", km_north(50.0), 6_000.0));
    builder.add_node(Node::toll("P001", km_north(75.0), 10_000.0, 500.0));
    builder.add_node(Node::restricted_client(
        "C002",
        km_north(100.0),
        6_000.0,
        12_000.0,
    ));
    builder.add_vehicle(vehicle("V001", 12_000.0, |b| {
        b.set_empty_weight_kg(8_000.0);
        b.set_tank_capacity(50.0);
        b.set_fuel_efficiency(5.0);
    }));
    builder.build().unwrap()
}

#[test]
fn capacity_saturated_single_route() {
    let network = delivery_network();
    let costs = CostSchedule::default();
    let model = ModelBuilder::new(&network, &costs, ModelVariant::Capacity)
        .build()
        .unwrap();
    let solver = ScriptedSolver::new(
        network.clone(),
        vec![PlannedRoute::new("V001", &["C001", "C002"])],
    );

    let outcome = solver.solve(&model, &SolveBudget::default()).unwrap();
    let decoded = decode(&network, &model, outcome).unwrap();
    let report = verify(&network, &decoded);
    assert!(report.passed(), "{:?}", report.violations());

    let route = &decoded.routes()[0];
    // Both legs out plus the return: 10 + 10 + 20 km.
    assert!((route.total_distance_km() - 40.0).abs() < 0.1);
    // Demands 5 + 5 exactly fill the 10 kg vehicle.
    assert_eq!(route.initial_load_kg(), 10.0);
    assert_eq!(route.clients_served(), 2);
}

#[test]
fn dispatch_rows_match_the_published_layout() {
    let network = delivery_network();
    let costs = CostSchedule::default();
    let model = ModelBuilder::new(&network, &costs, ModelVariant::Capacity)
        .build()
        .unwrap();
    let solver = ScriptedSolver::new(
        network.clone(),
        vec![PlannedRoute::new("V001", &["C001", "C002"])],
    );
    let outcome = solver.solve(&model, &SolveBudget::default()).unwrap();
    let decoded = decode(&network, &model, outcome).unwrap();

    let rows = dispatch_rows(&network, &costs, &decoded);
    assert_eq!(rows.len(), 1);
    let row = &rows[0];

    assert_eq!(row.vehicle_id, "V001");
    assert_eq!(row.depot_id, "CD01");
    assert_eq!(row.route_sequence, "CD01-C001-C002-CD01");
    assert_eq!(row.demands_satisfied, "0-5-5-0");
    assert_eq!(row.clients_served, 2);

    // First and last sequence elements are the depot; the rest are the
    // served clients.
    let elements: Vec<&str> = row.route_sequence.split('-').collect();
    assert_eq!(elements.first(), Some(&"CD01"));
    assert_eq!(elements.last(), Some(&"CD01"));
    assert_eq!(elements.len() - 2, row.clients_served);
    assert_eq!(
        row.demands_satisfied.split('-').count(),
        elements.len(),
        "one demand entry per stop"
    );

    assert_eq!(row.total_distance_km, 40.0);
    // 40 km at 60 km/h.
    assert_eq!(row.total_time_min, 40.0);
    assert_eq!(row.capacity_utilization_pct, 100.0);
    assert_eq!(row.range_utilization_pct, Some(40.0));
    assert_eq!(
        row.total_cost,
        row.fixed_cost + row.distance_cost + row.fuel_cost + row.toll_cost
    );
    assert_eq!(row.fuel_cost, 0.0);
}

#[test]
fn mid_route_refuel_keeps_the_tank_non_negative() {
    let network = refueling_network();
    let costs = CostSchedule::default();
    let model = ModelBuilder::new(&network, &costs, ModelVariant::Fuel)
        .build()
        .unwrap();
    let solver = ScriptedSolver::new(
        network.clone(),
        vec![PlannedRoute::new("V001", &["C001", "E001"]).with_refuel("E001", 10.0)],
    );

    let outcome = solver.solve(&model, &SolveBudget::default()).unwrap();
    let decoded = decode(&network, &model, outcome).unwrap();
    let report = verify(&network, &decoded);
    assert!(report.passed(), "{:?}", report.violations());
    assert!(decoded.mismatches().is_empty());

    let route = &decoded.routes()[0];
    assert!(
        route
            .events()
            .iter()
            .all(|event| event.fuel().unwrap() >= -1e-9)
    );
    let refuels: Vec<f64> = route
        .events()
        .iter()
        .filter_map(|event| event.refueled())
        .filter(|&units| units > 0.0)
        .collect();
    assert_eq!(refuels, [10.0], "exactly one nonzero refuel event");

    let rows = dispatch_rows(&network, &costs, &decoded);
    assert_eq!(rows[0].fuel_cost, 50_000.0);
}

#[test]
fn delivery_order_decides_the_weight_limit() {
    let network = weight_restricted_network();
    let costs = CostSchedule::default();
    let model = ModelBuilder::new(&network, &costs, ModelVariant::FuelTolls)
        .build()
        .unwrap();

    // Unload 6 000 kg at C001 first: the restricted client is entered at
    // 14 000 kg and left at 8 000 kg, inside its 12 000 kg limit.
    let good = ScriptedSolver::new(
        network.clone(),
        vec![PlannedRoute::new("V001", &["C001", "P001", "C002"])],
    );
    let outcome = good.solve(&model, &SolveBudget::default()).unwrap();
    let decoded = decode(&network, &model, outcome).unwrap();
    let report = verify(&network, &decoded);
    assert!(report.passed(), "{:?}", report.violations());

    let rows = dispatch_rows(&network, &costs, &decoded);
    // 10 000 base + 14 t * 500 through the plaza.
    assert_eq!(rows[0].toll_cost, 17_000.0);

    // Visiting the restricted client with everything still on board must be
    // rejected by the verifier.
    let bad = ScriptedSolver::new(
        network.clone(),
        vec![PlannedRoute::new("V001", &["C002", "P001", "C001"])],
    );
    let outcome = bad.solve(&model, &SolveBudget::default()).unwrap();
    let decoded = decode(&network, &model, outcome).unwrap();
    let report = verify(&network, &decoded);
    assert_eq!(
        report.category_passed(ConstraintCategory::Weight),
        Some(false)
    );
    let failure = report.into_result().unwrap_err();
    assert_eq!(failure.vehicle, "V001");
    assert_eq!(failure.node, "C002");
}

#[test]
fn redecoding_is_byte_identical() {
    let network = weight_restricted_network();
    let costs = CostSchedule::default();
    let model = ModelBuilder::new(&network, &costs, ModelVariant::FuelTolls)
        .build()
        .unwrap();
    let solver = ScriptedSolver::new(
        network.clone(),
        vec![PlannedRoute::new("V001", &["C001", "P001", "C002"])],
    );
    let outcome = solver.solve(&model, &SolveBudget::default()).unwrap();

    let first = decode(&network, &model, outcome.clone()).unwrap();
    let second = decode(&network, &model, outcome).unwrap();

    let first_rows = dispatch_rows(&network, &costs, &first);
    let second_rows = dispatch_rows(&network, &costs, &second);
    assert_eq!(first_rows, second_rows);
    assert_eq!(
        serde_json::to_string(&first_rows).unwrap(),
        serde_json::to_string(&second_rows).unwrap()
    );
}

#[test]
fn a_time_limited_incumbent_keeps_its_gap() {
    let network = delivery_network();
    let costs = CostSchedule::default();
    let model = ModelBuilder::new(&network, &costs, ModelVariant::Capacity)
        .build()
        .unwrap();
    let solver = ScriptedSolver::new(
        network.clone(),
        vec![PlannedRoute::new("V001", &["C001", "C002"])],
    );
    let scripted = solver.solve(&model, &SolveBudget::default()).unwrap();

    // A backend stopping on the time budget reports the incumbent plus the
    // proven gap; both must survive decode and reporting unchanged.
    let outcome = SolverOutcome::new(
        scripted.assignment().clone(),
        scripted.objective(),
        0.055,
        SolveStatus::TimeLimit,
    );
    let decoded = decode(&network, &model, outcome).unwrap();
    assert_eq!(decoded.status(), SolveStatus::TimeLimit);

    let rows = dispatch_rows(&network, &costs, &decoded);
    assert_eq!(rows[0].gap, 0.055);
}
