use serde::Serialize;
use tracing::debug;

use crate::error::{ConstraintCategory, VerificationFailure};
use crate::problem::network::Network;

use super::decoder::DecodedSolution;
use super::route::Route;

/// Absolute slack granted on every re-check, scaled by the magnitudes
/// involved, to absorb solver floating point.
const TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    pub category: ConstraintCategory,
    pub vehicle: String,
    pub node: String,
    pub detail: String,
}

/// Per-category outcome of the independent re-check. Deliberately not a
/// single boolean: a caller diagnosing a formulation bug needs to know
/// which family failed and where.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeasibilityReport {
    checked: Vec<ConstraintCategory>,
    violations: Vec<Violation>,
}

impl FeasibilityReport {
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn checked(&self) -> &[ConstraintCategory] {
        &self.checked
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn category_passed(&self, category: ConstraintCategory) -> Option<bool> {
        self.checked.contains(&category).then(|| {
            !self
                .violations
                .iter()
                .any(|violation| violation.category == category)
        })
    }

    /// Treats any violation as fatal, carrying the first one's diagnostics.
    pub fn into_result(self) -> Result<(), VerificationFailure> {
        match self.violations.into_iter().next() {
            None => Ok(()),
            Some(violation) => Err(VerificationFailure {
                vehicle: violation.vehicle,
                node: violation.node,
                category: violation.category,
                detail: violation.detail,
            }),
        }
    }
}

/// Re-checks every decoded route against the constraints the model was
/// supposed to enforce, independently of the solver's own satisfaction
/// claims. A safety net against formulation and Big-M bugs.
pub fn verify(network: &Network, decoded: &DecodedSolution) -> FeasibilityReport {
    let variant = decoded.variant();
    let mut checked = vec![
        ConstraintCategory::ClosedLoop,
        ConstraintCategory::Coverage,
        ConstraintCategory::Capacity,
        ConstraintCategory::ForbiddenArc,
    ];
    if variant.enforces_range() {
        checked.push(ConstraintCategory::Range);
    }
    if variant.tracks_fuel() {
        checked.push(ConstraintCategory::Fuel);
    }
    if variant.tracks_weight() {
        checked.push(ConstraintCategory::Weight);
        checked.push(ConstraintCategory::TollCharge);
    }

    let mut violations = Vec::new();
    check_closed_loops(network, decoded, &mut violations);
    check_coverage(network, decoded, &mut violations);
    for route in decoded.routes() {
        check_capacity(network, route, &mut violations);
        check_admissible_arcs(network, route, &mut violations);
        if variant.enforces_range() {
            check_range(network, route, &mut violations);
        }
        if variant.tracks_fuel() {
            check_fuel(network, route, &mut violations);
        }
        if variant.tracks_weight() {
            check_weight(network, route, &mut violations);
            check_toll_charges(network, route, &mut violations);
        }
    }

    debug!(
        checked = checked.len(),
        violations = violations.len(),
        "verified decoded solution"
    );

    FeasibilityReport {
        checked,
        violations,
    }
}

fn vehicle_id(network: &Network, route: &Route) -> String {
    network.vehicle(route.vehicle()).external_id().to_owned()
}

fn slack(scale: f64) -> f64 {
    TOLERANCE * scale.abs().max(1.0)
}

fn check_closed_loops(network: &Network, decoded: &DecodedSolution, out: &mut Vec<Violation>) {
    let depot = network.depot();
    for route in decoded.routes() {
        let endpoints_ok = route.events().len() >= 2
            && route.events().first().is_some_and(|e| e.node() == depot)
            && route.events().last().is_some_and(|e| e.node() == depot);
        if !endpoints_ok {
            out.push(Violation {
                category: ConstraintCategory::ClosedLoop,
                vehicle: vehicle_id(network, route),
                node: network.node(depot).external_id().to_owned(),
                detail: "route does not start and end at the depot".to_owned(),
            });
        }
    }
}

fn check_coverage(network: &Network, decoded: &DecodedSolution, out: &mut Vec<Violation>) {
    for &client in network.clients() {
        let visits: usize = decoded
            .routes()
            .iter()
            .map(|route| route.nodes().filter(|&node| node == client).count())
            .sum();
        if visits != 1 {
            out.push(Violation {
                category: ConstraintCategory::Coverage,
                vehicle: "-".to_owned(),
                node: network.node(client).external_id().to_owned(),
                detail: format!("client served {visits} times, expected exactly 1"),
            });
        }
    }
}

fn check_capacity(network: &Network, route: &Route, out: &mut Vec<Violation>) {
    let capacity = network.vehicle(route.vehicle()).capacity_kg();
    let load = route.initial_load_kg();
    if load > capacity + slack(capacity) {
        out.push(Violation {
            category: ConstraintCategory::Capacity,
            vehicle: vehicle_id(network, route),
            node: network.node(network.depot()).external_id().to_owned(),
            detail: format!("initial load {load} kg exceeds capacity {capacity} kg"),
        });
    }
}

fn check_range(network: &Network, route: &Route, out: &mut Vec<Violation>) {
    let range = network.vehicle(route.vehicle()).range_km();
    if !range.is_finite() {
        return;
    }
    let travelled = route.total_distance_km();
    if travelled > range + slack(range) {
        out.push(Violation {
            category: ConstraintCategory::Range,
            vehicle: vehicle_id(network, route),
            node: network.node(network.depot()).external_id().to_owned(),
            detail: format!("distance {travelled} km exceeds range {range} km"),
        });
    }
}

fn check_admissible_arcs(network: &Network, route: &Route, out: &mut Vec<Violation>) {
    for pair in route.events().windows(2) {
        let (from, to) = (pair[0].node(), pair[1].node());
        if !network.is_admissible(route.vehicle(), from, to) {
            out.push(Violation {
                category: ConstraintCategory::ForbiddenArc,
                vehicle: vehicle_id(network, route),
                node: network.node(to).external_id().to_owned(),
                detail: format!(
                    "arc {}->{} is excluded for this vehicle",
                    network.node(from).external_id(),
                    network.node(to).external_id()
                ),
            });
        }
    }
}

fn check_fuel(network: &Network, route: &Route, out: &mut Vec<Violation>) {
    let profile = network.vehicle(route.vehicle());
    for pair in route.events().windows(2) {
        let (prev, event) = (&pair[0], &pair[1]);
        let node = network.node(event.node());
        let node_id = node.external_id().to_owned();

        let (Some(level), Some(previous), Some(refueled)) =
            (event.fuel(), prev.fuel(), event.refueled())
        else {
            continue;
        };

        if level < -slack(profile.tank_capacity()) {
            out.push(Violation {
                category: ConstraintCategory::Fuel,
                vehicle: vehicle_id(network, route),
                node: node_id.clone(),
                detail: format!("fuel level {level} is negative"),
            });
        }
        if refueled > slack(profile.tank_capacity()) && !node.is_station() {
            out.push(Violation {
                category: ConstraintCategory::Fuel,
                vehicle: vehicle_id(network, route),
                node: node_id.clone(),
                detail: format!("refuel of {refueled} units outside a station"),
            });
        }

        // The level may only move by consumption on the leg plus the refuel
        // at arrival; any other jump means the replay and the data disagree.
        let leg = event.cumulative_km() - prev.cumulative_km();
        let expected = previous - profile.consumption(leg) + refueled;
        if (level - expected).abs() > slack(profile.tank_capacity()) {
            out.push(Violation {
                category: ConstraintCategory::Fuel,
                vehicle: vehicle_id(network, route),
                node: node_id,
                detail: format!("fuel level {level}, expected {expected} from the fuel balance"),
            });
        }
    }
}

fn check_weight(network: &Network, route: &Route, out: &mut Vec<Violation>) {
    let profile = network.vehicle(route.vehicle());
    for event in route.events() {
        let Some(weight) = event.gross_weight_kg() else {
            continue;
        };
        let node = network.node(event.node());

        let expected = profile.empty_weight_kg() + event.load_kg();
        if (weight - expected).abs() > slack(expected) {
            out.push(Violation {
                category: ConstraintCategory::Weight,
                vehicle: vehicle_id(network, route),
                node: node.external_id().to_owned(),
                detail: format!(
                    "gross weight {weight} kg, expected {expected} kg from empty weight plus load"
                ),
            });
        }

        if let Some(limit) = node.max_weight_kg()
            && weight > limit + slack(limit)
        {
            out.push(Violation {
                category: ConstraintCategory::Weight,
                vehicle: vehicle_id(network, route),
                node: node.external_id().to_owned(),
                detail: format!("gross weight {weight} kg exceeds the {limit} kg limit"),
            });
        }
    }
}

fn check_toll_charges(network: &Network, route: &Route, out: &mut Vec<Violation>) {
    for event in route.events() {
        let node = network.node(event.node());
        let Some((base_rate, rate_per_ton)) = node.toll_rates() else {
            continue;
        };
        let charged = event.toll_charge().unwrap_or(0.0);
        let weight = event.gross_weight_kg().unwrap_or(0.0);
        let expected = base_rate + weight / 1_000.0 * rate_per_ton;
        if (charged - expected).abs() > slack(expected) {
            out.push(Violation {
                category: ConstraintCategory::TollCharge,
                vehicle: vehicle_id(network, route),
                node: node.external_id().to_owned(),
                detail: format!("toll charge {charged}, expected {expected}"),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::error::ConstraintCategory;
    use crate::model::{ModelBuilder, ModelVariant};
    use crate::problem::costs::CostSchedule;
    use crate::problem::network::Network;
    use crate::solution::decoder::{DecodedSolution, decode};
    use crate::solver::{MilpSolver, PlannedRoute, ScriptedSolver, SolveBudget, SolveStatus};
    use crate::test_utils;

    use super::verify;

    fn decode_plan(network: &Network, variant: ModelVariant, plans: Vec<PlannedRoute>) -> DecodedSolution {
        let costs = CostSchedule::default();
        let model = ModelBuilder::new(network, &costs, variant).build().unwrap();
        let solver = ScriptedSolver::new(network.clone(), plans);
        let outcome = solver.solve(&model, &SolveBudget::default()).unwrap();
        decode(network, &model, outcome).unwrap()
    }

    #[test]
    fn a_clean_base_plan_passes_every_category() {
        let network = test_utils::line_network(&[("C001", 10.0, 5.0), ("C002", 20.0, 5.0)]);
        let decoded = decode_plan(
            &network,
            ModelVariant::Capacity,
            vec![PlannedRoute::new("V001", &["C001", "C002"])],
        );

        let report = verify(&network, &decoded);
        assert!(report.passed(), "{:?}", report.violations());
        assert_eq!(report.category_passed(ConstraintCategory::Coverage), Some(true));
        assert_eq!(report.category_passed(ConstraintCategory::Range), Some(true));
        assert_eq!(report.category_passed(ConstraintCategory::Fuel), None);
        assert!(report.into_result().is_ok());
    }

    #[test]
    fn an_unserved_client_fails_coverage() {
        let network = test_utils::line_network(&[("C001", 10.0, 5.0), ("C002", 20.0, 5.0)]);
        let decoded = decode_plan(
            &network,
            ModelVariant::Capacity,
            vec![PlannedRoute::new("V001", &["C001"])],
        );

        let report = verify(&network, &decoded);
        assert_eq!(report.category_passed(ConstraintCategory::Coverage), Some(false));
        let violation = &report.violations()[0];
        assert_eq!(violation.node, "C002");

        let failure = report.into_result().unwrap_err();
        assert_eq!(failure.category, ConstraintCategory::Coverage);
    }

    #[test]
    fn overloading_a_vehicle_fails_capacity() {
        let network =
            test_utils::line_network(&[("C001", 10.0, 7.0), ("C002", 20.0, 7.0)]);
        let decoded = decode_plan(
            &network,
            ModelVariant::Capacity,
            vec![PlannedRoute::new("V001", &["C001", "C002"])],
        );

        let report = verify(&network, &decoded);
        assert_eq!(report.category_passed(ConstraintCategory::Capacity), Some(false));
    }

    #[test]
    fn range_is_only_checked_in_the_base_variant() {
        let network = test_utils::fuel_line_network();
        let decoded = decode_plan(
            &network,
            ModelVariant::Fuel,
            vec![PlannedRoute::new("V001", &["C001", "E001"]).with_refuel("E001", 10.0)],
        );

        let report = verify(&network, &decoded);
        assert_eq!(report.category_passed(ConstraintCategory::Range), None);
        assert_eq!(report.category_passed(ConstraintCategory::Fuel), Some(true));
    }

    #[test]
    fn running_the_tank_dry_fails_fuel() {
        let network = test_utils::fuel_line_network();
        // No refuel at the station: the 150 km home leg needs 30 units but
        // only 20 are left.
        let decoded = decode_plan(
            &network,
            ModelVariant::Fuel,
            vec![PlannedRoute::new("V001", &["C001", "E001"])],
        );

        let report = verify(&network, &decoded);
        assert_eq!(report.category_passed(ConstraintCategory::Fuel), Some(false));
        assert!(
            report
                .violations()
                .iter()
                .any(|v| v.detail.contains("negative"))
        );
    }

    #[test]
    fn unloading_first_satisfies_the_weight_limit() {
        let network = test_utils::toll_line_network();
        let decoded = decode_plan(
            &network,
            ModelVariant::FuelTolls,
            vec![PlannedRoute::new("V001", &["C001", "P001", "C002"]).with_initial_fuel(50.0)],
        );

        let report = verify(&network, &decoded);
        assert!(report.passed(), "{:?}", report.violations());
    }

    #[test]
    fn serving_the_restricted_client_first_fails_weight() {
        let network = test_utils::toll_line_network();
        // 8 000 kg empty + 12 000 kg cargo arrives at the restricted client
        // before any delivery; even after unloading 6 000 kg it sits at
        // 14 000 kg, over the 12 000 kg limit.
        let decoded = decode_plan(
            &network,
            ModelVariant::FuelTolls,
            vec![PlannedRoute::new("V001", &["C002", "P001", "C001"]).with_initial_fuel(50.0)],
        );

        let report = verify(&network, &decoded);
        assert_eq!(report.category_passed(ConstraintCategory::Weight), Some(false));
        let violation = report
            .violations()
            .iter()
            .find(|v| v.category == ConstraintCategory::Weight)
            .unwrap();
        assert_eq!(violation.node, "C002");
        assert_eq!(violation.vehicle, "V001");
    }

    #[test]
    fn toll_charges_follow_the_decoded_weight() {
        let network = test_utils::toll_line_network();
        let decoded = decode_plan(
            &network,
            ModelVariant::FuelTolls,
            vec![PlannedRoute::new("V001", &["C001", "P001", "C002"]).with_initial_fuel(50.0)],
        );

        let report = verify(&network, &decoded);
        assert_eq!(report.category_passed(ConstraintCategory::TollCharge), Some(true));

        // 14 000 kg through the plaza: 10 000 base + 14 t * 500.
        let route = &decoded.routes()[0];
        let toll_event = route
            .events()
            .iter()
            .find(|e| e.toll_charge().is_some())
            .unwrap();
        assert!((toll_event.toll_charge().unwrap() - 17_000.0).abs() < 1e-6);
    }

    #[test]
    fn arcs_excluded_elsewhere_fail_the_admissibility_check() {
        let network = test_utils::line_network(&[("C001", 10.0, 5.0), ("C002", 20.0, 5.0)]);
        let decoded = decode_plan(
            &network,
            ModelVariant::Capacity,
            vec![PlannedRoute::new("V001", &["C001", "C002"])],
        );

        // Re-check against a stricter network where the inter-client arc is
        // closed for this vehicle, as if the model had ignored the ban.
        let mut builder =
            test_utils::line_builder(&[("C001", 10.0, 5.0), ("C002", 20.0, 5.0)]);
        builder.restrict_arc("V001", "C001", "C002");
        let strict = builder.build().unwrap();

        let report = verify(&strict, &decoded);
        assert_eq!(
            report.category_passed(ConstraintCategory::ForbiddenArc),
            Some(false)
        );
    }

    #[test]
    fn synthetic_open_route_fails_closed_loop() {
        use crate::solution::route::{Route, RouteEvent};

        let network = test_utils::line_network(&[("C001", 10.0, 5.0)]);
        let client = network.find_node("C001").unwrap();
        let vehicle = network.find_vehicle("V001").unwrap();

        let event = |node, load| RouteEvent {
            node,
            cumulative_km: 0.0,
            delivered_kg: 0.0,
            load_kg: load,
            fuel: None,
            refueled: None,
            gross_weight_kg: None,
            toll_charge: None,
        };
        let decoded = DecodedSolution {
            variant: ModelVariant::Capacity,
            routes: vec![Route {
                vehicle,
                events: vec![event(network.depot(), 5.0), event(client, 0.0)],
                clients_served: 1,
                fuel_cost: 0.0,
                toll_cost: 0.0,
            }],
            objective: 0.0,
            gap: 0.0,
            status: SolveStatus::Optimal,
            mismatches: Vec::new(),
        };

        let report = verify(&network, &decoded);
        assert_eq!(
            report.category_passed(ConstraintCategory::ClosedLoop),
            Some(false)
        );
    }
}
