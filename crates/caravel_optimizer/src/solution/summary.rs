use serde::Serialize;

use crate::problem::{costs::CostSchedule, network::Network};

use super::decoder::DecodedSolution;
use super::route::Route;

/// One row per activated vehicle, shaped for the external report and
/// visualization collaborators. List fields are hyphen-joined with no
/// surrounding whitespace; distances and times carry one decimal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchRow {
    pub vehicle_id: String,
    pub depot_id: String,
    pub initial_load_kg: f64,
    /// `CD01-C005-C012-CD01`: first and last element equal the depot id.
    pub route_sequence: String,
    pub clients_served: usize,
    /// Demand satisfied at every stop in order, `0` at the depot and at
    /// non-delivery stops.
    pub demands_satisfied: String,
    pub total_distance_km: f64,
    pub total_time_min: f64,
    pub fixed_cost: f64,
    pub distance_cost: f64,
    pub fuel_cost: f64,
    pub toll_cost: f64,
    pub total_cost: f64,
    pub capacity_utilization_pct: f64,
    pub range_utilization_pct: Option<f64>,
    /// Relative optimality gap reported by the solver for the whole plan.
    pub gap: f64,
}

/// Builds the output artifact from a decoded solution.
pub fn dispatch_rows(
    network: &Network,
    costs: &CostSchedule,
    decoded: &DecodedSolution,
) -> Vec<DispatchRow> {
    decoded
        .routes()
        .iter()
        .map(|route| dispatch_row(network, costs, route, decoded.gap()))
        .collect()
}

fn dispatch_row(
    network: &Network,
    costs: &CostSchedule,
    route: &Route,
    gap: f64,
) -> DispatchRow {
    let profile = network.vehicle(route.vehicle());
    let depot_id = network.node(network.depot()).external_id().to_owned();

    let route_sequence = route
        .nodes()
        .map(|node| network.node(node).external_id())
        .collect::<Vec<_>>()
        .join("-");
    let demands_satisfied = route
        .events()
        .iter()
        .map(|event| format_kg(event.delivered_kg()))
        .collect::<Vec<_>>()
        .join("-");

    let distance = route.total_distance_km();
    let fixed_cost = costs.fixed_per_vehicle;
    let distance_cost = round2(costs.per_km * distance);
    let fuel_cost = round2(route.fuel_cost());
    let toll_cost = round2(route.toll_cost());

    DispatchRow {
        vehicle_id: profile.external_id().to_owned(),
        depot_id,
        initial_load_kg: route.initial_load_kg(),
        route_sequence,
        clients_served: route.clients_served(),
        demands_satisfied,
        total_distance_km: round1(distance),
        total_time_min: round1(costs.travel_time_minutes(distance)),
        fixed_cost,
        distance_cost,
        fuel_cost,
        toll_cost,
        total_cost: round2(fixed_cost + distance_cost + fuel_cost + toll_cost),
        capacity_utilization_pct: round1(route.initial_load_kg() / profile.capacity_kg() * 100.0),
        range_utilization_pct: profile
            .range_km()
            .is_finite()
            .then(|| round1(distance / profile.range_km() * 100.0)),
        gap,
    }
}

fn format_kg(kg: f64) -> String {
    format!("{}", kg.round() as i64)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::{format_kg, round1};

    #[test]
    fn kilograms_render_as_integers() {
        assert_eq!(format_kg(0.0), "0");
        assert_eq!(format_kg(5_000.0), "5000");
        assert_eq!(format_kg(5_000.4), "5000");
    }

    #[test]
    fn distances_keep_one_decimal() {
        assert_eq!(round1(123.44), 123.4);
        assert_eq!(round1(123.46), 123.5);
    }
}
