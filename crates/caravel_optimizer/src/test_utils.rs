use std::f64::consts::PI;

use crate::problem::{
    location::Location,
    network::{Network, NetworkBuilder},
    node::Node,
    vehicle::{Vehicle, VehicleBuilder},
};

/// Kilometres per degree of latitude on the mean-radius sphere.
const KM_PER_DEGREE: f64 = 6_371.008_8 * PI / 180.0;

/// A point `km` kilometres due north of the equator/prime-meridian origin,
/// so Haversine distances along the line equal the kilometre offsets.
pub fn km_north(km: f64) -> Location {
    Location::from_lat_lon(km / KM_PER_DEGREE, 0.0)
}

pub fn depot_at_origin() -> Node {
    Node::depot("CD01", km_north(0.0))
}

pub fn client_at_km(id: &str, km: f64, demand_kg: f64) -> Node {
    Node::client(id, km_north(km), demand_kg)
}

pub fn restricted_client_at_km(id: &str, km: f64, demand_kg: f64, max_weight_kg: f64) -> Node {
    Node::restricted_client(id, km_north(km), demand_kg, max_weight_kg)
}

pub fn station_at_km(id: &str, km: f64, fuel_price: f64) -> Node {
    Node::station(id, km_north(km), fuel_price)
}

pub fn toll_at_km(id: &str, km: f64, base_rate: f64, rate_per_ton: f64) -> Node {
    Node::toll(id, km_north(km), base_rate, rate_per_ton)
}

pub fn vehicle(id: &str, capacity_kg: f64) -> Vehicle {
    let mut builder = VehicleBuilder::default();
    builder.set_vehicle_id(id);
    builder.set_capacity_kg(capacity_kg);
    builder.set_range_km(1_000.0);
    builder.build()
}

pub fn fuel_vehicle(id: &str, capacity_kg: f64, tank: f64, efficiency: f64) -> Vehicle {
    let mut builder = VehicleBuilder::default();
    builder.set_vehicle_id(id);
    builder.set_capacity_kg(capacity_kg);
    builder.set_range_km(1_000.0);
    builder.set_tank_capacity(tank);
    builder.set_fuel_efficiency(efficiency);
    builder.build()
}

pub fn freight_vehicle(
    id: &str,
    capacity_kg: f64,
    empty_weight_kg: f64,
    tank: f64,
    efficiency: f64,
) -> Vehicle {
    let mut builder = VehicleBuilder::default();
    builder.set_vehicle_id(id);
    builder.set_capacity_kg(capacity_kg);
    builder.set_range_km(1_000.0);
    builder.set_empty_weight_kg(empty_weight_kg);
    builder.set_tank_capacity(tank);
    builder.set_fuel_efficiency(efficiency);
    builder.build()
}

/// Depot at the origin plus clients on a meridian line and a single `V001`
/// vehicle with 10 kg capacity.
pub fn line_builder(clients: &[(&str, f64, f64)]) -> NetworkBuilder {
    let mut builder = NetworkBuilder::default();
    builder.add_node(depot_at_origin());
    for &(id, km, demand) in clients {
        builder.add_node(client_at_km(id, km, demand));
    }
    builder.add_vehicle(vehicle("V001", 10.0));
    builder
}

pub fn line_network(clients: &[(&str, f64, f64)]) -> Network {
    line_builder(clients).build().unwrap()
}

/// Refueling fixture: one client 100 km out, a station at 150 km, and a
/// tank good for 250 km, so the return leg needs a mid-route refuel.
pub fn fuel_line_network() -> Network {
    let mut builder = NetworkBuilder::default();
    builder.add_node(depot_at_origin());
    builder.add_node(client_at_km("C001", 100.0, 5.0));
    builder.add_node(station_at_km("E001", 150.0, 5_000.0));
    builder.add_vehicle(fuel_vehicle("V001", 10.0, 50.0, 5.0));
    builder.build().unwrap()
}

/// Toll/weight fixture: two 6 000 kg deliveries, the farther client under a
/// 12 000 kg municipal limit, a weigh-station toll plaza between them.
pub fn toll_line_network() -> Network {
    let mut builder = NetworkBuilder::default();
    builder.add_node(depot_at_origin());
    builder.add_node(client_at_km("C001", 50.0, 6_000.0));
    builder.add_node(toll_at_km("P001", 75.0, 10_000.0, 500.0));
    builder.add_node(restricted_client_at_km("C002", 100.0, 6_000.0, 12_000.0));
    builder.add_vehicle(freight_vehicle("V001", 12_000.0, 8_000.0, 50.0, 5.0));
    builder.build().unwrap()
}
