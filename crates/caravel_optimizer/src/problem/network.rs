use fxhash::{FxHashMap, FxHashSet};
use serde::Serialize;
use tracing::warn;

use crate::error::DataError;

use super::{
    fleet::Fleet,
    node::{Node, NodeIdx},
    vehicle::{Vehicle, VehicleIdx},
};

/// Directed edge between two distinct nodes. Depot-to-depot edges do not
/// exist; distances are great-circle kilometres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Arc {
    from: NodeIdx,
    to: NodeIdx,
    distance_km: f64,
}

impl Arc {
    pub fn from(&self) -> NodeIdx {
        self.from
    }

    pub fn to(&self) -> NodeIdx {
        self.to
    }

    pub fn distance_km(&self) -> f64 {
        self.distance_km
    }
}

/// Immutable routing network: the node set, the fleet, and the admissible
/// arc set after global and per-vehicle exclusions.
#[derive(Debug, Clone)]
pub struct Network {
    nodes: Vec<Node>,
    fleet: Fleet,
    depot: NodeIdx,
    clients: Vec<NodeIdx>,
    stations: Vec<NodeIdx>,
    tolls: Vec<NodeIdx>,
    arcs: Vec<Arc>,
    arc_lookup: FxHashMap<(NodeIdx, NodeIdx), usize>,
    restricted: FxHashMap<VehicleIdx, FxHashSet<(NodeIdx, NodeIdx)>>,
}

impl Network {
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, node_id: NodeIdx) -> &Node {
        &self.nodes[node_id]
    }

    pub fn node_indices(&self) -> impl Iterator<Item = NodeIdx> + use<> {
        (0..self.nodes.len()).map(NodeIdx::new)
    }

    pub fn fleet(&self) -> &Fleet {
        &self.fleet
    }

    pub fn vehicle(&self, vehicle_id: VehicleIdx) -> &Vehicle {
        self.fleet.vehicle(vehicle_id)
    }

    pub fn depot(&self) -> NodeIdx {
        self.depot
    }

    pub fn clients(&self) -> &[NodeIdx] {
        &self.clients
    }

    pub fn stations(&self) -> &[NodeIdx] {
        &self.stations
    }

    pub fn tolls(&self) -> &[NodeIdx] {
        &self.tolls
    }

    /// Non-depot node count, the `n` of the subtour-elimination order bound.
    pub fn non_depot_count(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn arcs(&self) -> &[Arc] {
        &self.arcs
    }

    pub fn arc(&self, from: NodeIdx, to: NodeIdx) -> Option<&Arc> {
        self.arc_lookup.get(&(from, to)).map(|&i| &self.arcs[i])
    }

    pub fn distance_km(&self, from: NodeIdx, to: NodeIdx) -> Option<f64> {
        self.arc(from, to).map(Arc::distance_km)
    }

    /// Arcs the given vehicle may travel.
    pub fn admissible_arcs(&self, vehicle_id: VehicleIdx) -> impl Iterator<Item = &Arc> {
        let restricted = self.restricted.get(&vehicle_id);
        self.arcs.iter().filter(move |arc| {
            restricted.is_none_or(|set| !set.contains(&(arc.from, arc.to)))
        })
    }

    pub fn is_admissible(&self, vehicle_id: VehicleIdx, from: NodeIdx, to: NodeIdx) -> bool {
        self.arc_lookup.contains_key(&(from, to))
            && self
                .restricted
                .get(&vehicle_id)
                .is_none_or(|set| !set.contains(&(from, to)))
    }

    pub fn find_node(&self, external_id: &str) -> Option<NodeIdx> {
        self.nodes
            .iter()
            .position(|node| node.external_id() == external_id)
            .map(NodeIdx::new)
    }

    pub fn find_vehicle(&self, external_id: &str) -> Option<VehicleIdx> {
        self.fleet
            .vehicles()
            .iter()
            .position(|vehicle| vehicle.external_id() == external_id)
            .map(VehicleIdx::new)
    }
}

/// Assembles and validates a [`Network`] from raw node and fleet tables.
#[derive(Default)]
pub struct NetworkBuilder {
    nodes: Vec<Node>,
    vehicles: Vec<Vehicle>,
    forbidden: Vec<(String, String)>,
    restricted: Vec<(String, String, String)>,
}

impl NetworkBuilder {
    pub fn add_node(&mut self, node: Node) -> &mut NetworkBuilder {
        self.nodes.push(node);
        self
    }

    pub fn set_nodes(&mut self, nodes: Vec<Node>) -> &mut NetworkBuilder {
        self.nodes = nodes;
        self
    }

    pub fn add_vehicle(&mut self, vehicle: Vehicle) -> &mut NetworkBuilder {
        self.vehicles.push(vehicle);
        self
    }

    pub fn set_fleet(&mut self, vehicles: Vec<Vehicle>) -> &mut NetworkBuilder {
        self.vehicles = vehicles;
        self
    }

    /// Excludes the directed arc for every vehicle (closed road, banned
    /// manoeuvre).
    pub fn forbid_arc(
        &mut self,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> &mut NetworkBuilder {
        self.forbidden.push((from.into(), to.into()));
        self
    }

    /// Excludes the directed arc for one vehicle only.
    pub fn restrict_arc(
        &mut self,
        vehicle: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> &mut NetworkBuilder {
        self.restricted.push((vehicle.into(), from.into(), to.into()));
        self
    }

    pub fn build(self) -> Result<Network, DataError> {
        let mut ids: FxHashMap<&str, NodeIdx> = FxHashMap::default();
        let mut depot: Option<NodeIdx> = None;
        let mut clients = Vec::new();
        let mut stations = Vec::new();
        let mut tolls = Vec::new();

        for (index, node) in self.nodes.iter().enumerate() {
            let index = NodeIdx::new(index);
            if ids.insert(node.external_id(), index).is_some() {
                return Err(DataError::DuplicateNodeId(node.external_id().to_owned()));
            }

            if node.is_depot() {
                if let Some(first) = depot {
                    return Err(DataError::ExtraDepot(
                        self.nodes[first].external_id().to_owned(),
                        node.external_id().to_owned(),
                    ));
                }
                depot = Some(index);
            } else if node.is_client() {
                if node.demand_kg() < 0.0 {
                    return Err(DataError::NegativeDemand {
                        id: node.external_id().to_owned(),
                        demand: node.demand_kg(),
                    });
                }
                clients.push(index);
            } else if node.is_station() {
                stations.push(index);
            } else {
                tolls.push(index);
            }
        }

        let depot = depot.ok_or(DataError::MissingDepot)?;
        if clients.is_empty() {
            return Err(DataError::NoClients);
        }

        let mut vehicle_ids: FxHashSet<&str> = FxHashSet::default();
        for vehicle in &self.vehicles {
            if !vehicle_ids.insert(vehicle.external_id()) {
                return Err(DataError::DuplicateVehicleId(
                    vehicle.external_id().to_owned(),
                ));
            }
            if vehicle.capacity_kg() <= 0.0 {
                return Err(DataError::InvalidCapacity {
                    id: vehicle.external_id().to_owned(),
                    capacity: vehicle.capacity_kg(),
                });
            }
            if vehicle.fuel_efficiency() <= 0.0 {
                return Err(DataError::InvalidFuelEfficiency {
                    id: vehicle.external_id().to_owned(),
                    efficiency: vehicle.fuel_efficiency(),
                });
            }
        }

        // A zero distance between distinct stops is legal but ambiguous;
        // flag it so bad coordinate rows do not pass silently.
        for (i, a) in self.nodes.iter().enumerate() {
            for b in self.nodes.iter().skip(i + 1) {
                if a.location() == b.location() {
                    warn!(
                        first = a.external_id(),
                        second = b.external_id(),
                        "distinct nodes share coordinates; their distance is 0"
                    );
                }
            }
        }

        let forbidden = self
            .forbidden
            .iter()
            .map(|(from, to)| {
                let from = resolve(&ids, from)?;
                let to = resolve(&ids, to)?;
                Ok((from, to))
            })
            .collect::<Result<FxHashSet<_>, DataError>>()?;

        let mut arcs = Vec::new();
        let mut arc_lookup = FxHashMap::default();
        for (i, a) in self.nodes.iter().enumerate() {
            for (j, b) in self.nodes.iter().enumerate() {
                if i == j {
                    continue;
                }
                let (from, to) = (NodeIdx::new(i), NodeIdx::new(j));
                if forbidden.contains(&(from, to)) {
                    continue;
                }
                arc_lookup.insert((from, to), arcs.len());
                arcs.push(Arc {
                    from,
                    to,
                    distance_km: a.location().haversine_km(b.location()),
                });
            }
        }

        let mut restricted: FxHashMap<VehicleIdx, FxHashSet<(NodeIdx, NodeIdx)>> =
            FxHashMap::default();
        for (vehicle, from, to) in &self.restricted {
            let vehicle_id = self
                .vehicles
                .iter()
                .position(|v| v.external_id() == vehicle)
                .map(VehicleIdx::new)
                .ok_or_else(|| DataError::UnknownVehicleId(vehicle.clone()))?;
            let arc = (resolve(&ids, from)?, resolve(&ids, to)?);
            restricted.entry(vehicle_id).or_default().insert(arc);
        }

        let network = Network {
            depot,
            clients,
            stations,
            tolls,
            arcs,
            arc_lookup,
            restricted,
            fleet: Fleet::new(self.vehicles),
            nodes: self.nodes,
        };

        for vehicle_id in network.fleet.indices() {
            let can_depart = network
                .admissible_arcs(vehicle_id)
                .any(|arc| arc.from() == network.depot);
            let can_return = network
                .admissible_arcs(vehicle_id)
                .any(|arc| arc.to() == network.depot);
            if !can_depart || !can_return {
                warn!(
                    vehicle = network.vehicle(vehicle_id).external_id(),
                    "every depot arc of this vehicle is excluded; it cannot be routed"
                );
            }
        }

        Ok(network)
    }
}

fn resolve(ids: &FxHashMap<&str, NodeIdx>, external_id: &str) -> Result<NodeIdx, DataError> {
    ids.get(external_id)
        .copied()
        .ok_or_else(|| DataError::UnknownNodeId(external_id.to_owned()))
}
