use serde::{Deserialize, Serialize};

use crate::define_index_newtype;

use super::location::Location;

define_index_newtype!(NodeIdx, Node);

/// What a network stop is and the attributes that only make sense for that
/// kind of stop. Clients are mandatory visits; stations and toll plazas are
/// optional pass-through nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeRole {
    Depot,
    Client {
        demand_kg: f64,
        /// Municipal gross-weight ceiling, checked on the vehicle after the
        /// on-site delivery completes.
        max_weight_kg: Option<f64>,
    },
    Station {
        /// Price per fuel unit at this station.
        fuel_price: f64,
    },
    Toll {
        base_rate: f64,
        rate_per_ton: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    external_id: String,
    location: Location,
    role: NodeRole,
}

impl Node {
    pub fn depot(external_id: impl Into<String>, location: Location) -> Self {
        Self {
            external_id: external_id.into(),
            location,
            role: NodeRole::Depot,
        }
    }

    pub fn client(external_id: impl Into<String>, location: Location, demand_kg: f64) -> Self {
        Self {
            external_id: external_id.into(),
            location,
            role: NodeRole::Client {
                demand_kg,
                max_weight_kg: None,
            },
        }
    }

    pub fn restricted_client(
        external_id: impl Into<String>,
        location: Location,
        demand_kg: f64,
        max_weight_kg: f64,
    ) -> Self {
        Self {
            external_id: external_id.into(),
            location,
            role: NodeRole::Client {
                demand_kg,
                max_weight_kg: Some(max_weight_kg),
            },
        }
    }

    pub fn station(external_id: impl Into<String>, location: Location, fuel_price: f64) -> Self {
        Self {
            external_id: external_id.into(),
            location,
            role: NodeRole::Station { fuel_price },
        }
    }

    pub fn toll(
        external_id: impl Into<String>,
        location: Location,
        base_rate: f64,
        rate_per_ton: f64,
    ) -> Self {
        Self {
            external_id: external_id.into(),
            location,
            role: NodeRole::Toll {
                base_rate,
                rate_per_ton,
            },
        }
    }

    pub fn external_id(&self) -> &str {
        &self.external_id
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn role(&self) -> &NodeRole {
        &self.role
    }

    pub fn is_depot(&self) -> bool {
        matches!(self.role, NodeRole::Depot)
    }

    pub fn is_client(&self) -> bool {
        matches!(self.role, NodeRole::Client { .. })
    }

    pub fn is_station(&self) -> bool {
        matches!(self.role, NodeRole::Station { .. })
    }

    pub fn is_toll(&self) -> bool {
        matches!(self.role, NodeRole::Toll { .. })
    }

    /// Demand in kg; zero for anything that is not a client.
    pub fn demand_kg(&self) -> f64 {
        match self.role {
            NodeRole::Client { demand_kg, .. } => demand_kg,
            _ => 0.0,
        }
    }

    pub fn max_weight_kg(&self) -> Option<f64> {
        match self.role {
            NodeRole::Client { max_weight_kg, .. } => max_weight_kg,
            _ => None,
        }
    }

    pub fn fuel_price(&self) -> Option<f64> {
        match self.role {
            NodeRole::Station { fuel_price } => Some(fuel_price),
            _ => None,
        }
    }

    pub fn toll_rates(&self) -> Option<(f64, f64)> {
        match self.role {
            NodeRole::Toll {
                base_rate,
                rate_per_ton,
            } => Some((base_rate, rate_per_ton)),
            _ => None,
        }
    }
}
