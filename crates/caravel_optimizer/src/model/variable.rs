use fxhash::FxHashMap;
use serde::Serialize;

use crate::define_index_newtype;
use crate::problem::{node::NodeIdx, vehicle::VehicleIdx};

define_index_newtype!(VarId, Variable);

/// Semantic identity of a decision variable. The decoder looks variables up
/// by key, so the registry is the single mapping between the mathematical
/// formulation and the flat value vector a solver returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum VarKey {
    /// 1 when the vehicle travels the arc.
    ArcUse {
        vehicle: VehicleIdx,
        from: NodeIdx,
        to: NodeIdx,
    },
    /// 1 when the vehicle leaves the depot at all.
    VehicleUsed { vehicle: VehicleIdx },
    /// Visit-order potential for subtour elimination.
    VisitOrder { vehicle: VehicleIdx, node: NodeIdx },
    /// Fuel on hand when leaving the node (after any refuel there).
    FuelLevel { vehicle: VehicleIdx, node: NodeIdx },
    /// Fuel bought at a station.
    Refuel { vehicle: VehicleIdx, node: NodeIdx },
    /// Vehicle weight after the delivery at the node completes.
    GrossWeight { vehicle: VehicleIdx, node: NodeIdx },
    /// Linearization carrier: equals the gross weight when the toll plaza is
    /// visited, free to drop to zero otherwise.
    TolledWeight { vehicle: VehicleIdx, node: NodeIdx },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum VarDomain {
    Binary,
    Continuous { lower: f64, upper: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Variable {
    key: VarKey,
    domain: VarDomain,
}

impl Variable {
    pub fn key(&self) -> &VarKey {
        &self.key
    }

    pub fn domain(&self) -> VarDomain {
        self.domain
    }
}

/// Append-only variable store with key lookup.
#[derive(Debug, Default, Clone)]
pub struct VariableRegistry {
    variables: Vec<Variable>,
    by_key: FxHashMap<VarKey, VarId>,
}

impl VariableRegistry {
    pub fn add(&mut self, key: VarKey, domain: VarDomain) -> VarId {
        debug_assert!(
            !self.by_key.contains_key(&key),
            "variable registered twice: {key:?}"
        );
        let id = VarId::new(self.variables.len());
        self.variables.push(Variable { key, domain });
        self.by_key.insert(key, id);
        id
    }

    pub fn lookup(&self, key: &VarKey) -> Option<VarId> {
        self.by_key.get(key).copied()
    }

    pub fn variable(&self, id: VarId) -> &Variable {
        &self.variables[id]
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (VarId, &Variable)> {
        self.variables
            .iter()
            .enumerate()
            .map(|(index, variable)| (VarId::new(index), variable))
    }
}
