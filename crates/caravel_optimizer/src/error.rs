use serde::Serialize;
use thiserror::Error;

/// Rejected input data. These are caller mistakes and are recoverable:
/// fix the offending table row and rebuild the network.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("network has no depot node")]
    MissingDepot,
    #[error("network has more than one depot: {0} and {1}")]
    ExtraDepot(String, String),
    #[error("network has no client nodes")]
    NoClients,
    #[error("duplicate node id {0}")]
    DuplicateNodeId(String),
    #[error("duplicate vehicle id {0}")]
    DuplicateVehicleId(String),
    #[error("unknown node id {0}")]
    UnknownNodeId(String),
    #[error("unknown vehicle id {0}")]
    UnknownVehicleId(String),
    #[error("client {id} has negative demand {demand} kg")]
    NegativeDemand { id: String, demand: f64 },
    #[error("vehicle {id} has non-positive load capacity {capacity} kg")]
    InvalidCapacity { id: String, capacity: f64 },
    #[error("vehicle {id} has non-positive fuel efficiency {efficiency} km per unit")]
    InvalidFuelEfficiency { id: String, efficiency: f64 },
    #[error("vehicle {id} has non-positive tank capacity {tank}, required for refueling models")]
    InvalidTankCapacity { id: String, tank: f64 },
}

/// Outcome of handing the model to the external solver when no usable
/// incumbent came back. An exhausted time budget WITH an incumbent is not an
/// error; it is reported as a `TimeLimit` status with its gap.
#[derive(Error, Debug)]
pub enum SolveError {
    /// Surfaced verbatim. Never retried with relaxed constraints.
    #[error("no feasible assignment exists: {0}")]
    Infeasible(String),
    #[error("time budget exhausted before any feasible solution was found")]
    TimedOut,
    #[error("solver backend failure: {0}")]
    Backend(String),
}

/// The solved arc matrix cannot be reassembled into a simple closed route.
/// This indicates a formulation or Big-M bug and aborts decoding; a wrong
/// route must never be reported.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("vehicle {vehicle}: no used arc leaves {node} before the route returns to the depot")]
    DisconnectedRoute { vehicle: String, node: String },
    #[error("vehicle {vehicle}: node {node} recurs before the depot is reached")]
    PrematureCycle { vehicle: String, node: String },
    #[error("vehicle {vehicle}: more than one used arc leaves {node}")]
    BranchingRoute { vehicle: String, node: String },
}

/// Constraint families re-checked by the feasibility verifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ConstraintCategory {
    ClosedLoop,
    Coverage,
    Capacity,
    Range,
    Fuel,
    Weight,
    TollCharge,
    ForbiddenArc,
}

impl std::fmt::Display for ConstraintCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ConstraintCategory::ClosedLoop => "closed loop",
            ConstraintCategory::Coverage => "client coverage",
            ConstraintCategory::Capacity => "load capacity",
            ConstraintCategory::Range => "range",
            ConstraintCategory::Fuel => "fuel balance",
            ConstraintCategory::Weight => "weight restriction",
            ConstraintCategory::TollCharge => "toll charge",
            ConstraintCategory::ForbiddenArc => "forbidden arc",
        };
        write!(f, "{name}")
    }
}

/// A decoded route violates a constraint the model was supposed to enforce.
/// Always a logic defect, never suppressed.
#[derive(Error, Debug)]
#[error("vehicle {vehicle}: {category} violated at {node}: {detail}")]
pub struct VerificationFailure {
    pub vehicle: String,
    pub node: String,
    pub category: ConstraintCategory,
    pub detail: String,
}
