use serde::Serialize;

use crate::model::variable::VarId;

/// How the backend stopped. `TimeLimit` and `GapLimit` outcomes still carry
/// a feasible incumbent; the reported gap travels with the solution into
/// downstream reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SolveStatus {
    Optimal,
    GapLimit,
    TimeLimit,
}

/// Flat variable-value vector indexed by [`VarId`], exactly as returned by
/// the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    values: Vec<f64>,
}

impl Assignment {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    pub fn value(&self, var: VarId) -> f64 {
        self.values[var.get()]
    }

    /// Reads a binary variable with the usual 0.5 rounding tolerance.
    pub fn binary(&self, var: VarId) -> bool {
        self.value(var) > 0.5
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SolverOutcome {
    assignment: Assignment,
    objective: f64,
    gap: f64,
    status: SolveStatus,
}

impl SolverOutcome {
    pub fn new(assignment: Assignment, objective: f64, gap: f64, status: SolveStatus) -> Self {
        Self {
            assignment,
            objective,
            gap,
            status,
        }
    }

    pub fn assignment(&self) -> &Assignment {
        &self.assignment
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
}
