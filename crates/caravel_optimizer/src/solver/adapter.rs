use crate::error::SolveError;
use crate::model::Model;

use super::{budget::SolveBudget, outcome::SolverOutcome};

/// Black-box mixed-integer solver. Implementations wrap an external engine;
/// the core never looks inside. A backend that runs out of budget while
/// holding a feasible incumbent returns it with `SolveStatus::TimeLimit`
/// and the achieved gap, not an error.
pub trait MilpSolver {
    fn solve(&self, model: &Model, budget: &SolveBudget) -> Result<SolverOutcome, SolveError>;
}
