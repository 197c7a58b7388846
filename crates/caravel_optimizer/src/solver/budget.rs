use jiff::SignedDuration;
use serde::{Deserialize, Serialize};

/// Wall-clock and quality budget handed to the solver backend. The solve is
/// a single blocking call; there is no cancellation path beyond this.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolveBudget {
    time_limit: SignedDuration,
    /// Relative optimality gap at which the search may stop early.
    gap_target: f64,
}

impl SolveBudget {
    pub fn new(time_limit: SignedDuration, gap_target: f64) -> Self {
        Self {
            time_limit,
            gap_target,
        }
    }

    pub fn time_limit(&self) -> SignedDuration {
        self.time_limit
    }

    pub fn gap_target(&self) -> f64 {
        self.gap_target
    }
}

impl Default for SolveBudget {
    fn default() -> Self {
        Self {
            time_limit: SignedDuration::from_secs(300),
            gap_target: 0.01,
        }
    }
}
