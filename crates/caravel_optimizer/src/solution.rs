pub mod decoder;
pub mod route;
pub mod summary;
pub mod verifier;

pub use decoder::{DecodedSolution, StateMismatch, StateQuantity, decode};
pub use route::{Route, RouteEvent};
pub use summary::{DispatchRow, dispatch_rows};
pub use verifier::{FeasibilityReport, Violation, verify};
