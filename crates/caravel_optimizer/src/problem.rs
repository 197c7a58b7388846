pub mod costs;
pub mod fleet;
pub mod location;
pub mod network;
pub mod node;
pub mod vehicle;
