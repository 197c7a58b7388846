pub mod builder;
pub mod constraint;
pub mod expr;
pub mod variable;
pub mod variant;

pub use builder::{Model, ModelBuilder};
pub use variant::ModelVariant;
