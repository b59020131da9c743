mod environment;
pub mod primitives;

pub use environment::{BoaEngineLoader, BoaPacEngine, EngineLimits};
