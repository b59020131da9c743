pub mod pac_engine;
pub mod reqwest_client;
pub mod system;

pub use pac_engine::{BoaEngineLoader, BoaPacEngine, EngineLimits};
pub use reqwest_client::ReqwestHttpClient;
pub use system::*;
