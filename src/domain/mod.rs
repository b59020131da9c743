pub mod directive;
pub mod errors;
pub mod models;
pub mod service;

pub use directive::parse_directive;
pub use errors::*;
pub use models::*;
pub use service::ProxyResolver;
