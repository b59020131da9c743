pub mod autoconfig;
pub mod http_client;
pub mod pac_engine;
pub mod resolver;
pub mod system_proxy;

pub use autoconfig::AutoConfigPort;
pub use http_client::HttpClientPort;
pub use pac_engine::{PacEngineLoaderPort, PacEnginePort};
pub use resolver::ProxyResolverPort;
pub use system_proxy::SystemProxyPort;
