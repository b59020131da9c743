use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use url::Url;

use autoproxy::adapters::{BoaEngineLoader, PlatformSources, ReqwestHttpClient};
use autoproxy::config::AppConfig;
use autoproxy::ports::ProxyResolverPort;
use autoproxy::ProxyResolver;

#[derive(Parser, Debug)]
#[clap(version = env!("AUTOPROXY_VERSION"), about = "Show which proxy the system would use for a URL")]
pub struct Opts {
    /// Target URLs to resolve
    #[clap(required = true)]
    urls: Vec<Url>,

    /// Configuration file (defaults to the platform configuration directory)
    #[clap(long, short = 'c')]
    config: Option<PathBuf>,

    /// PAC script location, overriding the OS setting
    #[clap(long, short = 'p')]
    pac_url: Option<String>,

    /// Log debug messages
    #[clap(long, short = 'v')]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let opts = Opts::parse();

    let default_filter = if opts.verbose { "autoproxy=debug" } else { "autoproxy=info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with_writer(std::io::stderr)
        .init();

    let mut config = AppConfig::load(opts.config.as_deref())?;
    if opts.pac_url.is_some() {
        config.pac_url = opts.pac_url.clone();
    }

    let platform = PlatformSources::detect(&config);
    info!(
        "Automatic discovery {}",
        if platform.capabilities.auto_discovery { "enabled" } else { "unsupported" }
    );

    let resolver: Arc<dyn ProxyResolverPort> = Arc::new(ProxyResolver::new(
        platform.system_proxy,
        platform.autoconfig,
        Arc::new(ReqwestHttpClient::with_timeout(config.fetch_timeout())),
        Arc::new(BoaEngineLoader::new(config.engine_limits())),
        platform.capabilities,
    ));

    for url in &opts.urls {
        let resolution = resolver.resolve(url).await;
        println!("{} {}", url, resolution);
    }

    Ok(())
}
