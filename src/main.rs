//! ghproxy - serve a GitHub repository as a flat file server

use std::sync::Arc;

use clap::Parser;
use ghproxy::{logging, Args, Config, GitHubSource, PathResolver};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_args(Args::parse())?;
    logging::init(config.log_level);

    tracing::info!(
        url = %config.listing_url,
        authenticated = config.token.is_some(),
        timeout_secs = config.request_timeout.as_secs(),
        "starting ghproxy"
    );

    let source = GitHubSource::from_config(&config)?;
    let resolver = Arc::new(PathResolver::new(Arc::new(source)));

    ghproxy::serve(&config, resolver).await?;
    Ok(())
}
