// gig-scout HTTP server
//
// Serves POST /api/scrape and GET /health on the configured bind address.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use gig_scout::{ChromeRenderer, OpenAiExtractor, Pipeline, load_yaml_config, server};

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("gig_scout=info,tower_http=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = load_yaml_config().context("Failed to load configuration")?;

    let renderer = ChromeRenderer::from_config(&config).context("Invalid render configuration")?;
    let extractor = OpenAiExtractor::from_config(&config).context("Failed to build extraction client")?;
    let pipeline = Pipeline::new(Arc::new(renderer), Arc::new(extractor));

    server::serve(&config, pipeline).await
}
