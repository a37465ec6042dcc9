use mbin_website_data::build_aggregator;
use mbin_website_data::config::load_config_or_panic;
use rustls::crypto;
use rustls::crypto::CryptoProvider;
use std::path::Path;
use time::OffsetDateTime;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn initialize_standard_tracing() {
    let default_directives = "mbin_website_data=info,hyper=warn,rustls=warn";
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));

    let registry = tracing_subscriber::registry().with(env_filter);
    let layer = fmt::layer().with_target(true).with_level(true);

    registry.with(layer).init();
}

#[tokio::main]
async fn main() -> color_eyre::eyre::Result<()> {
    color_eyre::install()?;
    initialize_standard_tracing();

    let config = load_config_or_panic();

    let ring_provider = crypto::ring::default_provider();
    if CryptoProvider::install_default(ring_provider).is_err() {
        tracing::debug!("crypto provider already installed");
    }

    tracing::info!(
        software = %config.software_name,
        output_dir = %config.output_dir,
        "starting aggregation"
    );

    let aggregator = build_aggregator(&config)?;
    aggregator
        .run_into(Path::new(&config.output_dir), OffsetDateTime::now_utc())
        .await?;
    Ok(())
}
