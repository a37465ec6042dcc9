//! Build-time data for the Mbin website.
//!
//! Collects the published Mbin releases and a directory of Mbin servers (discovered via
//! fediverse.observer and fedidb, then profiled through nodeinfo and the Mbin API) and
//! writes both as static JSON for the site to render.

pub mod artifact;
pub mod config;
pub mod discovery;
pub mod error;
pub mod http;
pub mod pipeline;
pub mod profile;
pub mod releases;
pub mod tls;

use crate::config::AppConfig;
use crate::discovery::{FedidbDirectory, ObserverDirectory};
use crate::error::FetchError;
use crate::http::HttpClient;
use crate::pipeline::Aggregator;
use crate::profile::HttpServerInfo;
use crate::releases::GithubReleaseFeed;

/// The production aggregator: every collaborator talks HTTP.
pub type HttpAggregator =
    Aggregator<GithubReleaseFeed, ObserverDirectory, FedidbDirectory, HttpServerInfo>;

/// Wires the HTTP collaborators from configuration, sharing one client.
pub fn build_aggregator(config: &AppConfig) -> Result<HttpAggregator, FetchError> {
    let client = HttpClient::new(&config.user_agent)?;
    Ok(Aggregator {
        feed: GithubReleaseFeed::new(
            client.clone(),
            &config.release_feed_url,
            config.release_page_size,
        ),
        directories: (
            ObserverDirectory::new(client.clone(), &config.observer_url, &config.software_name),
            FedidbDirectory::new(client.clone(), &config.fedidb_url, &config.software_name),
        ),
        servers: HttpServerInfo::new(client, &config.host_scheme),
        software_name: config.software_name.clone(),
    })
}
