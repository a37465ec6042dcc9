//! One aggregation run: releases, then discovery, then every host's profile in parallel.

use crate::artifact::write_artifacts;
use crate::discovery::{DirectorySource, discover_servers};
use crate::error::{AggregateError, ProfileError};
use crate::profile::{ServerInfoSource, ServerProfile, fetch_server_profile};
use crate::releases::{Release, ReleaseFeed, fetch_release_catalog};
use futures::StreamExt;
use futures::stream::FuturesUnordered;
use std::path::Path;
use time::OffsetDateTime;
use tracing::{error, info};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregation {
    /// Oldest first.
    pub releases: Vec<Release>,
    pub servers: Vec<ServerProfile>,
}

#[derive(Debug)]
pub enum ProfileOutcome {
    Success(ServerProfile),
    Failure(ProfileError),
}

/// The upstream collaborators of a run.
pub struct Aggregator<F, A, B, S> {
    pub feed: F,
    pub directories: (A, B),
    pub servers: S,
    pub software_name: String,
}

impl<F, A, B, S> Aggregator<F, A, B, S>
where
    F: ReleaseFeed,
    A: DirectorySource,
    B: DirectorySource,
    S: ServerInfoSource,
{
    /// Runs the whole aggregation. Only a release feed failure aborts it.
    #[tracing::instrument(name = "aggregate", skip(self), fields(software = %self.software_name))]
    pub async fn run(&self, now: OffsetDateTime) -> Result<Aggregation, AggregateError> {
        let releases = fetch_release_catalog(&self.feed, now).await?;
        let domains = discover_servers(&self.directories.0, &self.directories.1).await;
        let outcomes =
            fetch_all_profiles(&self.servers, &domains, &self.software_name, &releases).await;

        let mut servers = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            match outcome {
                ProfileOutcome::Success(profile) => servers.push(profile),
                ProfileOutcome::Failure(e) => {
                    error!(domain = e.domain(), error = %e, "server skipped");
                }
            }
        }
        info!(count = servers.len(), "Successful servers found");
        Ok(Aggregation { releases, servers })
    }

    /// Runs the aggregation and replaces `dir` with its artifacts.
    ///
    /// A release feed failure leaves `dir` untouched.
    pub async fn run_into(
        &self,
        dir: &Path,
        now: OffsetDateTime,
    ) -> Result<Aggregation, AggregateError> {
        let aggregation = self.run(now).await?;
        write_artifacts(dir, &aggregation).await?;
        Ok(aggregation)
    }
}

/// Fetches every host concurrently and waits for all of them, whatever each one's result.
///
/// Outcomes come back in completion order.
pub async fn fetch_all_profiles<S: ServerInfoSource>(
    source: &S,
    domains: &[String],
    software_name: &str,
    releases: &[Release],
) -> Vec<ProfileOutcome> {
    let mut pending: FuturesUnordered<_> = domains
        .iter()
        .map(|domain| async move {
            match fetch_server_profile(source, domain, software_name, releases).await {
                Ok(profile) => ProfileOutcome::Success(profile),
                Err(e) => ProfileOutcome::Failure(e),
            }
        })
        .collect();

    let mut outcomes = Vec::with_capacity(domains.len());
    while let Some(outcome) = pending.next().await {
        outcomes.push(outcome);
    }
    outcomes
}
