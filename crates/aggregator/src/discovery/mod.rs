//! Server discovery: merges hostnames advertised by independent directory services.
//! Sources:
//! - observer: fediverse.observer GraphQL query
//! - fedidb: fedidb.org cursor-paginated listing

pub mod fedidb;
pub mod observer;

pub use fedidb::FedidbDirectory;
pub use observer::ObserverDirectory;

use crate::error::DiscoveryError;
use std::collections::BTreeSet;
use std::future::Future;
use tracing::{info, warn};

pub trait DirectorySource {
    /// Short label used in logs.
    fn name(&self) -> &str;

    fn fetch_domains(&self) -> impl Future<Output = Result<Vec<String>, DiscoveryError>>;
}

/// Queries both sources concurrently and returns the union of their hostnames.
///
/// Hostnames are compared as exact strings. A failing source contributes nothing and the
/// run continues with whatever the other source returned.
#[tracing::instrument(name = "discover_servers", skip_all)]
pub async fn discover_servers<A, B>(first: &A, second: &B) -> Vec<String>
where
    A: DirectorySource,
    B: DirectorySource,
{
    let (a, b) = tokio::join!(first.fetch_domains(), second.fetch_domains());

    let mut servers = BTreeSet::new();
    for (source, result) in [(first.name(), a), (second.name(), b)] {
        match result {
            Ok(domains) => {
                info!(source, count = domains.len(), "directory source listed servers");
                servers.extend(domains);
            }
            Err(error) => {
                warn!(source, %error, "directory source failed; continuing without it");
            }
        }
    }
    info!(count = servers.len(), "unique servers discovered");
    servers.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;

    struct Fixed(&'static str, Result<Vec<&'static str>, ()>);

    impl DirectorySource for Fixed {
        fn name(&self) -> &str {
            self.0
        }

        async fn fetch_domains(&self) -> Result<Vec<String>, DiscoveryError> {
            match &self.1 {
                Ok(domains) => Ok(domains.iter().map(|d| d.to_string()).collect()),
                Err(()) => Err(DiscoveryError::Fetch(FetchError::Network(
                    "connection refused".into(),
                ))),
            }
        }
    }

    #[tokio::test]
    async fn overlapping_sources_are_deduplicated() {
        let a = Fixed("a", Ok(vec!["a.example", "b.example"]));
        let b = Fixed("b", Ok(vec!["b.example", "c.example"]));
        let servers = discover_servers(&a, &b).await;
        assert_eq!(servers, vec!["a.example", "b.example", "c.example"]);
    }

    #[tokio::test]
    async fn comparison_is_case_sensitive() {
        let a = Fixed("a", Ok(vec!["A.example"]));
        let b = Fixed("b", Ok(vec!["a.example"]));
        assert_eq!(discover_servers(&a, &b).await.len(), 2);
    }

    #[tokio::test]
    async fn failing_source_degrades_to_empty() {
        let a = Fixed("a", Err(()));
        let b = Fixed("b", Ok(vec!["c.example"]));
        assert_eq!(discover_servers(&a, &b).await, vec!["c.example"]);

        let both_down = discover_servers(&Fixed("a", Err(())), &Fixed("b", Err(()))).await;
        assert!(both_down.is_empty());
    }
}
