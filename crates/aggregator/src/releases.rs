//! Release catalog: fetches published releases and flags the ones servers should move off.

use crate::error::{FetchError, ReleaseError};
use crate::http::HttpClient;
use serde::{Deserialize, Serialize};
use std::future::Future;
use time::{Duration, OffsetDateTime};
use tracing::info;

/// Age of the preceding release past which a release counts as outdated.
pub const STALENESS_WINDOW: Duration = Duration::days(30);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Release {
    pub version: String,
    #[serde(with = "time::serde::rfc3339")]
    pub published_at: OffsetDateTime,
    pub github_url: String,
    pub body: String,
    pub outdated: bool,
}

/// One entry of the GitHub releases API.
#[derive(Debug, Clone, Deserialize)]
pub struct GithubRelease {
    pub tag_name: String,
    /// `null` for drafts.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub published_at: Option<OffsetDateTime>,
    pub html_url: String,
    #[serde(default)]
    pub body: Option<String>,
}

pub trait ReleaseFeed {
    fn fetch_releases(&self) -> impl Future<Output = Result<Vec<GithubRelease>, ReleaseError>>;
}

pub struct GithubReleaseFeed {
    client: HttpClient,
    url: String,
    page_size: u32,
}

impl GithubReleaseFeed {
    pub fn new(client: HttpClient, url: impl Into<String>, page_size: u32) -> Self {
        Self {
            client,
            url: url.into(),
            page_size,
        }
    }

    fn page_url(&self, page: u32) -> Result<String, ReleaseError> {
        let mut url = url::Url::parse(&self.url).map_err(|e| {
            ReleaseError::Fetch(FetchError::InvalidUrl {
                url: self.url.clone(),
                reason: e.to_string(),
            })
        })?;
        url.query_pairs_mut()
            .append_pair("per_page", &self.page_size.to_string())
            .append_pair("page", &page.to_string());
        Ok(url.into())
    }
}

impl ReleaseFeed for GithubReleaseFeed {
    #[tracing::instrument(name = "fetch_releases", skip(self), fields(url = %self.url))]
    async fn fetch_releases(&self) -> Result<Vec<GithubRelease>, ReleaseError> {
        let mut all = Vec::new();
        let mut page = 1;
        loop {
            let batch: Vec<GithubRelease> = self.client.get_json(&self.page_url(page)?).await?;
            let len = batch.len();
            all.extend(batch);
            if len < self.page_size as usize {
                break;
            }
            page += 1;
        }
        Ok(all)
    }
}

/// Strips any leading non-digit prefix from a tag (`v1.2.3` becomes `1.2.3`).
pub fn normalize_version(tag: &str) -> &str {
    tag.trim_start_matches(|c: char| !c.is_ascii_digit())
}

/// Sets `outdated` on releases sorted oldest first.
///
/// The earliest release is never outdated. Every later release is outdated once the
/// release before it has been out for longer than [`STALENESS_WINDOW`].
pub fn mark_outdated(releases: &mut [Release], now: OffsetDateTime) {
    let mut previous: Option<OffsetDateTime> = None;
    for release in releases.iter_mut() {
        release.outdated = previous.is_some_and(|published| now - published > STALENESS_WINDOW);
        previous = Some(release.published_at);
    }
}

/// Normalizes feed entries into the catalog: drafts dropped, sorted oldest first, flagged.
pub fn build_catalog(entries: Vec<GithubRelease>, now: OffsetDateTime) -> Vec<Release> {
    let mut releases: Vec<Release> = entries
        .into_iter()
        .filter_map(|entry| {
            let published_at = entry.published_at?;
            Some(Release {
                version: normalize_version(&entry.tag_name).to_string(),
                published_at,
                github_url: entry.html_url,
                body: entry.body.unwrap_or_default(),
                outdated: false,
            })
        })
        .collect();
    releases.sort_by_key(|r| r.published_at);
    mark_outdated(&mut releases, now);
    releases
}

/// Fetches and builds the release catalog. Any failure is fatal to the run.
pub async fn fetch_release_catalog<F: ReleaseFeed>(
    feed: &F,
    now: OffsetDateTime,
) -> Result<Vec<Release>, ReleaseError> {
    let entries = feed.fetch_releases().await?;
    let releases = build_catalog(entries, now);
    info!(count = releases.len(), "release catalog built");
    Ok(releases)
}

/// Looks up the staleness flag by exact version string match.
pub fn version_outdated(releases: &[Release], version: &str) -> Option<bool> {
    releases
        .iter()
        .find(|r| r.version == version)
        .map(|r| r.outdated)
}
