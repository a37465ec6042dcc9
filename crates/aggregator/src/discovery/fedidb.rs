use crate::discovery::DirectorySource;
use crate::error::{DiscoveryError, FetchError};
use crate::http::HttpClient;
use hyper::header::{COOKIE, HeaderName};
use percent_encoding::percent_decode_str;
use serde::Deserialize;
use std::collections::HashSet;
use tracing::{debug, warn};

const SERVERS_PATH: &str = "/api/web/network/software/servers";
const XSRF_COOKIE: &str = "XSRF-TOKEN=";
const X_XSRF_TOKEN: HeaderName = HeaderName::from_static("x-xsrf-token");

#[derive(Debug, Deserialize)]
struct FedidbPage {
    #[serde(default)]
    data: Vec<FedidbServer>,
    #[serde(default)]
    meta: FedidbMeta,
}

#[derive(Debug, Deserialize)]
struct FedidbServer {
    domain: String,
}

#[derive(Debug, Default, Deserialize)]
struct FedidbMeta {
    next_cursor: Option<String>,
}

/// fedidb.org web listing.
///
/// The endpoint is XSRF protected: a GET of the site root hands out the cookies that the
/// listing requests must replay, with the `XSRF-TOKEN` value echoed in a header.
pub struct FedidbDirectory {
    client: HttpClient,
    base_url: String,
    software_name: String,
}

impl FedidbDirectory {
    pub fn new(
        client: HttpClient,
        base_url: impl Into<String>,
        software_name: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            software_name: software_name.into(),
        }
    }

    async fn session_headers(&self) -> Result<Vec<(HeaderName, String)>, DiscoveryError> {
        let cookies = self.client.get_cookies(&self.base_url).await?;
        let token = xsrf_token(&cookies)
            .ok_or_else(|| DiscoveryError::MissingXsrfToken(self.base_url.clone()))?;
        Ok(vec![
            (X_XSRF_TOKEN, token),
            (COOKIE, cookies.join("; ")),
        ])
    }
}

/// Listing URL, with the continuation cursor when there is one.
pub fn servers_page_url(base_url: &str, cursor: Option<&str>) -> Result<String, FetchError> {
    let raw = format!("{}{SERVERS_PATH}", base_url.trim_end_matches('/'));
    let mut url = url::Url::parse(&raw).map_err(|e| FetchError::InvalidUrl {
        url: raw.clone(),
        reason: e.to_string(),
    })?;
    if let Some(cursor) = cursor {
        url.query_pairs_mut().append_pair("cursor", cursor);
    }
    Ok(url.into())
}

/// Percent-decoded value of the `XSRF-TOKEN` cookie.
pub fn xsrf_token(cookies: &[String]) -> Option<String> {
    cookies
        .iter()
        .find_map(|c| c.strip_prefix(XSRF_COOKIE))
        .map(|raw| percent_decode_str(raw).decode_utf8_lossy().into_owned())
}

impl DirectorySource for FedidbDirectory {
    fn name(&self) -> &str {
        "fedidb"
    }

    #[tracing::instrument(
        name = "fedidb_fetch_domains",
        skip(self),
        fields(url = %self.base_url)
    )]
    async fn fetch_domains(&self) -> Result<Vec<String>, DiscoveryError> {
        let headers = self.session_headers().await?;
        let body = serde_json::json!({ "slug": self.software_name }).to_string();

        let mut domains = Vec::new();
        let mut seen_cursors = HashSet::new();
        let mut cursor: Option<String> = None;
        loop {
            let url = servers_page_url(&self.base_url, cursor.as_deref())?;
            let page: FedidbPage = self.client.post_json(&url, body.clone(), &headers).await?;
            debug!(count = page.data.len(), cursor = ?cursor, "fedidb page");
            domains.extend(page.data.into_iter().map(|s| s.domain));

            match page.meta.next_cursor.filter(|c| !c.is_empty()) {
                Some(next) if !seen_cursors.insert(next.clone()) => {
                    warn!(cursor = %next, "fedidb repeated a cursor; stopping pagination");
                    break;
                }
                Some(next) => cursor = Some(next),
                None => break,
            }
        }
        Ok(domains)
    }
}
