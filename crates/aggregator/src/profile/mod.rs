//! Per-host profile fetching.
//! Modules:
//! - nodeinfo: node identity document (mandatory)
//! - api: extended API documents (optional)
//! - defaults: defaults for optional upstream fields
//! - client: HTTP-backed [`ServerInfoSource`]

pub mod api;
pub mod client;
pub mod defaults;
pub mod nodeinfo;

pub use api::{ApiInfo, Defederated, InstancePages};
pub use client::HttpServerInfo;
pub use nodeinfo::NodeInfo;

use crate::error::{ApiError, FetchError, ProfileError};
use crate::releases::{Release, version_outdated};
use serde::{Deserialize, Serialize};
use std::future::Future;
use tracing::{info, warn};

pub const NODEINFO_PATH: &str = "/nodeinfo/2.1.json";
pub const API_INFO_PATH: &str = "/api/info";
pub const API_INSTANCE_PATH: &str = "/api/instance";
pub const API_DEFEDERATED_PATH: &str = "/api/defederated";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerProfile {
    pub domain: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_outdated: Option<bool>,
    pub name: String,
    pub description: String,
    pub open_registrations: bool,
    pub total_users: u64,
    pub active_halfyear_users: u64,
    pub active_month_users: u64,
    pub local_posts: u64,
    pub local_comments: u64,
    /// Absent when the extended API could not be read; the page shows a warning for it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api: Option<ServerApi>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerApi {
    pub contact_email: String,
    pub federation_enabled: bool,
    pub default_lang: String,
    pub pages: InstancePages,
    pub defederated: Vec<String>,
}

/// Per-host upstream documents. Implemented over HTTP by [`HttpServerInfo`].
pub trait ServerInfoSource {
    fn fetch_node_info(&self, domain: &str) -> impl Future<Output = Result<NodeInfo, FetchError>>;

    fn fetch_api_info(&self, domain: &str) -> impl Future<Output = Result<ApiInfo, FetchError>>;

    fn fetch_instance_pages(
        &self,
        domain: &str,
    ) -> impl Future<Output = Result<InstancePages, FetchError>>;

    fn fetch_defederated(
        &self,
        domain: &str,
    ) -> impl Future<Output = Result<Defederated, FetchError>>;
}

/// Builds the profile of one host.
///
/// The node identity must load and name `software_name`, otherwise the host is rejected.
/// The extended API is best effort: any failure there only leaves `api` unset.
#[tracing::instrument(name = "fetch_server_profile", skip(source, software_name, releases))]
pub async fn fetch_server_profile<S: ServerInfoSource>(
    source: &S,
    domain: &str,
    software_name: &str,
    releases: &[Release],
) -> Result<ServerProfile, ProfileError> {
    info!("START");

    let node = source
        .fetch_node_info(domain)
        .await
        .map_err(|e| ProfileError::DiscoveryInvalid {
            domain: domain.to_string(),
            reason: e.to_string(),
        })?;
    if node.software.name != software_name {
        return Err(ProfileError::SoftwareMismatch {
            domain: domain.to_string(),
            expected: software_name.to_string(),
            found: node.software.name,
        });
    }

    let api = match fetch_server_api(source, domain).await {
        Ok(api) => Some(api),
        Err(error) => {
            warn!(%error, "extended api unavailable; publishing profile without it");
            None
        }
    };

    info!(api = api.is_some(), "FINISH");
    Ok(assemble_profile(domain, node, api, releases))
}

/// Fetches the three extended API documents together and checks the host answers for itself.
pub async fn fetch_server_api<S: ServerInfoSource>(
    source: &S,
    domain: &str,
) -> Result<ServerApi, ApiError> {
    let (info, pages, defederated) = tokio::try_join!(
        source.fetch_api_info(domain),
        source.fetch_instance_pages(domain),
        source.fetch_defederated(domain),
    )?;
    if info.website_domain != domain {
        return Err(ApiError::DomainMismatch {
            expected: domain.to_string(),
            found: info.website_domain,
        });
    }
    Ok(ServerApi {
        contact_email: info.website_contact_email,
        federation_enabled: info.website_federation_enabled,
        default_lang: info.website_default_lang,
        pages,
        defederated: defederated.instances,
    })
}

pub fn assemble_profile(
    domain: &str,
    node: NodeInfo,
    api: Option<ServerApi>,
    releases: &[Release],
) -> ServerProfile {
    ServerProfile {
        domain: domain.to_string(),
        version_outdated: version_outdated(releases, &node.software.version),
        version: node.software.version,
        name: node.metadata.node_name,
        description: node.metadata.node_description,
        open_registrations: node.open_registrations,
        total_users: node.usage.users.total,
        active_halfyear_users: node.usage.users.active_halfyear,
        active_month_users: node.usage.users.active_month,
        local_posts: node.usage.local_posts,
        local_comments: node.usage.local_comments,
        api,
    }
}
