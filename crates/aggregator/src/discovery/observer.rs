use crate::discovery::DirectorySource;
use crate::error::DiscoveryError;
use crate::http::HttpClient;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ObserverResponse {
    data: ObserverData,
}

#[derive(Debug, Deserialize)]
struct ObserverData {
    #[serde(default)]
    nodes: Vec<ObserverNode>,
}

#[derive(Debug, Deserialize)]
struct ObserverNode {
    domain: String,
}

/// fediverse.observer: a single GraphQL request filtered by software name and `UP` status.
pub struct ObserverDirectory {
    client: HttpClient,
    url: String,
    software_name: String,
}

impl ObserverDirectory {
    pub fn new(
        client: HttpClient,
        url: impl Into<String>,
        software_name: impl Into<String>,
    ) -> Self {
        Self {
            client,
            url: url.into(),
            software_name: software_name.into(),
        }
    }
}

/// GraphQL payload listing the domains of every node running `software_name` that is up.
pub fn observer_query(software_name: &str) -> String {
    let document =
        format!("{{nodes(softwarename:\"{software_name}\" status: \"UP\"){{domain}}}}");
    serde_json::json!({ "query": document }).to_string()
}

impl DirectorySource for ObserverDirectory {
    fn name(&self) -> &str {
        "fediverse.observer"
    }

    #[tracing::instrument(name = "observer_fetch_domains", skip(self), fields(url = %self.url))]
    async fn fetch_domains(&self) -> Result<Vec<String>, DiscoveryError> {
        let resp: ObserverResponse = self
            .client
            .post_json(&self.url, observer_query(&self.software_name), &[])
            .await?;
        Ok(resp.data.nodes.into_iter().map(|n| n.domain).collect())
    }
}
