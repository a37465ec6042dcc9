use crate::error::FetchError;
use crate::http::HttpClient;
use crate::profile::{
    API_DEFEDERATED_PATH, API_INFO_PATH, API_INSTANCE_PATH, ApiInfo, Defederated, InstancePages,
    NODEINFO_PATH, NodeInfo, ServerInfoSource,
};

/// Reads a host's documents over HTTP at `<scheme>://<domain><path>`.
pub struct HttpServerInfo {
    client: HttpClient,
    scheme: String,
}

impl HttpServerInfo {
    pub fn new(client: HttpClient, scheme: impl Into<String>) -> Self {
        Self {
            client,
            scheme: scheme.into(),
        }
    }

    pub fn url(&self, domain: &str, path: &str) -> String {
        format!("{}://{domain}{path}", self.scheme)
    }
}

impl ServerInfoSource for HttpServerInfo {
    async fn fetch_node_info(&self, domain: &str) -> Result<NodeInfo, FetchError> {
        self.client.get_json(&self.url(domain, NODEINFO_PATH)).await
    }

    async fn fetch_api_info(&self, domain: &str) -> Result<ApiInfo, FetchError> {
        self.client.get_json(&self.url(domain, API_INFO_PATH)).await
    }

    async fn fetch_instance_pages(&self, domain: &str) -> Result<InstancePages, FetchError> {
        self.client.get_json(&self.url(domain, API_INSTANCE_PATH)).await
    }

    async fn fetch_defederated(&self, domain: &str) -> Result<Defederated, FetchError> {
        self.client
            .get_json(&self.url(domain, API_DEFEDERATED_PATH))
            .await
    }
}
