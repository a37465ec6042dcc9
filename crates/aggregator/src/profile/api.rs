use crate::profile::defaults::{default_language, language_or_default, null_default};
use serde::{Deserialize, Serialize};

/// `/api/info`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiInfo {
    pub website_domain: String,
    #[serde(default, deserialize_with = "null_default")]
    pub website_contact_email: String,
    #[serde(default, deserialize_with = "null_default")]
    pub website_federation_enabled: bool,
    #[serde(
        default = "default_language",
        deserialize_with = "language_or_default"
    )]
    pub website_default_lang: String,
}

/// `/api/instance`: markdown pages the admins filled in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstancePages {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faq: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privacy_policy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terms: Option<String>,
}

/// `/api/defederated`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Defederated {
    #[serde(default, deserialize_with = "null_default")]
    pub instances: Vec<String>,
}
