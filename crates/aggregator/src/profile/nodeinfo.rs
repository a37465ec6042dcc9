use crate::profile::defaults::null_default;
use serde::Deserialize;

/// The parts of a nodeinfo 2.1 document the directory uses.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInfo {
    pub software: Software,
    #[serde(default, deserialize_with = "null_default")]
    pub open_registrations: bool,
    #[serde(default, deserialize_with = "null_default")]
    pub usage: Usage,
    #[serde(default, deserialize_with = "null_default")]
    pub metadata: Metadata,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Software {
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    #[serde(default, deserialize_with = "null_default")]
    pub users: Users,
    #[serde(default, deserialize_with = "null_default")]
    pub local_posts: u64,
    #[serde(default, deserialize_with = "null_default")]
    pub local_comments: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Users {
    #[serde(default, deserialize_with = "null_default")]
    pub total: u64,
    #[serde(default, deserialize_with = "null_default")]
    pub active_halfyear: u64,
    #[serde(default, deserialize_with = "null_default")]
    pub active_month: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default, deserialize_with = "null_default")]
    pub node_name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub node_description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_document() {
        let json = r#"{
            "version": "2.1",
            "software": {"name": "mbin", "version": "1.7.4", "repository": "https://github.com/MbinOrg/mbin"},
            "protocols": ["activitypub"],
            "openRegistrations": true,
            "usage": {
                "users": {"total": 1200, "activeHalfyear": 300, "activeMonth": 90},
                "localPosts": 5000,
                "localComments": 12000
            },
            "metadata": {"nodeName": "Kbin Social", "nodeDescription": "A place"}
        }"#;
        let info: NodeInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.software.name, "mbin");
        assert_eq!(info.software.version, "1.7.4");
        assert!(info.open_registrations);
        assert_eq!(info.usage.users.total, 1200);
        assert_eq!(info.usage.users.active_halfyear, 300);
        assert_eq!(info.usage.users.active_month, 90);
        assert_eq!(info.usage.local_posts, 5000);
        assert_eq!(info.usage.local_comments, 12000);
        assert_eq!(info.metadata.node_name, "Kbin Social");
    }

    #[test]
    fn missing_and_null_fields_use_defaults() {
        let json = r#"{
            "software": {"name": "mbin", "version": null},
            "openRegistrations": null,
            "usage": {"users": {"total": 3}},
            "metadata": {"nodeName": "tiny", "nodeDescription": null}
        }"#;
        let info: NodeInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.software.version, "");
        assert!(!info.open_registrations);
        assert_eq!(info.usage.users.total, 3);
        assert_eq!(info.usage.users.active_month, 0);
        assert_eq!(info.usage.local_posts, 0);
        assert_eq!(info.metadata.node_description, "");
    }

    #[test]
    fn software_is_mandatory() {
        assert!(serde_json::from_str::<NodeInfo>(r#"{"openRegistrations": true}"#).is_err());
    }
}
