//! Defaults for optional upstream fields, applied while deserializing.
//!
//! | field | default |
//! |---|---|
//! | `metadata.nodeName`, `metadata.nodeDescription` | `""` |
//! | `openRegistrations` | `false` |
//! | usage counters | `0` |
//! | `websiteDefaultLang` | [`DEFAULT_LANGUAGE`] |
//! | `websiteContactEmail` | `""` |
//! | `websiteFederationEnabled` | `false` |
//! | instance pages | absent |
//! | `defederated.instances` | `[]` |
//!
//! Servers send explicit `null` as often as they omit a key, so both map to the default.

use serde::{Deserialize, Deserializer};

pub const DEFAULT_LANGUAGE: &str = "en";

/// Treats `null` like a missing key. Pair with `#[serde(default)]`.
pub fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

pub fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

/// Empty strings count as unset too.
pub fn language_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .filter(|lang| !lang.trim().is_empty())
        .unwrap_or_else(default_language))
}
