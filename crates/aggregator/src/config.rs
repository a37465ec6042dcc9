use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration build error: {0}")]
    Build(#[from] config::ConfigError),
    #[error("Invalid configuration: {0}")]
    Validation(String),
}

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    /// Directory that receives `releases.json` and `servers.json`. Recreated on every run.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    /// Software family name as reported by nodeinfo and used to query the directories.
    #[serde(default = "default_software_name")]
    pub software_name: String,
    #[serde(default = "default_release_feed_url")]
    pub release_feed_url: String,
    #[serde(default = "default_release_page_size")]
    pub release_page_size: u32,
    #[serde(default = "default_observer_url")]
    pub observer_url: String,
    #[serde(default = "default_fedidb_url")]
    pub fedidb_url: String,
    /// Scheme used for per-host requests. Only `http` and `https` are accepted.
    #[serde(default = "default_host_scheme")]
    pub host_scheme: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            software_name: default_software_name(),
            release_feed_url: default_release_feed_url(),
            release_page_size: default_release_page_size(),
            observer_url: default_observer_url(),
            fedidb_url: default_fedidb_url(),
            host_scheme: default_host_scheme(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_output_dir() -> String {
    ".output/data".to_string()
}

fn default_software_name() -> String {
    "mbin".to_string()
}

fn default_release_feed_url() -> String {
    "https://api.github.com/repos/MbinOrg/mbin/releases".to_string()
}

fn default_release_page_size() -> u32 {
    100
}

fn default_observer_url() -> String {
    "https://api.fediverse.observer/".to_string()
}

fn default_fedidb_url() -> String {
    "https://fedidb.org".to_string()
}

fn default_host_scheme() -> String {
    "https".to_string()
}

fn default_user_agent() -> String {
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string()
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.software_name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "software_name must not be empty".into(),
            ));
        }
        if self.output_dir.trim().is_empty() {
            return Err(ConfigError::Validation("output_dir must not be empty".into()));
        }
        if self.host_scheme != "https" && self.host_scheme != "http" {
            return Err(ConfigError::Validation(format!(
                "host_scheme must be http or https, got {:?}",
                self.host_scheme
            )));
        }
        if self.release_page_size == 0 {
            return Err(ConfigError::Validation(
                "release_page_size must be > 0".into(),
            ));
        }
        Ok(())
    }
}

/// Prefix of environment variables that override configuration keys.
pub const ENV_PREFIX: &str = "MBIN";

/// Environment source: `MBIN_<KEY>`, nested keys separated by `__`.
pub fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
}

/// Load configuration from an optional `config.yaml` + environment overrides.
///
/// `MBIN_`-prefixed variables override the file value, e.g. `MBIN_OUTPUT_DIR=dist/data`.
/// Every key has a default, so running without a file is valid.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    use config::{Config, File};
    let cfg = Config::builder()
        .add_source(File::with_name("config.yaml").required(false))
        .add_source(environment())
        .build()?;

    let app: AppConfig = cfg.try_deserialize()?;
    app.validate()?;
    Ok(app)
}

/// Convenience helper for binaries wanting panic-on-error behaviour.
pub fn load_config_or_panic() -> AppConfig {
    match load_config() {
        Ok(c) => c,
        Err(e) => panic!("Failed to load configuration: {e}"),
    }
}
