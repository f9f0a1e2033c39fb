//! Configuration for the acmidm-session binary.

use serde::Deserialize;

use acmidm_core::{CoreError, StoreConfig};
use acmidm_graph::SparqlConfig;

use crate::error::Result;

/// SPARQL endpoint settings.
///
/// Loaded from the `acmidm.toml` `[sparql]` section,
/// `ACMIDM_SPARQL__` environment variables, or `MU_SPARQL_ENDPOINT`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SparqlSettings {
    /// SPARQL 1.1 Protocol endpoint URL.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_endpoint() -> String {
    SparqlConfig::default().endpoint
}

fn default_timeout_secs() -> u64 {
    SparqlConfig::default().timeout_secs
}

impl Default for SparqlSettings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl SparqlSettings {
    pub fn load(file_prefix: &str) -> std::result::Result<Self, CoreError> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name(file_prefix).required(false))
            .add_source(
                config::Environment::with_prefix("ACMIDM")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("sparql.endpoint", std::env::var("MU_SPARQL_ENDPOINT").ok())?
            .build()?;

        let settings = match cfg.get::<SparqlSettings>("sparql") {
            Ok(s) => s,
            Err(config::ConfigError::NotFound(_)) => SparqlSettings::default(),
            Err(e) => return Err(e.into()),
        };

        if settings.endpoint.trim().is_empty() {
            return Err(CoreError::InvalidConfig("sparql.endpoint is empty".to_string()));
        }
        Ok(settings)
    }

    pub fn to_client_config(&self) -> SparqlConfig {
        SparqlConfig {
            endpoint: self.endpoint.clone(),
            timeout_secs: self.timeout_secs,
            user_agent: concat!("acmidm-session/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Everything the binary needs, loaded from one file prefix.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub sparql: SparqlSettings,
}

impl AppConfig {
    pub fn load(file_prefix: &str) -> Result<Self> {
        Ok(Self {
            store: StoreConfig::load(file_prefix)?,
            sparql: SparqlSettings::load(file_prefix)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SessionError;

    #[test]
    fn test_default_settings() {
        let settings = SparqlSettings::default();
        assert_eq!(settings.endpoint, "http://database:8890/sparql");
        assert_eq!(settings.timeout_secs, 60);
    }

    #[test]
    fn test_client_config_carries_endpoint_and_timeout() {
        let settings = SparqlSettings {
            endpoint: "http://localhost:8890/sparql".to_string(),
            timeout_secs: 5,
        };
        let client = settings.to_client_config();
        assert_eq!(client.endpoint, "http://localhost:8890/sparql");
        assert_eq!(client.timeout_secs, 5);
        assert!(client.user_agent.starts_with("acmidm-session/"));
    }

    #[test]
    fn test_load_reads_both_sections_from_one_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("acmidm.toml"),
            "[store]\nservice_homepage = \"https://example.org/login\"\n\n\
             [sparql]\ntimeout_secs = 7\n",
        )
        .unwrap();

        let prefix = dir.path().join("acmidm");
        let config = AppConfig::load(prefix.to_str().unwrap()).unwrap();
        assert_eq!(config.store.service_homepage, "https://example.org/login");
        assert_eq!(config.sparql.timeout_secs, 7);
    }

    #[test]
    fn test_invalid_file_surfaces_as_config_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("acmidm.toml"),
            "[sparql]\nendpoint = \"  \"\n",
        )
        .unwrap();

        let prefix = dir.path().join("acmidm");
        let err = AppConfig::load(prefix.to_str().unwrap()).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Config(CoreError::InvalidConfig(ref msg)) if msg.contains("sparql.endpoint")
        ));
    }
}
